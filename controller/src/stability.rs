//! Coordinate stability detection for the globe controller.
//!
//! DESIGN
//! ======
//! Raw orientation samples arrive continuously while the globe is handled.
//! Every sample is a candidate (`coordinates-pending`). The first sample of a
//! still period becomes the anchor; once every later sample has stayed
//! strictly inside the tolerance window around it for the hold time, one
//! `coordinates-stable` is produced for the sample that crossed the line.
//! A sample outside the window re-anchors and re-arms the detector.

#[cfg(test)]
#[path = "stability_test.rs"]
mod stability_test;

use std::time::{Duration, Instant};

use frames::{Coordinates, Event};

pub const DEFAULT_TOLERANCE_DEG: f64 = 1.0;
pub const DEFAULT_HOLD: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy)]
struct Anchor {
    coords: Coordinates,
    since: Instant,
}

#[derive(Debug, Clone)]
pub struct StabilityDetector {
    tolerance: f64,
    hold: Duration,
    anchor: Option<Anchor>,
    fired: bool,
}

impl Default for StabilityDetector {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE_DEG, DEFAULT_HOLD)
    }
}

impl StabilityDetector {
    #[must_use]
    pub fn new(tolerance: f64, hold: Duration) -> Self {
        Self { tolerance, hold, anchor: None, fired: false }
    }

    /// Feed one sample taken at `now`. Returns the events to publish, in
    /// order: always the pending candidate, then at most one stable event.
    pub fn push(&mut self, sample: Coordinates, now: Instant) -> Vec<Event> {
        let mut events = vec![Event::CoordinatesPending(sample)];

        match self.anchor {
            Some(anchor) if self.within(anchor.coords, sample) => {
                if !self.fired && now.saturating_duration_since(anchor.since) >= self.hold {
                    self.fired = true;
                    events.push(Event::CoordinatesStable(sample));
                }
            }
            _ => {
                self.anchor = Some(Anchor { coords: sample, since: now });
                self.fired = false;
            }
        }
        events
    }

    fn within(&self, anchor: Coordinates, sample: Coordinates) -> bool {
        (sample.lat - anchor.lat).abs() < self.tolerance && (sample.lon - anchor.lon).abs() < self.tolerance
    }
}
