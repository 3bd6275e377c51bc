//! Coordinate-stability handshake and the shared start flag.
//!
//! A stable position always resets the start flag. The reset travels as a
//! follow-up event queued behind the stable coordinates in the same batch,
//! so no consumer can observe the reset before the position it belongs to.
//! Writers are last-write-wins; one controller per deployment is assumed.

#[cfg(test)]
#[path = "handshake_test.rs"]
mod handshake_test;

use frames::{Coordinates, Event};

#[derive(Debug, Default)]
pub struct Handshake {
    start: bool,
    last_stable: Option<Coordinates>,
}

impl Handshake {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn start(&self) -> bool {
        self.start
    }

    #[must_use]
    pub fn last_stable(&self) -> Option<Coordinates> {
        self.last_stable
    }

    /// Explicit start/stop from a controller.
    pub fn set_start(&mut self, start: bool) -> Event {
        self.start = start;
        Event::Start { start }
    }

    /// Confirmed position: clears the flag and returns the ordered pair to
    /// deliver as one batch.
    pub fn on_stable(&mut self, coords: Coordinates) -> [Event; 2] {
        self.last_stable = Some(coords);
        self.start = false;
        [Event::CoordinatesStable(coords), Event::Start { start: false }]
    }
}
