//! Remote-control action dispatch.
//!
//! Page jumps run immediately and never touch the cursor. Every other code
//! goes through a cool-down throttle that absorbs bursts of duplicate
//! controller signals: once a code is taken, further codes are dropped until
//! the window has passed.

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod dispatch_test;

use std::time::{Duration, Instant};

use frames::{ControlCode, Letter, Page};
use tracing::{debug, warn};

use crate::focus::{FocusEngine, Step};
use crate::host::PageHost;
use crate::target::FocusTarget;

/// Cool-down after an in-page action.
pub const THROTTLE_WINDOW: Duration = Duration::from_millis(150);

/// What a control code did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Navigated(Page),
    Moved(Step),
    /// The focused target was clicked.
    Activated,
    /// The focused target refused the click, or does not take `select`.
    Refused,
    /// Select with no focused target.
    NothingFocused,
    Answered(Letter),
    /// No answer target carries that letter.
    NoAnswer(Letter),
    /// Dropped inside the cool-down window.
    Throttled,
    Unknown(String),
}

/// Cool-down gate driven by caller-supplied instants.
#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    open_at: Option<Instant>,
}

impl Throttle {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { window, open_at: None }
    }

    /// Take the gate if it is open at `now`, closing it for one window.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if self.open_at.is_some_and(|open_at| now < open_at) {
            return false;
        }
        self.open_at = Some(now + self.window);
        true
    }

    pub fn reset(&mut self) {
        self.open_at = None;
    }
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    throttle: Throttle,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(THROTTLE_WINDOW)
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { throttle: Throttle::new(window) }
    }

    /// Dispatch one control code at `now`.
    ///
    /// `answers` is the lettered answer pool, separate from the directional
    /// targets held by `focus`.
    pub fn dispatch<H: PageHost>(
        &mut self,
        code: &ControlCode,
        now: Instant,
        focus: &mut FocusEngine<H::Element>,
        answers: &[FocusTarget<H::Element>],
        host: &mut H,
    ) -> Dispatch {
        match code {
            ControlCode::Page(page) => {
                debug!(page = page.as_str(), "dispatch: navigate");
                host.navigate(*page);
                Dispatch::Navigated(*page)
            }
            // Everything below this arm has taken the throttle.
            _ if !self.throttle.try_acquire(now) => Dispatch::Throttled,
            ControlCode::Move(direction) => Dispatch::Moved(focus.move_focus(*direction, host)),
            ControlCode::Select => {
                let Some(current) = focus.current() else {
                    return Dispatch::NothingFocused;
                };
                if !current.nav.allows_select() {
                    debug!("dispatch: focused target does not take select");
                    return Dispatch::Refused;
                }
                if host.activate(&current.element) { Dispatch::Activated } else { Dispatch::Refused }
            }
            ControlCode::Answer(letter) => {
                let Some(target) = answers.iter().find(|t| t.action_key == Some(*letter)) else {
                    warn!(letter = letter.as_str(), "dispatch: no answer target for letter");
                    return Dispatch::NoAnswer(*letter);
                };
                host.activate(&target.element);
                Dispatch::Answered(*letter)
            }
            ControlCode::Unknown(raw) => {
                warn!(action = %raw, "dispatch: unknown control code");
                Dispatch::Unknown(raw.clone())
            }
        }
    }

    /// Reopen the throttle, e.g. after the page was torn down.
    pub fn reset(&mut self) {
        self.throttle.reset();
    }
}
