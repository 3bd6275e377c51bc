//! Directional focus traversal over the page's interactive targets.
//!
//! Targets form a reading-order sequence, each with a direction mask. A move
//! needs both sides to agree: the focused target must allow leaving in the
//! direction, and the candidate must allow being entered from it. Up/left
//! walk the sequence backwards and down/right forwards, wrapping at both
//! ends. A scan that comes back to the starting index finds nothing.

#[cfg(test)]
#[path = "focus_test.rs"]
mod focus_test;

use frames::Direction;

use crate::host::PageHost;
use crate::target::FocusTarget;

/// Outcome of a directional move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// No targets; the cursor is inactive.
    Empty,
    /// The focused target does not allow leaving in this direction.
    Blocked,
    /// No other target accepts entry from this direction.
    Unreachable,
    Moved { from: usize, to: usize },
}

/// Navigation cursor over the current target sequence.
///
/// Invariant: `cursor` is `Some` and in range exactly when `targets` is
/// non-empty.
#[derive(Debug)]
pub struct FocusEngine<E> {
    targets: Vec<FocusTarget<E>>,
    cursor: Option<usize>,
}

impl<E> Default for FocusEngine<E> {
    fn default() -> Self {
        Self { targets: Vec::new(), cursor: None }
    }
}

impl<E: Clone + PartialEq> FocusEngine<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole target sequence. The previous sequence is discarded
    /// without merging. On a non-empty sequence the cursor resets to the
    /// first target and that target receives focus.
    pub fn rebuild<H: PageHost<Element = E>>(&mut self, targets: Vec<FocusTarget<E>>, host: &mut H) {
        self.targets = targets;
        self.cursor = if self.targets.is_empty() { None } else { Some(0) };
        if let Some(first) = self.targets.first() {
            host.focus(&first.element);
        }
    }

    /// Drop all targets without touching the host.
    pub fn clear(&mut self) {
        self.targets.clear();
        self.cursor = None;
    }

    /// Compute where `direction` would take the cursor without moving it.
    #[must_use]
    pub fn step(&self, direction: Direction) -> Step {
        let Some(start) = self.cursor else {
            return Step::Empty;
        };
        if !self.targets[start].nav.allows(direction) {
            return Step::Blocked;
        }

        let len = self.targets.len();
        let mut index = start;
        loop {
            index = if direction.is_backward() { (index + len - 1) % len } else { (index + 1) % len };
            if index == start {
                return Step::Unreachable;
            }
            if self.targets[index].nav.allows(direction) {
                return Step::Moved { from: start, to: index };
            }
        }
    }

    /// Move the cursor in `direction`, focusing the new target on success.
    pub fn move_focus<H: PageHost<Element = E>>(&mut self, direction: Direction, host: &mut H) -> Step {
        let step = self.step(direction);
        if let Step::Moved { to, .. } = step {
            self.cursor = Some(to);
            host.focus(&self.targets[to].element);
        }
        step
    }

    #[must_use]
    pub fn current(&self) -> Option<&FocusTarget<E>> {
        self.cursor.map(|i| &self.targets[i])
    }

    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[must_use]
    pub fn targets(&self) -> &[FocusTarget<E>] {
        &self.targets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
