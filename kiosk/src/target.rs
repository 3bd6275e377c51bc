//! Focus targets: interactive elements the remote control can reach.
//!
//! The element handle is owned by the host UI; the engine only observes it
//! and hands it back for focus and activation.

#[cfg(test)]
#[path = "target_test.rs"]
mod target_test;

use frames::{Direction, Letter};

/// Set over `{up, down, left, right, select}` naming which directions a
/// target may be left from and entered from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavSet(u8);

impl NavSet {
    const UP: u8 = 1;
    const DOWN: u8 = 1 << 1;
    const LEFT: u8 = 1 << 2;
    const RIGHT: u8 = 1 << 3;
    const SELECT: u8 = 1 << 4;

    pub const NONE: NavSet = NavSet(0);
    pub const ALL: NavSet = NavSet(Self::UP | Self::DOWN | Self::LEFT | Self::RIGHT | Self::SELECT);

    /// Parse a whitespace separated list such as `"left right select"`.
    /// Unrecognised words are ignored.
    #[must_use]
    pub fn parse(words: &str) -> Self {
        words.split_whitespace().fold(Self::NONE, |set, word| match word {
            "up" => set.with(Direction::Up),
            "down" => set.with(Direction::Down),
            "left" => set.with(Direction::Left),
            "right" => set.with(Direction::Right),
            "select" => set.with_select(),
            _ => set,
        })
    }

    fn bit(direction: Direction) -> u8 {
        match direction {
            Direction::Up => Self::UP,
            Direction::Down => Self::DOWN,
            Direction::Left => Self::LEFT,
            Direction::Right => Self::RIGHT,
        }
    }

    #[must_use]
    pub fn with(self, direction: Direction) -> Self {
        Self(self.0 | Self::bit(direction))
    }

    #[must_use]
    pub fn with_select(self) -> Self {
        Self(self.0 | Self::SELECT)
    }

    #[must_use]
    pub fn allows(self, direction: Direction) -> bool {
        self.0 & Self::bit(direction) != 0
    }

    #[must_use]
    pub fn allows_select(self) -> bool {
        self.0 & Self::SELECT != 0
    }
}

/// One interactive element in the rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusTarget<E> {
    pub element: E,
    pub nav: NavSet,
    /// Letter tag for quiz answers activated by `A`..`D`.
    pub action_key: Option<Letter>,
}

impl<E> FocusTarget<E> {
    #[must_use]
    pub fn new(element: E, nav: NavSet) -> Self {
        Self { element, nav, action_key: None }
    }

    /// An answer-pool target. Answers are chosen by letter, never by moving
    /// the cursor, so they carry no direction mask.
    #[must_use]
    pub fn answer(element: E, letter: Letter) -> Self {
        Self { element, nav: NavSet::NONE, action_key: Some(letter) }
    }
}

/// Full set of targets currently present in the page, in document order.
///
/// The host reports a fresh snapshot whenever targets appear or disappear.
/// Snapshots replace the previous one wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSnapshot<E> {
    /// Targets reachable by directional movement.
    pub navigable: Vec<FocusTarget<E>>,
    /// Lettered answer targets, excluded from directional movement.
    pub answers: Vec<FocusTarget<E>>,
}

impl<E> Default for TargetSnapshot<E> {
    fn default() -> Self {
        Self { navigable: Vec::new(), answers: Vec::new() }
    }
}
