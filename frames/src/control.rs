//! Remote-control vocabulary carried by `control` events.

/// In-page movement direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Up and left walk the target sequence backwards; down and right forwards.
    #[must_use]
    pub fn is_backward(self) -> bool {
        matches!(self, Self::Up | Self::Left)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Named kiosk views reachable by a direct jump.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Page {
    Invention,
    Quiz,
    About,
}

impl Page {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invention => "invention",
            Self::Quiz => "quiz",
            Self::About => "about",
        }
    }

    /// Route path of the page in the kiosk UI.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Invention => "/invention",
            Self::Quiz => "/quiz",
            Self::About => "/about",
        }
    }
}

/// Lettered quiz answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Letter {
    A,
    B,
    C,
    D,
}

impl Letter {
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// A parsed control code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCode {
    Move(Direction),
    Select,
    Answer(Letter),
    Page(Page),
    /// Anything outside the vocabulary. Kept so it can be reported.
    Unknown(String),
}

impl ControlCode {
    /// Parse a raw `action` string. Never fails: unrecognised codes become
    /// [`ControlCode::Unknown`].
    #[must_use]
    pub fn parse(action: &str) -> Self {
        match action {
            "up" => Self::Move(Direction::Up),
            "down" => Self::Move(Direction::Down),
            "left" => Self::Move(Direction::Left),
            "right" => Self::Move(Direction::Right),
            "select" => Self::Select,
            "A" => Self::Answer(Letter::A),
            "B" => Self::Answer(Letter::B),
            "C" => Self::Answer(Letter::C),
            "D" => Self::Answer(Letter::D),
            "invention" => Self::Page(Page::Invention),
            "quiz" => Self::Page(Page::Quiz),
            "about" => Self::Page(Page::About),
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// Wire spelling of the code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Move(direction) => direction.as_str(),
            Self::Select => "select",
            Self::Answer(letter) => letter.as_str(),
            Self::Page(page) => page.as_str(),
            Self::Unknown(raw) => raw,
        }
    }

    /// Page jumps bypass the in-page throttle.
    #[must_use]
    pub fn is_immediate(&self) -> bool {
        matches!(self, Self::Page(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognises_full_vocabulary() {
        assert_eq!(ControlCode::parse("up"), ControlCode::Move(Direction::Up));
        assert_eq!(ControlCode::parse("right"), ControlCode::Move(Direction::Right));
        assert_eq!(ControlCode::parse("select"), ControlCode::Select);
        assert_eq!(ControlCode::parse("C"), ControlCode::Answer(Letter::C));
        assert_eq!(ControlCode::parse("quiz"), ControlCode::Page(Page::Quiz));
    }

    #[test]
    fn parse_is_case_sensitive_for_letters() {
        assert_eq!(ControlCode::parse("a"), ControlCode::Unknown("a".into()));
        assert_eq!(ControlCode::parse("Up"), ControlCode::Unknown("Up".into()));
    }

    #[test]
    fn as_str_matches_parse_input() {
        for raw in ["up", "down", "left", "right", "select", "A", "B", "C", "D", "invention", "quiz", "about", "wat"] {
            assert_eq!(ControlCode::parse(raw).as_str(), raw);
        }
    }

    #[test]
    fn only_page_jumps_are_immediate() {
        assert!(ControlCode::Page(Page::About).is_immediate());
        assert!(!ControlCode::Select.is_immediate());
        assert!(!ControlCode::Move(Direction::Left).is_immediate());
        assert!(!ControlCode::Unknown("x".into()).is_immediate());
    }

    #[test]
    fn backward_directions() {
        assert!(Direction::Up.is_backward());
        assert!(Direction::Left.is_backward());
        assert!(!Direction::Down.is_backward());
        assert!(!Direction::Right.is_backward());
    }

    #[test]
    fn page_paths() {
        assert_eq!(Page::Invention.path(), "/invention");
        assert_eq!(Page::About.path(), "/about");
    }
}
