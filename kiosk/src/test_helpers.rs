//! Recording host used by the engine tests.

use frames::{Coordinates, Letter, Page};

use crate::content::{ContentState, Phase};
use crate::host::PageHost;
use crate::target::{FocusTarget, NavSet, TargetSnapshot};

/// Host that records every call instead of touching a real page.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub focused: Vec<&'static str>,
    pub activated: Vec<&'static str>,
    pub navigated: Vec<Page>,
    pub rendered: Vec<Phase>,
    pub coordinates: Vec<(Coordinates, bool)>,
    pub starts: Vec<bool>,
    /// Elements that refuse activation.
    pub disabled: Vec<&'static str>,
}

impl PageHost for RecordingHost {
    type Element = &'static str;

    fn focus(&mut self, element: &Self::Element) {
        self.focused.push(element);
    }

    fn activate(&mut self, element: &Self::Element) -> bool {
        if self.disabled.contains(element) {
            return false;
        }
        self.activated.push(element);
        true
    }

    fn navigate(&mut self, page: Page) {
        self.navigated.push(page);
    }

    fn render(&mut self, state: &ContentState) {
        self.rendered.push(state.phase());
    }

    fn show_coordinates(&mut self, coords: Coordinates, stable: bool) {
        self.coordinates.push((coords, stable));
    }

    fn show_start(&mut self, start: bool) {
        self.starts.push(start);
    }
}

/// Build a target from a `data-nav` style word list.
pub fn target(name: &'static str, nav: &str) -> FocusTarget<&'static str> {
    FocusTarget::new(name, NavSet::parse(nav))
}

/// Four lettered quiz answers named `answer-a` .. `answer-d`.
pub fn quiz_answers() -> Vec<FocusTarget<&'static str>> {
    vec![
        FocusTarget::answer("answer-a", Letter::A),
        FocusTarget::answer("answer-b", Letter::B),
        FocusTarget::answer("answer-c", Letter::C),
        FocusTarget::answer("answer-d", Letter::D),
    ]
}

/// Quiz page: a "next" button plus lettered answers.
pub fn quiz_snapshot() -> TargetSnapshot<&'static str> {
    TargetSnapshot { navigable: vec![target("next", "select")], answers: quiz_answers() }
}
