//! Interface between the engine and the host UI layer.
//!
//! The engine never assumes a UI framework. The host renders whatever the
//! session tells it to, and performs focus, click, and page navigation on
//! the engine's behalf. In the other direction the host reports target
//! changes through [`crate::session::DisplaySession::targets_changed`].

use frames::{Coordinates, Page};

use crate::content::ContentState;

pub trait PageHost {
    /// Handle to a rendered element. Observed, never owned, by the engine.
    type Element: Clone + PartialEq + std::fmt::Debug;

    /// Give input focus to `element`.
    fn focus(&mut self, element: &Self::Element);

    /// Simulate a user click. Returns `false` if the element refused it
    /// (for example because it is disabled).
    fn activate(&mut self, element: &Self::Element) -> bool;

    /// Leave the current page for `page`.
    fn navigate(&mut self, page: Page);

    /// Render the content state: spinner, payload, or not-found view.
    fn render(&mut self, state: &ContentState);

    /// Show a candidate (`stable == false`) or confirmed globe position.
    fn show_coordinates(&mut self, _coords: Coordinates, _stable: bool) {}

    /// Reflect the shared start flag.
    fn show_start(&mut self, _start: bool) {}
}
