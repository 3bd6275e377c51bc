//! Display-side engine for the globe kiosk.
//!
//! This crate runs inside one rendered kiosk page. It owns the page's view of
//! the content channel (loading vs ready vs errored), the remote-control focus
//! cursor, and the mapping from control codes to in-page actions. The host UI
//! layer is responsible only for rendering and for reporting its interactive
//! targets through [`host::PageHost`] and [`session::DisplaySession::targets_changed`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`content`] | Per-namespace loading/data state machine |
//! | [`target`] | Focus targets and their direction masks |
//! | [`focus`] | Directional traversal over the target sequence |
//! | [`dispatch`] | Control code dispatch and throttling |
//! | [`host`] | Interface the host UI implements |
//! | [`session`] | One display's state tying the above together |
//! | [`net`] | Native WebSocket runner with reconnect |

pub mod content;
pub mod dispatch;
pub mod focus;
pub mod host;
pub mod net;
pub mod session;
pub mod target;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use content::{Choreographer, ContentState, Phase};
pub use dispatch::{Dispatch, Dispatcher, THROTTLE_WINDOW};
pub use focus::{FocusEngine, Step};
pub use host::PageHost;
pub use session::{DisplaySession, Reaction};
pub use target::{FocusTarget, NavSet, TargetSnapshot};
