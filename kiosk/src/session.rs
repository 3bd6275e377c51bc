//! One display's view of the kiosk channel.
//!
//! DESIGN
//! ======
//! `DisplaySession` owns everything a single rendered page needs: the
//! content state machine for its namespace, the focus cursor, the lettered
//! answer pool and the control dispatcher. The transport feeds it decoded
//! events through [`DisplaySession::handle`]; the host UI feeds it target
//! changes through [`DisplaySession::targets_changed`]. Nothing here does
//! I/O, so a session can be driven entirely from tests.
//!
//! Control codes are only honoured once content has settled (`Ready` or
//! `Errored`). While the spinner is up the page has no stable targets.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::time::Instant;

use frames::{ControlCode, Coordinates, Event};
use tracing::{debug, info, warn};

use crate::content::{Choreographer, ContentState, Phase};
use crate::dispatch::{Dispatch, Dispatcher};
use crate::focus::FocusEngine;
use crate::host::PageHost;
use crate::target::{FocusTarget, TargetSnapshot};

/// What the session did with one inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// Not addressed to this display, or not actionable in its state.
    Ignored,
    Connected,
    /// Content state changed and was re-rendered.
    Rendered(Phase),
    Dispatched(Dispatch),
    StartChanged(bool),
    Coordinates { stable: bool },
}

pub struct DisplaySession<H: PageHost> {
    host: H,
    content: Choreographer,
    focus: FocusEngine<H::Element>,
    answers: Vec<FocusTarget<H::Element>>,
    dispatcher: Dispatcher,
    connection_id: Option<String>,
    start: bool,
    pending: Option<Coordinates>,
    stable: Option<Coordinates>,
}

impl<H: PageHost> DisplaySession<H> {
    #[must_use]
    pub fn new(namespace: impl Into<String>, host: H) -> Self {
        Self {
            host,
            content: Choreographer::new(namespace),
            focus: FocusEngine::new(),
            answers: Vec::new(),
            dispatcher: Dispatcher::default(),
            connection_id: None,
            start: false,
            pending: None,
            stable: None,
        }
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Transport is up. Enters `Loading` and returns the subscribe event that
    /// must be sent to the relay. Called on every (re)connect.
    pub fn on_connect(&mut self) -> Event {
        let event = self.content.subscribe();
        self.host.render(self.content.state());
        info!(namespace = self.content.namespace(), "kiosk: subscribe");
        event
    }

    /// Transport is gone. Drops every piece of per-connection state; nothing
    /// carries over to the next connection.
    pub fn on_disconnect(&mut self) {
        self.content.teardown();
        self.focus.clear();
        self.answers.clear();
        self.dispatcher.reset();
        self.connection_id = None;
        self.host.render(self.content.state());
        info!(namespace = self.content.namespace(), "kiosk: disconnected");
    }

    /// Leave the current namespace for `namespace`. Returns the subscribe
    /// event for the new one.
    pub fn switch_namespace(&mut self, namespace: impl Into<String>) -> Event {
        self.content.teardown();
        self.focus.clear();
        self.answers.clear();
        self.content = Choreographer::new(namespace);
        self.on_connect()
    }

    /// The host's interactive targets changed. Replaces both pools wholesale.
    pub fn targets_changed(&mut self, snapshot: TargetSnapshot<H::Element>) {
        debug!(
            navigable = snapshot.navigable.len(),
            answers = snapshot.answers.len(),
            "kiosk: targets rebuilt"
        );
        self.focus.rebuild(snapshot.navigable, &mut self.host);
        self.answers = snapshot.answers;
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Apply one inbound event at `now`.
    pub fn handle(&mut self, event: Event, now: Instant) -> Reaction {
        match event {
            Event::Connected { connection_id } => {
                debug!(%connection_id, "kiosk: connected");
                self.connection_id = Some(connection_id);
                Reaction::Connected
            }
            Event::Data { .. } | Event::Loading { .. } => self.apply_content(&event),
            Event::Control { action } => self.apply_control(&action, now),
            Event::CoordinatesPending(coords) => {
                self.pending = Some(coords);
                self.host.show_coordinates(coords, false);
                Reaction::Coordinates { stable: false }
            }
            Event::CoordinatesStable(coords) => {
                self.pending = None;
                self.stable = Some(coords);
                self.host.show_coordinates(coords, true);
                Reaction::Coordinates { stable: true }
            }
            Event::Start { start } => {
                self.start = start;
                self.host.show_start(start);
                Reaction::StartChanged(start)
            }
            Event::Error { code, message } => {
                warn!(%code, %message, "kiosk: relay rejected a frame");
                Reaction::Ignored
            }
            Event::Subscribe { .. } | Event::RequestData { .. } => Reaction::Ignored,
        }
    }

    fn apply_content(&mut self, event: &Event) -> Reaction {
        if !self.content.apply(event) {
            debug!(kind = event.kind(), namespace = ?event.namespace(), "kiosk: content ignored");
            return Reaction::Ignored;
        }
        if self.content.state() == &ContentState::Loading {
            // Targets of the previous render are stale until the host reports.
            self.focus.clear();
            self.answers.clear();
        }
        self.host.render(self.content.state());
        Reaction::Rendered(self.content.state().phase())
    }

    fn apply_control(&mut self, action: &str, now: Instant) -> Reaction {
        let phase = self.content.state().phase();
        if !matches!(phase, Phase::Ready | Phase::Errored) {
            debug!(action, ?phase, "kiosk: control ignored until content settles");
            return Reaction::Ignored;
        }
        let code = ControlCode::parse(action);
        let outcome = self.dispatcher.dispatch(&code, now, &mut self.focus, &self.answers, &mut self.host);
        Reaction::Dispatched(outcome)
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn namespace(&self) -> &str {
        self.content.namespace()
    }

    #[must_use]
    pub fn state(&self) -> &ContentState {
        self.content.state()
    }

    #[must_use]
    pub fn focus(&self) -> &FocusEngine<H::Element> {
        &self.focus
    }

    #[must_use]
    pub fn answers(&self) -> &[FocusTarget<H::Element>] {
        &self.answers
    }

    #[must_use]
    pub fn connection_id(&self) -> Option<&str> {
        self.connection_id.as_deref()
    }

    /// Start flag as last observed by this display.
    #[must_use]
    pub fn start(&self) -> bool {
        self.start
    }

    #[must_use]
    pub fn pending(&self) -> Option<Coordinates> {
        self.pending
    }

    #[must_use]
    pub fn stable(&self) -> Option<Coordinates> {
        self.stable
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }
}
