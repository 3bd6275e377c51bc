//! Loading/data state machine for one content namespace.
//!
//! DESIGN
//! ======
//! A display subscribed to a namespace is always in one of `Loading`,
//! `Ready(payload)` or `Errored(error)`. Subscribing enters `Loading` and
//! yields the subscribe event that makes the relay pull fresh content. Events
//! naming a different namespace never cause a transition, which keeps the
//! relay's broadcast fallback from leaking another display's content.
//!
//! `Idle` means "not subscribed": nothing is applied until `subscribe`.

#[cfg(test)]
#[path = "content_test.rs"]
mod content_test;

use frames::{Content, Event};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ContentState {
    #[default]
    Idle,
    Loading,
    Ready(Value),
    Errored(Value),
}

impl ContentState {
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Loading => Phase::Loading,
            Self::Ready(_) => Phase::Ready,
            Self::Errored(_) => Phase::Errored,
        }
    }
}

/// Payload-free view of a [`ContentState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Errored,
}

#[derive(Debug, Clone)]
pub struct Choreographer {
    namespace: String,
    state: ContentState,
}

impl Choreographer {
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), state: ContentState::Idle }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn state(&self) -> &ContentState {
        &self.state
    }

    /// Enter `Loading` and return the pull trigger for this namespace.
    pub fn subscribe(&mut self) -> Event {
        self.state = ContentState::Loading;
        Event::Subscribe { namespace: self.namespace.clone() }
    }

    /// Back to `Idle`; later events are ignored until the next subscribe.
    pub fn teardown(&mut self) {
        self.state = ContentState::Idle;
    }

    /// Whether an event addressed to `namespace` concerns this machine.
    /// Events without a namespace concern everyone.
    #[must_use]
    pub fn accepts(&self, namespace: Option<&str>) -> bool {
        namespace.is_none_or(|ns| ns == self.namespace)
    }

    /// Apply an inbound event. Returns `true` when the state was (re)entered,
    /// including the `Loading -> Loading` self-transition.
    pub fn apply(&mut self, event: &Event) -> bool {
        if self.state == ContentState::Idle || !self.accepts(event.namespace()) {
            return false;
        }

        match event {
            Event::Loading { .. } => {
                self.state = ContentState::Loading;
                true
            }
            Event::Data { content: Content::Error(error), .. } => {
                self.state = ContentState::Errored(error.clone());
                true
            }
            Event::Data { content: Content::Payload(payload), .. } => {
                self.state = ContentState::Ready(payload.clone());
                true
            }
            _ => false,
        }
    }
}
