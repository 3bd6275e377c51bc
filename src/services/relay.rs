//! The relay: one owner for the registry, per-namespace choreography, and
//! the start-flag handshake.
//!
//! DESIGN
//! ======
//! Every operation runs to completion under the relay lock and never awaits,
//! so events from one connection keep their order. Handlers queue outbound
//! events through the router; anything returned from [`Relay::handle`] goes
//! back to the sender only.
//!
//! LIFECYCLE
//! =========
//! 1. `connect` registers the queue and returns the `connected` greeting
//! 2. `handle` routes each decoded inbound event
//! 3. `disconnect` drops the connection and its group membership

#[cfg(test)]
#[path = "relay_test.rs"]
mod relay_test;

use frames::{Coordinates, Event};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::choreography::{Choreography, NamespaceStatus};
use super::handshake::Handshake;
use super::registry::{Membership, Registry, Role};
use super::router::{self, Audience, Delivery};

/// Process-wide view for operators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelaySummary {
    pub connections: usize,
    pub displays: usize,
    pub producers: usize,
    pub start: bool,
    pub last_stable: Option<Coordinates>,
}

#[derive(Debug)]
pub struct Relay {
    registry: Registry,
    choreography: Choreography,
    handshake: Handshake,
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}

impl Relay {
    #[must_use]
    pub fn new() -> Self {
        Self { registry: Registry::new(), choreography: Choreography::new(), handshake: Handshake::new() }
    }

    pub fn connect(&mut self, id: Uuid, role: Role, tx: mpsc::Sender<Event>) -> Event {
        self.registry.register(id, role, tx);
        info!(%id, ?role, "relay: connected");
        Event::Connected { connection_id: id.to_string() }
    }

    /// Safe to call for an id that is already gone.
    pub fn disconnect(&mut self, id: Uuid) {
        if let Some(connection) = self.registry.unregister(id) {
            info!(%id, namespace = ?connection.namespace, "relay: disconnected");
            if let Some(namespace) = connection.namespace {
                self.release(&namespace);
            }
        }
    }

    /// Route one inbound event from `sender`. Returns events for the sender.
    pub fn handle(&mut self, sender: Uuid, event: Event) -> Vec<Event> {
        match event {
            Event::Subscribe { namespace } => {
                match self.registry.subscribe(sender, &namespace) {
                    Some(Membership::Moved { from }) => {
                        info!(%sender, %from, %namespace, "relay: subscribe moved");
                        self.release(&from);
                    }
                    Some(_) => info!(%sender, %namespace, "relay: subscribe"),
                    None => warn!(%sender, %namespace, "relay: subscribe from unknown connection"),
                }
                self.request_data(&namespace);
                Vec::new()
            }
            Event::RequestData { namespace } => {
                self.request_data(&namespace);
                Vec::new()
            }
            Event::Data { .. } | Event::Loading { .. } => {
                let audience = router::resolve(&self.registry, Some(sender), event.namespace());
                self.choreography.observe(&event, &audience);
                self.fan_out(&audience, &event, Some(sender));
                Vec::new()
            }
            Event::Control { .. } => {
                let audience = router::resolve(&self.registry, Some(sender), None);
                self.fan_out(&audience, &event, Some(sender));
                Vec::new()
            }
            Event::CoordinatesPending(_) => {
                self.fan_out(&Audience::Everyone, &event, Some(sender));
                Vec::new()
            }
            Event::CoordinatesStable(coords) => {
                self.stable(coords, Some(sender));
                Vec::new()
            }
            Event::Start { start } => {
                let event = self.handshake.set_start(start);
                self.fan_out(&Audience::Everyone, &event, Some(sender));
                Vec::new()
            }
            Event::Connected { .. } | Event::Error { .. } => {
                warn!(%sender, kind = event.kind(), "relay: unexpected inbound kind");
                vec![Event::Error {
                    code: "E_UNEXPECTED_KIND".into(),
                    message: format!("{} is relay-to-client only", event.kind()),
                }]
            }
        }
    }

    /// Stable coordinates from any source, relayed with the start reset.
    pub fn stable(&mut self, coords: Coordinates, sender: Option<Uuid>) -> Delivery {
        let batch = self.handshake.on_stable(coords);
        let delivery = router::deliver_batch(&self.registry, &Audience::Everyone, &batch, sender);
        info!(lat = coords.lat, lon = coords.lon, delivered = delivery.delivered, "relay: stable coordinates, start reset");
        delivery
    }

    /// Pull fresh content for `namespace`. Only namespaces with subscribers
    /// are tracked; the pull itself always goes out.
    fn request_data(&mut self, namespace: &str) {
        let request = if self.registry.group_size(namespace) > 0 {
            self.choreography.subscribe(namespace)
        } else {
            Event::RequestData { namespace: namespace.to_owned() }
        };
        let delivery = router::deliver(&self.registry, &Audience::Producers, &request, None);
        if delivery.delivered == 0 {
            debug!(%namespace, "relay: no producer to pull from");
        }
    }

    fn release(&mut self, namespace: &str) {
        if self.choreography.release(namespace, &self.registry) {
            debug!(%namespace, "relay: last display left, namespace dropped");
        }
    }

    fn fan_out(&self, audience: &Audience, event: &Event, sender: Option<Uuid>) {
        let delivery = router::deliver(&self.registry, audience, event, sender);
        debug!(kind = event.kind(), ?audience, delivered = delivery.delivered, dropped = delivery.dropped, "relay: fan-out");
    }

    #[must_use]
    pub fn status(&self) -> Vec<NamespaceStatus> {
        self.choreography.status(&self.registry)
    }

    #[must_use]
    pub fn summary(&self) -> RelaySummary {
        RelaySummary {
            connections: self.registry.connection_count(),
            displays: self.registry.displays().count(),
            producers: self.registry.producers().count(),
            start: self.handshake.start(),
            last_stable: self.handshake.last_stable(),
        }
    }

    #[cfg(test)]
    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }
}
