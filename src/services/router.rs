//! Room router: resolve an audience and push events into client queues.
//!
//! DESIGN
//! ======
//! Routing falls through three tiers. An event naming a namespace with at
//! least one subscriber goes to that group. Otherwise it goes to the
//! sender's own group when the sender is subscribed somewhere. Otherwise it
//! is broadcast to every display.
//!
//! Delivery is best-effort `try_send`, same as any other fan-out: a full or
//! closed queue skips that client. A batch is all-or-nothing per recipient.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use frames::Event;
use uuid::Uuid;

use super::registry::Registry;

/// Who receives an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Group(String),
    Displays,
    Producers,
    Everyone,
}

/// Counts from one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    pub dropped: usize,
}

/// Apply the three-tier routing rule.
#[must_use]
pub fn resolve(registry: &Registry, sender: Option<Uuid>, namespace: Option<&str>) -> Audience {
    if let Some(namespace) = namespace.filter(|ns| registry.group_size(ns) > 0) {
        return Audience::Group(namespace.to_owned());
    }
    if let Some(own) = sender.and_then(|id| registry.namespace_of(id)) {
        return Audience::Group(own.to_owned());
    }
    Audience::Displays
}

/// Connection ids in `audience`, minus `exclude`.
#[must_use]
pub fn recipients(registry: &Registry, audience: &Audience, exclude: Option<Uuid>) -> Vec<Uuid> {
    let ids: Vec<Uuid> = match audience {
        Audience::Group(namespace) => registry.group(namespace).collect(),
        Audience::Displays => registry.displays().collect(),
        Audience::Producers => registry.producers().collect(),
        Audience::Everyone => registry.all().collect(),
    };
    ids.into_iter().filter(|id| Some(*id) != exclude).collect()
}

/// Queue one event for every recipient in `audience`.
pub fn deliver(registry: &Registry, audience: &Audience, event: &Event, exclude: Option<Uuid>) -> Delivery {
    deliver_batch(registry, audience, std::slice::from_ref(event), exclude)
}

/// Queue `events`, in order, for every recipient in `audience`. A recipient
/// whose queue cannot take the whole batch gets none of it.
pub fn deliver_batch(registry: &Registry, audience: &Audience, events: &[Event], exclude: Option<Uuid>) -> Delivery {
    let mut delivery = Delivery::default();
    for id in recipients(registry, audience, exclude) {
        let Some(connection) = registry.get(id) else {
            continue;
        };
        let tx = &connection.tx;
        // Only the relay sends on these queues, and it holds the registry,
        // so capacity cannot shrink between the check and the sends.
        if tx.is_closed() || tx.capacity() < events.len() {
            tracing::warn!(%id, kind = events.first().map(Event::kind), "router: queue full or closed, dropping");
            delivery.dropped += 1;
            continue;
        }
        for event in events {
            let _ = tx.try_send(event.clone());
        }
        delivery.delivered += 1;
    }
    delivery
}
