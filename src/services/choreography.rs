//! Relay-side loading/data bookkeeping per namespace.
//!
//! The relay mirrors what its displays see: one [`Choreographer`] per
//! namespace, driven by the same events it routes. State outlives the
//! producer that wrote it (last write wins) but not the displays: a machine
//! exists only while its namespace group has members. Reported by
//! `GET /api/namespaces`.

#[cfg(test)]
#[path = "choreography_test.rs"]
mod choreography_test;

use std::collections::BTreeMap;

use frames::Event;
use kiosk::{Choreographer, Phase};
use serde::Serialize;

use super::registry::Registry;
use super::router::Audience;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceStatus {
    pub namespace: String,
    pub phase: Phase,
    pub subscribers: usize,
}

#[derive(Debug, Default)]
pub struct Choreography {
    machines: BTreeMap<String, Choreographer>,
}

impl Choreography {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A display asked for `namespace`: enter `Loading` and return the pull
    /// trigger for producers.
    pub fn subscribe(&mut self, namespace: &str) -> Event {
        self.machines
            .entry(namespace.to_owned())
            .or_insert_with(|| Choreographer::new(namespace))
            .subscribe();
        Event::RequestData { namespace: namespace.to_owned() }
    }

    /// Drop the machine for `namespace` once its group is empty. Returns
    /// whether a machine was removed.
    pub fn release(&mut self, namespace: &str, registry: &Registry) -> bool {
        registry.group_size(namespace) == 0 && self.machines.remove(namespace).is_some()
    }

    /// Apply a routed content event to the machines whose displays receive it.
    pub fn observe(&mut self, event: &Event, audience: &Audience) {
        match audience {
            Audience::Group(namespace) => {
                if let Some(machine) = self.machines.get_mut(namespace) {
                    machine.apply(event);
                }
            }
            Audience::Displays | Audience::Everyone => {
                for machine in self.machines.values_mut() {
                    machine.apply(event);
                }
            }
            Audience::Producers => {}
        }
    }

    /// Every tracked namespace, sorted by name.
    #[must_use]
    pub fn status(&self, registry: &Registry) -> Vec<NamespaceStatus> {
        self.machines
            .iter()
            .map(|(namespace, machine)| NamespaceStatus {
                namespace: namespace.clone(),
                phase: machine.state().phase(),
                subscribers: registry.group_size(namespace),
            })
            .collect()
    }
}
