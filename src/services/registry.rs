//! Connection registry: who is connected, in which role, subscribed where.
//!
//! DESIGN
//! ======
//! The registry is an owned value inside the relay, not ambient global
//! state. A connection belongs to at most one namespace group; subscribing
//! again moves it. Groups exist only while they have members.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::{HashMap, HashSet};

use frames::Event;
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Display,
    Producer,
}

#[derive(Debug)]
pub struct Connection {
    pub role: Role,
    pub namespace: Option<String>,
    /// Outbound queue drained by the connection's socket task.
    pub tx: mpsc::Sender<Event>,
}

/// Result of a subscribe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    Joined,
    Moved { from: String },
    Unchanged,
}

#[derive(Debug, Default)]
pub struct Registry {
    connections: HashMap<Uuid, Connection>,
    groups: HashMap<String, HashSet<Uuid>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: Uuid, role: Role, tx: mpsc::Sender<Event>) {
        self.connections.insert(id, Connection { role, namespace: None, tx });
    }

    /// Put `id` in the group for `namespace`, leaving any previous group.
    /// A subscribing producer becomes a display. Returns `None` for an
    /// unknown connection.
    pub fn subscribe(&mut self, id: Uuid, namespace: &str) -> Option<Membership> {
        let connection = self.connections.get_mut(&id)?;
        connection.role = Role::Display;

        let membership = match connection.namespace.replace(namespace.to_owned()) {
            Some(previous) if previous == namespace => return Some(Membership::Unchanged),
            Some(previous) => {
                leave(&mut self.groups, &previous, id);
                Membership::Moved { from: previous }
            }
            None => Membership::Joined,
        };
        self.groups.entry(namespace.to_owned()).or_default().insert(id);
        Some(membership)
    }

    /// Remove `id` and its group membership. Unknown ids are a no-op.
    pub fn unregister(&mut self, id: Uuid) -> Option<Connection> {
        let connection = self.connections.remove(&id)?;
        if let Some(namespace) = &connection.namespace {
            leave(&mut self.groups, namespace, id);
        }
        Some(connection)
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Connection> {
        self.connections.get(&id)
    }

    #[must_use]
    pub fn namespace_of(&self, id: Uuid) -> Option<&str> {
        self.connections.get(&id)?.namespace.as_deref()
    }

    /// Members of `namespace`'s group. Empty when nobody is subscribed.
    pub fn group(&self, namespace: &str) -> impl Iterator<Item = Uuid> + '_ {
        self.groups.get(namespace).into_iter().flatten().copied()
    }

    #[must_use]
    pub fn group_size(&self, namespace: &str) -> usize {
        self.groups.get(namespace).map_or(0, HashSet::len)
    }

    pub fn displays(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.with_role(Role::Display)
    }

    pub fn producers(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.with_role(Role::Producer)
    }

    pub fn all(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.connections.keys().copied()
    }

    fn with_role(&self, role: Role) -> impl Iterator<Item = Uuid> + '_ {
        self.connections.iter().filter(move |(_, c)| c.role == role).map(|(id, _)| *id)
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

fn leave(groups: &mut HashMap<String, HashSet<Uuid>>, namespace: &str, id: Uuid) {
    if let Some(members) = groups.get_mut(namespace) {
        members.remove(&id);
        if members.is_empty() {
            groups.remove(namespace);
        }
    }
}
