//! The session aggregate owned by the coordinator task.

use std::collections::HashSet;

use super::{
    identity::IdentityRegistry, poll::PollEngine, room::RoomPresence, value_object::ConnectionId,
};

/// All state of one live polling session.
///
/// Only the coordinator mutates it, one command at a time.
#[derive(Debug, Default)]
pub struct Session {
    /// Every open connection, identified or not.
    pub connections: HashSet<ConnectionId>,
    pub identities: IdentityRegistry,
    pub poll: PollEngine,
    pub rooms: RoomPresence,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// All open connections, sorted for deterministic fan-out.
    pub fn all_connections(&self) -> Vec<ConnectionId> {
        let mut connections: Vec<ConnectionId> = self.connections.iter().cloned().collect();
        connections.sort();
        connections
    }
}
