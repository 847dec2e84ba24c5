//! Identity registry: which connection owns which display name.

use std::collections::HashMap;

use thiserror::Error;

use super::value_object::{ConnectionId, DisplayName};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("display name '{0}' is already taken")]
    NameTaken(String),
}

/// Maps live connections to display names.
///
/// Both directions are kept so that `is_active` and kick-by-name stay O(1).
/// The two maps always mirror each other, which makes a duplicate active
/// name impossible.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    names_by_connection: HashMap<ConnectionId, DisplayName>,
    connections_by_name: HashMap<DisplayName, ConnectionId>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` for `connection_id`.
    ///
    /// Re-joining with the name the connection already owns is accepted. A
    /// connection that joins under a new name releases its previous one.
    pub fn join(
        &mut self,
        connection_id: &ConnectionId,
        name: DisplayName,
    ) -> Result<DisplayName, JoinError> {
        if let Some(owner) = self.connections_by_name.get(&name) {
            if owner == connection_id {
                return Ok(name);
            }
            return Err(JoinError::NameTaken(name.into_string()));
        }

        self.leave(connection_id);
        self.connections_by_name
            .insert(name.clone(), connection_id.clone());
        self.names_by_connection
            .insert(connection_id.clone(), name.clone());
        Ok(name)
    }

    /// Release whatever name `connection_id` holds. Idempotent.
    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<DisplayName> {
        let name = self.names_by_connection.remove(connection_id)?;
        self.connections_by_name.remove(&name);
        Some(name)
    }

    /// Release `name` regardless of which connection owns it.
    pub fn remove_name(&mut self, name: &DisplayName) -> Option<ConnectionId> {
        let connection_id = self.connections_by_name.remove(name)?;
        self.names_by_connection.remove(&connection_id);
        Some(connection_id)
    }

    pub fn name_of(&self, connection_id: &ConnectionId) -> Option<&DisplayName> {
        self.names_by_connection.get(connection_id)
    }

    pub fn is_active(&self, name: &DisplayName) -> bool {
        self.connections_by_name.contains_key(name)
    }

    pub fn count_active(&self) -> usize {
        self.connections_by_name.len()
    }

    /// Active names sorted for stable output
    #[cfg(test)]
    pub(crate) fn active_names(&self) -> Vec<DisplayName> {
        let mut names: Vec<DisplayName> = self.connections_by_name.keys().cloned().collect();
        names.sort();
        names
    }
}
