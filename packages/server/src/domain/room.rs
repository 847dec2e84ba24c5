//! Room presence: who is attached to which chat room.
//!
//! A name is listed in a room if and only if at least one live connection
//! is attached to that room under that name. Rooms are created on first
//! join and never removed; an abandoned room is just an empty list.

use std::collections::HashMap;

use super::value_object::{ConnectionId, DisplayName, MessageText, RoomKey, Timestamp};

/// A chat message as fanned out to the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMessage {
    pub id: u64,
    pub room: RoomKey,
    pub name: DisplayName,
    pub role: Option<String>,
    pub text: MessageText,
    pub sent_at: Timestamp,
}

/// Rooms a single connection has joined, and the name used in each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMembership {
    rooms: HashMap<RoomKey, DisplayName>,
}

impl ChatMembership {
    #[cfg(test)]
    pub(crate) fn name_in(&self, room: &RoomKey) -> Option<&DisplayName> {
        self.rooms.get(room)
    }
}

/// Outcome of [`RoomPresence::join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomJoin {
    /// Already in the room under the same name.
    Unchanged,
    /// Newly attached, or attached under a new name. `released` is the
    /// previous name when the rename took it off the participant list.
    Joined { released: Option<DisplayName> },
}

/// One connection detaching from one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDeparture {
    pub room: RoomKey,
    pub name: DisplayName,
    /// `false` when another connection still holds the name in the room.
    pub name_removed: bool,
}

#[derive(Debug, Default)]
pub struct RoomPresence {
    /// Participants per room, in join order.
    participants_by_room: HashMap<RoomKey, Vec<DisplayName>>,
    memberships: HashMap<ConnectionId, ChatMembership>,
    last_message_id: u64,
}

impl RoomPresence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `connection_id` to `room` under `name`.
    ///
    /// Renaming inside a room releases the old name first, so it drops off
    /// the list unless another connection still holds it.
    pub fn join(
        &mut self,
        connection_id: &ConnectionId,
        room: RoomKey,
        name: DisplayName,
    ) -> RoomJoin {
        let membership = self.memberships.entry(connection_id.clone()).or_default();
        let released = match membership.rooms.insert(room.clone(), name.clone()) {
            Some(previous) if previous == name => return RoomJoin::Unchanged,
            Some(previous) => self.release(&room, &previous).then_some(previous),
            None => None,
        };

        let participants = self.participants_by_room.entry(room).or_default();
        if !participants.contains(&name) {
            participants.push(name);
        }
        RoomJoin::Joined { released }
    }

    /// Detach `connection_id` from `room`.
    ///
    /// Returns `None` when the connection never joined that room.
    pub fn leave(&mut self, connection_id: &ConnectionId, room: &RoomKey) -> Option<RoomDeparture> {
        let name = self
            .memberships
            .get_mut(connection_id)?
            .rooms
            .remove(room)?;
        let name_removed = self.release(room, &name);
        Some(RoomDeparture {
            room: room.clone(),
            name,
            name_removed,
        })
    }

    /// Drop every attachment of a closed connection, plus its membership
    /// record.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Vec<RoomDeparture> {
        let Some(membership) = self.memberships.remove(connection_id) else {
            return Vec::new();
        };

        let mut attachments: Vec<(RoomKey, DisplayName)> = membership.rooms.into_iter().collect();
        attachments.sort();
        attachments
            .into_iter()
            .map(|(room, name)| {
                let name_removed = self.release(&room, &name);
                RoomDeparture {
                    room,
                    name,
                    name_removed,
                }
            })
            .collect()
    }

    /// Forcibly detach every connection attached to `room` as `name`.
    ///
    /// Returns the detached connections, sorted.
    pub fn kick(&mut self, room: &RoomKey, name: &DisplayName) -> Vec<ConnectionId> {
        let mut kicked: Vec<ConnectionId> = self
            .memberships
            .iter_mut()
            .filter_map(|(connection_id, membership)| {
                if membership.rooms.get(room) == Some(name) {
                    membership.rooms.remove(room);
                    Some(connection_id.clone())
                } else {
                    None
                }
            })
            .collect();
        kicked.sort();

        if let Some(participants) = self.participants_by_room.get_mut(room) {
            participants.retain(|participant| participant != name);
        }
        kicked
    }

    /// Participants of `room` in join order. Unknown rooms are empty.
    pub fn participants(&self, room: &RoomKey) -> Vec<DisplayName> {
        self.participants_by_room
            .get(room)
            .cloned()
            .unwrap_or_default()
    }

    /// Connections currently attached to `room`, sorted.
    pub fn connections_in(&self, room: &RoomKey) -> Vec<ConnectionId> {
        let mut connections: Vec<ConnectionId> = self
            .memberships
            .iter()
            .filter(|(_, membership)| membership.rooms.contains_key(room))
            .map(|(connection_id, _)| connection_id.clone())
            .collect();
        connections.sort();
        connections
    }

    #[cfg(test)]
    pub(crate) fn membership(&self, connection_id: &ConnectionId) -> Option<&ChatMembership> {
        self.memberships.get(connection_id)
    }

    /// Build the next message for `room`; ids increase monotonically.
    pub fn compose_message(
        &mut self,
        room: RoomKey,
        name: DisplayName,
        role: Option<String>,
        text: MessageText,
        sent_at: Timestamp,
    ) -> RoomMessage {
        self.last_message_id += 1;
        RoomMessage {
            id: self.last_message_id,
            room,
            name,
            role,
            text,
            sent_at,
        }
    }

    /// Remove `name` from `room` unless some connection still holds it there.
    fn release(&mut self, room: &RoomKey, name: &DisplayName) -> bool {
        let still_attached = self
            .memberships
            .values()
            .any(|membership| membership.rooms.get(room) == Some(name));
        if still_attached {
            return false;
        }

        match self.participants_by_room.get_mut(room) {
            Some(participants) => {
                let before = participants.len();
                participants.retain(|participant| participant != name);
                participants.len() != before
            }
            None => false,
        }
    }
}
