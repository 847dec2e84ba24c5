//! Events emitted by the session coordinator.
//!
//! Wire encoding lives in `infrastructure::dto::websocket`.

use super::{room::RoomMessage, value_object::DisplayName};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The requested display name belongs to another connection.
    NameTaken,
    /// Identity accepted.
    IdentityJoined { name: DisplayName },
    /// No poll is running; show a waiting screen.
    PollWaiting,
    PollStarted {
        question: String,
        duration_secs: u64,
        options: Vec<String>,
    },
    PollTick { remaining_secs: u64 },
    PollUpdate { option_counts: Vec<u32> },
    PollEnded { option_counts: Vec<u32> },
    RoomJoined {
        name: DisplayName,
        role: Option<String>,
    },
    RoomParticipants { participants: Vec<DisplayName> },
    RoomLeft { name: DisplayName },
    RoomMessage(RoomMessage),
    /// The receiving connection was forcibly removed.
    IdentityKicked,
}
