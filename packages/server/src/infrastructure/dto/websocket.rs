//! WebSocket frame DTOs.
//!
//! Every frame is a JSON text frame `{"event": "<name>", "data": ...}`.
//! Inbound payload fields are kept as raw JSON values and coerced leniently
//! in `conversion`, so a client sending `"duration": "30"` or omitting
//! `room` still gets a sensible command.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ========================================
// Inbound (client → server)
// ========================================

pub const IDENTITY_JOIN: &str = "identity.join";
pub const POLL_START: &str = "poll.start";
pub const POLL_VOTE: &str = "poll.vote";
pub const POLL_PREPARE: &str = "poll.prepare";
pub const ROOM_JOIN: &str = "room.join";
pub const ROOM_LEAVE: &str = "room.leave";
pub const ROOM_LIST: &str = "room.list";
pub const ROOM_MESSAGE: &str = "room.message";
pub const ROOM_KICK: &str = "room.kick";

/// Envelope of every inbound frame
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityJoinPayload {
    #[serde(default)]
    pub name: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollStartPayload {
    #[serde(default)]
    pub question: Value,
    #[serde(default)]
    pub duration: Value,
    #[serde(default)]
    pub options: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollVotePayload {
    #[serde(default)]
    pub option_index: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomJoinPayload {
    #[serde(default)]
    pub room: Value,
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub role: Value,
}

/// Payload of `room.leave` and `room.list`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomTargetPayload {
    #[serde(default)]
    pub room: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomMessagePayload {
    #[serde(default)]
    pub room: Value,
    #[serde(default)]
    pub text: Value,
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub role: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomKickPayload {
    #[serde(default)]
    pub room: Value,
    #[serde(default)]
    pub name: Value,
}

/// Inbound frame that cannot become a command
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
    #[error("invalid payload for '{event}': {reason}")]
    InvalidPayload { event: String, reason: String },
}

// ========================================
// Outbound (server → client)
// ========================================

/// Every event the server emits, tagged with its wire name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum OutboundMessage {
    #[serde(rename = "name-taken")]
    NameTaken,
    #[serde(rename = "identity.joined")]
    IdentityJoined(NamePayload),
    #[serde(rename = "poll.waiting")]
    PollWaiting,
    #[serde(rename = "poll.started")]
    PollStarted(PollStartedPayload),
    #[serde(rename = "poll.tick")]
    PollTick(PollTickPayload),
    #[serde(rename = "poll.update")]
    PollUpdate(OptionCountsPayload),
    #[serde(rename = "poll.ended")]
    PollEnded(OptionCountsPayload),
    #[serde(rename = "room.joined")]
    RoomJoined(RoomJoinedPayload),
    /// Bare array of `{name}`
    #[serde(rename = "room.participants")]
    RoomParticipants(Vec<ParticipantInfo>),
    #[serde(rename = "room.left")]
    RoomLeft(NamePayload),
    #[serde(rename = "room.message")]
    RoomMessage(ChatMessage),
    #[serde(rename = "identity.kicked")]
    IdentityKicked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamePayload {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollStartedPayload {
    pub question: String,
    /// Seconds; the remaining time for late joiners
    pub duration: u64,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollTickPayload {
    pub remaining_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionCountsPayload {
    pub option_counts: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomJoinedPayload {
    pub name: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantInfo {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: u64,
    pub room: String,
    pub name: String,
    pub role: Option<String>,
    pub text: String,
    /// Unix epoch milliseconds
    pub ts: i64,
}
