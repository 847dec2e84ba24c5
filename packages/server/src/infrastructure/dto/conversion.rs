//! Conversion logic between DTOs and domain types.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    domain::{HistoryEntry, RoomMessage, SessionEvent},
    infrastructure::dto::{http, websocket as dto},
    usecase::ClientCommand,
};

// ========================================
// Inbound frame → ClientCommand
// ========================================

/// Parse a raw text frame into a command for the coordinator
pub fn parse_client_command(text: &str) -> Result<ClientCommand, dto::FrameError> {
    let frame: dto::InboundFrame = serde_json::from_str(text)?;
    ClientCommand::try_from(frame)
}

impl TryFrom<dto::InboundFrame> for ClientCommand {
    type Error = dto::FrameError;

    fn try_from(frame: dto::InboundFrame) -> Result<Self, Self::Error> {
        let dto::InboundFrame { event, data } = frame;
        let command = match event.as_str() {
            dto::IDENTITY_JOIN => {
                let payload: dto::IdentityJoinPayload = payload(&event, data)?;
                ClientCommand::JoinIdentity {
                    name: lenient_string(&payload.name).unwrap_or_default(),
                }
            }
            dto::POLL_START => {
                let payload: dto::PollStartPayload = payload(&event, data)?;
                ClientCommand::StartPoll {
                    question: lenient_string(&payload.question).unwrap_or_default(),
                    duration_secs: lenient_duration(&payload.duration),
                    options: lenient_options(&payload.options),
                }
            }
            dto::POLL_VOTE => {
                let payload: dto::PollVotePayload = payload(&event, data)?;
                ClientCommand::Vote {
                    option_index: payload.option_index.as_i64(),
                }
            }
            dto::POLL_PREPARE => ClientCommand::PreparePoll,
            dto::ROOM_JOIN => {
                let payload: dto::RoomJoinPayload = payload(&event, data)?;
                ClientCommand::JoinRoom {
                    room: lenient_string(&payload.room),
                    name: lenient_string(&payload.name),
                    role: lenient_string(&payload.role),
                }
            }
            dto::ROOM_LEAVE => {
                let payload: dto::RoomTargetPayload = payload(&event, data)?;
                ClientCommand::LeaveRoom {
                    room: lenient_string(&payload.room),
                }
            }
            dto::ROOM_LIST => {
                let payload: dto::RoomTargetPayload = payload(&event, data)?;
                ClientCommand::ListRoom {
                    room: lenient_string(&payload.room),
                }
            }
            dto::ROOM_MESSAGE => {
                let payload: dto::RoomMessagePayload = payload(&event, data)?;
                ClientCommand::SendMessage {
                    room: lenient_string(&payload.room),
                    text: lenient_string(&payload.text).unwrap_or_default(),
                    name: lenient_string(&payload.name),
                    role: lenient_string(&payload.role),
                }
            }
            dto::ROOM_KICK => {
                let payload: dto::RoomKickPayload = payload(&event, data)?;
                ClientCommand::Kick {
                    room: lenient_string(&payload.room),
                    name: lenient_string(&payload.name).unwrap_or_default(),
                }
            }
            _ => return Err(dto::FrameError::UnknownEvent(event)),
        };
        Ok(command)
    }
}

/// Missing or `null` data decodes as an empty payload
fn payload<T>(event: &str, data: Value) -> Result<T, dto::FrameError>
where
    T: DeserializeOwned + Default,
{
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data).map_err(|e| dto::FrameError::InvalidPayload {
        event: event.to_string(),
        reason: e.to_string(),
    })
}

/// Strings pass through, numbers and `true` are stringified, anything else
/// (including `""`) counts as absent.
fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Positive number of seconds, given as a JSON number or numeric string.
/// Fractions round up.
fn lenient_duration(value: &Value) -> Option<u64> {
    let secs = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if secs.is_finite() && secs > 0.0 {
        Some(secs.ceil() as u64)
    } else {
        None
    }
}

fn lenient_options(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|options| {
            options
                .iter()
                .map(|option| lenient_string(option).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default()
}

// ========================================
// Domain → Outbound DTO
// ========================================

impl From<&SessionEvent> for dto::OutboundMessage {
    fn from(event: &SessionEvent) -> Self {
        match event {
            SessionEvent::NameTaken => Self::NameTaken,
            SessionEvent::IdentityJoined { name } => Self::IdentityJoined(dto::NamePayload {
                name: name.as_str().to_string(),
            }),
            SessionEvent::PollWaiting => Self::PollWaiting,
            SessionEvent::PollStarted {
                question,
                duration_secs,
                options,
            } => Self::PollStarted(dto::PollStartedPayload {
                question: question.clone(),
                duration: *duration_secs,
                options: options.clone(),
            }),
            SessionEvent::PollTick { remaining_secs } => Self::PollTick(dto::PollTickPayload {
                remaining_seconds: *remaining_secs,
            }),
            SessionEvent::PollUpdate { option_counts } => {
                Self::PollUpdate(dto::OptionCountsPayload {
                    option_counts: option_counts.clone(),
                })
            }
            SessionEvent::PollEnded { option_counts } => {
                Self::PollEnded(dto::OptionCountsPayload {
                    option_counts: option_counts.clone(),
                })
            }
            SessionEvent::RoomJoined { name, role } => {
                Self::RoomJoined(dto::RoomJoinedPayload {
                    name: name.as_str().to_string(),
                    role: role.clone(),
                })
            }
            SessionEvent::RoomParticipants { participants } => Self::RoomParticipants(
                participants
                    .iter()
                    .map(|name| dto::ParticipantInfo {
                        name: name.as_str().to_string(),
                    })
                    .collect(),
            ),
            SessionEvent::RoomLeft { name } => Self::RoomLeft(dto::NamePayload {
                name: name.as_str().to_string(),
            }),
            SessionEvent::RoomMessage(message) => Self::RoomMessage(message.into()),
            SessionEvent::IdentityKicked => Self::IdentityKicked,
        }
    }
}

impl From<&RoomMessage> for dto::ChatMessage {
    fn from(model: &RoomMessage) -> Self {
        Self {
            id: model.id,
            room: model.room.as_str().to_string(),
            name: model.name.as_str().to_string(),
            role: model.role.clone(),
            text: model.text.as_str().to_string(),
            ts: model.sent_at.value(),
        }
    }
}

/// Encode an event as a wire frame
pub fn encode_event(event: &SessionEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&dto::OutboundMessage::from(event))
}

impl From<HistoryEntry> for http::HistoryItemDto {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            id: entry.id,
            question: entry.question,
            options: entry.options,
            option_counts: entry.option_counts,
            started_at: entry.started_at.value(),
            ended_at: entry.ended_at.value(),
            duration: entry.duration_secs,
            reason: entry.reason.as_str().to_string(),
        }
    }
}
