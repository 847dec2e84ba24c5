//! Domain layer: session state and the seams it needs from the outside.
//!
//! Everything in here is synchronous and owned by a single coordinator task,
//! except the traits (`MessagePusher`, `HistoryRepository`, `Ticker`) whose
//! implementations live in the infrastructure layer.

pub mod error;
pub mod event;
pub mod history;
pub mod identity;
pub mod message_pusher;
pub mod poll;
pub mod repository;
pub mod room;
pub mod session;
pub mod ticker;
pub mod value_object;

pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use event::SessionEvent;
pub use history::{EndReason, HistoryEntry};
pub use identity::{IdentityRegistry, JoinError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use poll::{
    PollDraft, PollEngine, PollStatus, RunningPoll, StartPollError, TickReport, VoteRejection,
};
pub use repository::HistoryRepository;
pub use room::{ChatMembership, RoomDeparture, RoomJoin, RoomMessage, RoomPresence};
pub use session::Session;
pub use ticker::{TickHandle, Ticker};
pub use value_object::{ConnectionId, DisplayName, MessageText, RoomKey, Timestamp};
