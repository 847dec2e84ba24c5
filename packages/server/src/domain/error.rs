//! Domain error types.

use thiserror::Error;

/// Value object construction errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("display name must not be blank")]
    EmptyDisplayName,

    #[error("room key must not be blank")]
    EmptyRoomKey,

    #[error("message text must not be blank")]
    EmptyMessageText,
}

/// Errors returned by a `MessagePusher`
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessagePushError {
    #[error("connection '{0}' is not registered")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("failed to encode event: {0}")]
    EncodeFailed(String),
}

/// Errors returned by a `HistoryRepository`
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("history entry {0} has already been recorded")]
    DuplicateEntry(u64),
}
