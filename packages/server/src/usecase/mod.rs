//! UseCase 層
//!
//! - `SessionCoordinator`: セッション状態を単独で所有するタスク。
//!   すべてのコマンドを 1 つずつ直列に処理する
//! - `GetHistoryUseCase`: 投票履歴の読み取り（HTTP 用）

mod chat;
mod command;
mod coordinator;
mod error;
mod get_history;
mod identity;
mod poll;
#[cfg(test)]
mod test_support;

pub use command::{ClientCommand, SessionCommand};
pub use coordinator::{SessionConfig, SessionCoordinator, SessionHandle};
pub use error::SessionError;
pub use get_history::GetHistoryUseCase;
