//! UseCase 層のエラー定義

use thiserror::Error;

/// セッションへのコマンド送信エラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// コーディネーターのタスクが終了している
    #[error("session coordinator has stopped")]
    CoordinatorStopped,
}
