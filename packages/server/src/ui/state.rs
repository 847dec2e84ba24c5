//! Shared application state.

use std::sync::Arc;

use crate::usecase::{GetHistoryUseCase, SessionHandle};

/// Shared application state
pub struct AppState {
    /// SessionHandle（コーディネーターへのコマンド送信）
    pub session: SessionHandle,
    /// GetHistoryUseCase（投票履歴取得のユースケース）
    pub get_history_usecase: Arc<GetHistoryUseCase>,
}
