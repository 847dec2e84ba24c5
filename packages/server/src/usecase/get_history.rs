//! UseCase: 投票履歴の取得

use std::sync::Arc;

use crate::domain::{HistoryEntry, HistoryRepository};

/// 投票履歴取得のユースケース
pub struct GetHistoryUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn HistoryRepository>,
}

impl GetHistoryUseCase {
    /// 新しい GetHistoryUseCase を作成
    pub fn new(repository: Arc<dyn HistoryRepository>) -> Self {
        Self { repository }
    }

    /// 完了した投票を新しい順に返す（フィルタ・ページングなし）
    pub async fn execute(&self) -> Vec<HistoryEntry> {
        self.repository.list_newest_first().await
    }
}
