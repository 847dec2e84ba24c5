//! Repository trait 定義
//!
//! 完了した投票の履歴（History Log）へのアクセスを抽象化します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{HistoryEntry, RepositoryError};

/// History Repository trait
///
/// 追記専用。記録されたエントリは変更も削除もされない。
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// 完了した投票を追記（同じ ID の二重記録はエラー）
    async fn append(&self, entry: HistoryEntry) -> Result<(), RepositoryError>;

    /// 新しい順に全履歴を取得
    async fn list_newest_first(&self) -> Vec<HistoryEntry>;
}
