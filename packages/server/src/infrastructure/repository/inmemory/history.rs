//! InMemory History Repository 実装
//!
//! ドメイン層が定義する HistoryRepository trait の具体的な実装。
//! `Vec` を追記専用のログとして使用します。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{HistoryEntry, HistoryRepository, RepositoryError};

/// インメモリ History Repository 実装
#[derive(Default)]
pub struct InMemoryHistoryRepository {
    /// 記録順（古い順）のエントリ
    entries: Mutex<Vec<HistoryEntry>>,
}

impl InMemoryHistoryRepository {
    /// 空の InMemoryHistoryRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn append(&self, entry: HistoryEntry) -> Result<(), RepositoryError> {
        let mut entries = self.entries.lock().await;
        if entries.iter().any(|existing| existing.id == entry.id) {
            return Err(RepositoryError::DuplicateEntry(entry.id));
        }
        tracing::debug!("Archived poll #{} ({} total)", entry.id, entries.len() + 1);
        entries.push(entry);
        Ok(())
    }

    async fn list_newest_first(&self) -> Vec<HistoryEntry> {
        let entries = self.entries.lock().await;
        entries.iter().rev().cloned().collect()
    }
}
