//! Repository 実装
//!
//! - `inmemory`: プロセス内メモリに保持する実装（再起動で消える）

pub mod inmemory;

pub use inmemory::InMemoryHistoryRepository;
