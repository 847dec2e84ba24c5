//! InMemory Repository 実装

mod history;

pub use history::InMemoryHistoryRepository;
