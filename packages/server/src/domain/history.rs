//! Archived polls.

use super::value_object::Timestamp;

/// Why a poll stopped running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The countdown reached zero.
    Time,
    /// Every active identity has voted.
    AllAnswered,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::Time => "time",
            EndReason::AllAnswered => "all-answered",
        }
    }
}

/// Immutable snapshot of one completed poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: u64,
    pub question: String,
    pub options: Vec<String>,
    pub option_counts: Vec<u32>,
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
    pub duration_secs: u64,
    pub reason: EndReason,
}
