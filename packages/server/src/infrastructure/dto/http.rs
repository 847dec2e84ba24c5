//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Response of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
}

/// One completed poll in `GET /api/history`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItemDto {
    pub id: u64,
    pub question: String,
    pub options: Vec<String>,
    pub option_counts: Vec<u32>,
    /// Unix epoch milliseconds
    pub started_at: i64,
    /// Unix epoch milliseconds
    pub ended_at: i64,
    /// Seconds
    pub duration: u64,
    /// `"time"` or `"all-answered"`
    pub reason: String,
}

/// Response of `GET /api/history`, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResponseDto {
    pub items: Vec<HistoryItemDto>,
}
