//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::http::{HealthDto, HistoryItemDto, HistoryResponseDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

/// Completed polls, newest first
pub async fn get_history(State(state): State<Arc<AppState>>) -> Json<HistoryResponseDto> {
    let entries = state.get_history_usecase.execute().await;

    // Domain Model から DTO への変換
    let items: Vec<HistoryItemDto> = entries.into_iter().map(HistoryItemDto::from).collect();

    Json(HistoryResponseDto { items })
}
