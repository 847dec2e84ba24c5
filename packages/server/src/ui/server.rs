//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::usecase::{GetHistoryUseCase, SessionHandle};

use super::{
    handler::{get_history, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Live-poll server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(session_handle, get_history_usecase);
/// server.run("127.0.0.1".to_string(), 4000).await?;
/// ```
pub struct Server {
    /// SessionHandle（コーディネーターへのコマンド送信）
    session: SessionHandle,
    /// GetHistoryUseCase（投票履歴取得のユースケース）
    get_history_usecase: Arc<GetHistoryUseCase>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(session: SessionHandle, get_history_usecase: Arc<GetHistoryUseCase>) -> Self {
        Self {
            session,
            get_history_usecase,
        }
    }

    /// Build the router with all endpoints
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            session: self.session.clone(),
            get_history_usecase: self.get_history_usecase.clone(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/history", get(get_history))
            .with_state(app_state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Run the server until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Live-poll server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}
