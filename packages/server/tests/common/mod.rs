//! In-process test server and WebSocket client.

#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use livepoll_server::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::InMemoryHistoryRepository,
        ticker::{TICK_PERIOD, TokioTicker},
    },
    ui::Server,
    usecase::{GetHistoryUseCase, SessionConfig, SessionCoordinator, SessionHandle},
};
use livepoll_shared::time::SystemClock;
use serde_json::{Value, json};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::{Mutex, oneshot},
    time::timeout,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Server wired like the binary, bound to an ephemeral port
pub struct TestServer {
    port: u16,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let history_repository = Arc::new(InMemoryHistoryRepository::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));
        let (session, commands) = SessionHandle::channel();
        let tick_session = session.clone();
        let ticker = Arc::new(TokioTicker::new(TICK_PERIOD, move |generation| {
            tick_session.tick(generation).is_ok()
        }));
        let coordinator = SessionCoordinator::new(
            SessionConfig::default(),
            message_pusher,
            history_repository.clone(),
            ticker,
            Arc::new(SystemClock),
        );
        tokio::spawn(coordinator.run(commands));

        let server = Server::new(
            session,
            Arc::new(GetHistoryUseCase::new(history_repository)),
        );
        let (shutdown, shutdown_rx) = oneshot::channel();
        tokio::spawn(server.serve(listener, async move {
            let _ = shutdown_rx.await;
        }));

        Self {
            port,
            shutdown: Some(shutdown),
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    pub async fn connect(&self) -> TestClient {
        TestClient::connect(&self.ws_url()).await
    }

    pub async fn get_json(&self, path: &str) -> Value {
        reqwest::get(self.http_url(path))
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// WebSocket client speaking `{"event", "data"}` frames
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(url: &str) -> Self {
        let (stream, _response) = connect_async(url).await.unwrap();
        Self { stream }
    }

    pub async fn send(&mut self, event: &str, data: Value) {
        let frame = json!({"event": event, "data": data}).to_string();
        self.stream.send(Message::Text(frame.into())).await.unwrap();
    }

    pub async fn send_raw(&mut self, frame: &str) {
        self.stream
            .send(Message::Text(frame.to_string().into()))
            .await
            .unwrap();
    }

    /// Next text frame as JSON
    pub async fn next_frame(&mut self) -> Value {
        loop {
            let message = timeout(FRAME_TIMEOUT, self.stream.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("stream closed")
                .unwrap();
            if let Message::Text(text) = message {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    /// Skip frames until `event` arrives and return its data
    pub async fn expect_event(&mut self, event: &str) -> Value {
        loop {
            let frame = self.next_frame().await;
            if frame["event"] == event {
                return frame.get("data").cloned().unwrap_or(Value::Null);
            }
        }
    }

    /// Frames received before `event`, which is consumed
    pub async fn frames_until(&mut self, event: &str) -> Vec<Value> {
        let mut skipped = Vec::new();
        loop {
            let frame = self.next_frame().await;
            if frame["event"] == event {
                return skipped;
            }
            skipped.push(frame);
        }
    }

    /// Register an identity and wait for the acknowledgement
    pub async fn join_as(&mut self, name: &str) {
        self.send("identity.join", json!({"name": name})).await;
        let data = self.expect_event("identity.joined").await;
        assert_eq!(data["name"], name);
    }

    /// Join the default room and wait for the participant list
    pub async fn join_room_as(&mut self, name: &str) -> Value {
        self.send("room.join", json!({"name": name})).await;
        self.expect_event("room.participants").await
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
