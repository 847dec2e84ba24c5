//! コーディネーターのテスト用ハーネス
//!
//! 実際の `WebSocketMessagePusher` と `InMemoryHistoryRepository` を使い、
//! 各接続に届いたフレームを JSON として取り出せるようにする。
//! 時計は手動で進め、tick はテストから明示的に送る。

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use livepoll_shared::time::FixedClock;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{ConnectionId, HistoryEntry, HistoryRepository, TickHandle, ticker::MockTicker},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryHistoryRepository,
    },
};

use super::{ClientCommand, SessionCommand, SessionConfig, SessionCoordinator};

const START_MILLIS: i64 = 1_700_000_000_000;

#[derive(Debug)]
struct CountingHandle {
    cancelled: Arc<AtomicUsize>,
}

impl TickHandle for CountingHandle {
    fn cancel(&mut self) {
        self.cancelled.fetch_add(1, Ordering::SeqCst);
    }
}

pub(super) struct Harness {
    pub coordinator: SessionCoordinator,
    clock: Arc<FixedClock>,
    history: Arc<InMemoryHistoryRepository>,
    armed: Arc<AtomicUsize>,
    cancelled: Arc<AtomicUsize>,
    receivers: HashMap<String, mpsc::UnboundedReceiver<String>>,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(FixedClock::new(START_MILLIS));
        let history = Arc::new(InMemoryHistoryRepository::new());
        let armed = Arc::new(AtomicUsize::new(0));
        let cancelled = Arc::new(AtomicUsize::new(0));

        let mut ticker = MockTicker::new();
        {
            let armed = armed.clone();
            let cancelled = cancelled.clone();
            ticker
                .expect_arm()
                .returning(move |_| -> Box<dyn TickHandle> {
                    armed.fetch_add(1, Ordering::SeqCst);
                    Box::new(CountingHandle {
                        cancelled: cancelled.clone(),
                    })
                });
        }

        let pusher = WebSocketMessagePusher::new(Arc::new(Mutex::new(HashMap::new())));
        let coordinator = SessionCoordinator::new(
            SessionConfig::default(),
            Arc::new(pusher),
            history.clone(),
            Arc::new(ticker),
            clock.clone(),
        );

        Self {
            coordinator,
            clock,
            history,
            armed,
            cancelled,
            receivers: HashMap::new(),
        }
    }

    pub fn id(&self, id: &str) -> ConnectionId {
        ConnectionId::new(id)
    }

    pub async fn connect(&mut self, id: &str) {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.receivers.insert(id.to_string(), receiver);
        self.coordinator
            .handle(SessionCommand::Connect {
                connection_id: self.id(id),
                sender,
            })
            .await;
    }

    pub async fn disconnect(&mut self, id: &str) {
        self.coordinator
            .handle(SessionCommand::Disconnect {
                connection_id: self.id(id),
            })
            .await;
    }

    pub async fn send(&mut self, id: &str, command: ClientCommand) {
        self.coordinator
            .handle(SessionCommand::Client {
                connection_id: self.id(id),
                command,
            })
            .await;
    }

    /// 現在の投票の世代で tick を送る
    pub async fn tick(&mut self) {
        let generation = self.coordinator.session().poll.generation();
        self.tick_generation(generation).await;
    }

    pub async fn tick_generation(&mut self, generation: u64) {
        self.coordinator
            .handle(SessionCommand::Tick { generation })
            .await;
    }

    pub fn advance_secs(&self, secs: i64) {
        self.clock.advance(secs * 1_000);
    }

    /// 接続に届いたフレームをすべて取り出す
    pub fn drain(&mut self, id: &str) -> Vec<Value> {
        let mut frames = Vec::new();
        if let Some(receiver) = self.receivers.get_mut(id) {
            while let Ok(frame) = receiver.try_recv() {
                frames.push(serde_json::from_str(&frame).unwrap());
            }
        }
        frames
    }

    pub fn drain_all(&mut self) {
        for receiver in self.receivers.values_mut() {
            while receiver.try_recv().is_ok() {}
        }
    }

    pub fn event_names(&mut self, id: &str) -> Vec<String> {
        self.drain(id)
            .into_iter()
            .map(|frame| frame["event"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.history.list_newest_first().await
    }

    pub fn armed(&self) -> usize {
        self.armed.load(Ordering::SeqCst)
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub(super) fn join_identity(name: &str) -> ClientCommand {
    ClientCommand::JoinIdentity {
        name: name.to_string(),
    }
}

pub(super) fn join_room(name: &str) -> ClientCommand {
    ClientCommand::JoinRoom {
        room: None,
        name: Some(name.to_string()),
        role: None,
    }
}

pub(super) fn start_poll(
    question: &str,
    duration_secs: Option<u64>,
    options: &[&str],
) -> ClientCommand {
    ClientCommand::StartPoll {
        question: question.to_string(),
        duration_secs,
        options: options.iter().map(|option| option.to_string()).collect(),
    }
}

pub(super) fn vote(option_index: i64) -> ClientCommand {
    ClientCommand::Vote {
        option_index: Some(option_index),
    }
}
