//! UseCase: セッションコーディネーター
//!
//! セッション状態（`Session`）を所有する単一のタスク。WebSocket ハンドラーや
//! カウントダウンからのコマンドは 1 本の mpsc チャンネルに積まれ、
//! 到着順に 1 件ずつ最後まで処理される。そのためロックは不要で、
//! 「全員回答済み」判定も常に一貫したスナップショットを読む。
//!
//! 各コマンドの処理は関心ごとに分かれている:
//! - `identity.rs`: 接続・名前登録・切断
//! - `poll.rs`: 投票のライフサイクル
//! - `chat.rs`: ルームの参加者管理とチャット

use std::sync::Arc;

use livepoll_shared::time::Clock;
use tokio::sync::mpsc;

use crate::domain::{
    ConnectionId, DisplayName, HistoryRepository, MessagePusher, PusherChannel, RoomKey, Session,
    SessionEvent, Ticker, Timestamp,
};

use super::{
    command::{ClientCommand, SessionCommand},
    error::SessionError,
};

/// Duration applied when `poll.start` carries no usable duration
pub const DEFAULT_POLL_DURATION_SECS: u64 = 60;

/// コーディネーターの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub default_duration_secs: u64,
    pub default_room: RoomKey,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_duration_secs: DEFAULT_POLL_DURATION_SECS,
            default_room: RoomKey::default(),
        }
    }
}

/// コーディネーターへコマンドを送るためのハンドル（Clone 可能）
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// ハンドルと、コーディネーターが読む受信側を作成
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionCommand>) {
        let (commands, receiver) = mpsc::unbounded_channel();
        (Self { commands }, receiver)
    }

    pub fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .map_err(|_| SessionError::CoordinatorStopped)
    }

    pub fn connect(
        &self,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> Result<(), SessionError> {
        self.send(SessionCommand::Connect {
            connection_id,
            sender,
        })
    }

    pub fn disconnect(&self, connection_id: ConnectionId) -> Result<(), SessionError> {
        self.send(SessionCommand::Disconnect { connection_id })
    }

    pub fn client(
        &self,
        connection_id: ConnectionId,
        command: ClientCommand,
    ) -> Result<(), SessionError> {
        self.send(SessionCommand::Client {
            connection_id,
            command,
        })
    }

    pub fn tick(&self, generation: u64) -> Result<(), SessionError> {
        self.send(SessionCommand::Tick { generation })
    }
}

/// セッションコーディネーター
pub struct SessionCoordinator {
    pub(super) session: Session,
    pub(super) config: SessionConfig,
    /// MessagePusher（イベント通知の抽象化）
    pub(super) message_pusher: Arc<dyn MessagePusher>,
    /// Repository（投票履歴の保存先）
    pub(super) history_repository: Arc<dyn HistoryRepository>,
    /// カウントダウンのスケジューラー
    pub(super) ticker: Arc<dyn Ticker>,
    pub(super) clock: Arc<dyn Clock>,
}

impl SessionCoordinator {
    /// 新しい SessionCoordinator を作成
    pub fn new(
        config: SessionConfig,
        message_pusher: Arc<dyn MessagePusher>,
        history_repository: Arc<dyn HistoryRepository>,
        ticker: Arc<dyn Ticker>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session: Session::new(),
            config,
            message_pusher,
            history_repository,
            ticker,
            clock,
        }
    }

    /// 現在のセッション状態（読み取り専用）
    #[cfg(test)]
    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    /// チャンネルが閉じるまでコマンドを 1 件ずつ処理する
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<SessionCommand>) {
        tracing::info!("Session coordinator started");
        while let Some(command) = commands.recv().await {
            self.handle(command).await;
        }
        tracing::info!("Session coordinator stopped");
    }

    /// コマンドを 1 件処理する
    pub async fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Connect {
                connection_id,
                sender,
            } => self.connect(connection_id, sender).await,
            SessionCommand::Disconnect { connection_id } => self.disconnect(&connection_id).await,
            SessionCommand::Client {
                connection_id,
                command,
            } => self.dispatch(&connection_id, command).await,
            SessionCommand::Tick { generation } => self.tick(generation).await,
        }
    }

    async fn dispatch(&mut self, connection_id: &ConnectionId, command: ClientCommand) {
        match command {
            ClientCommand::JoinIdentity { name } => self.join_identity(connection_id, &name).await,
            ClientCommand::StartPoll {
                question,
                duration_secs,
                options,
            } => self.start_poll(question, duration_secs, options).await,
            ClientCommand::Vote { option_index } => self.vote(connection_id, option_index).await,
            ClientCommand::PreparePoll => self.prepare_poll().await,
            ClientCommand::JoinRoom { room, name, role } => {
                self.join_room(connection_id, room, name, role).await
            }
            ClientCommand::LeaveRoom { room } => self.leave_room(connection_id, room).await,
            ClientCommand::ListRoom { room } => self.list_room(connection_id, room).await,
            ClientCommand::SendMessage {
                room,
                text,
                name,
                role,
            } => self.send_message(connection_id, room, &text, name, role).await,
            ClientCommand::Kick { room, name } => self.kick(room, &name).await,
        }
    }

    pub(super) fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    /// 省略・空のルーム名はデフォルトルームに読み替える
    pub(super) fn resolve_room(&self, room: Option<String>) -> RoomKey {
        room.and_then(|room| RoomKey::new(room).ok())
            .unwrap_or_else(|| self.config.default_room.clone())
    }

    /// チャット用の表示名: 指定名 → 登録済みの名前 → "User"
    pub(super) fn resolve_chat_name(
        &self,
        connection_id: &ConnectionId,
        requested: Option<String>,
    ) -> DisplayName {
        requested
            .and_then(|name| DisplayName::new(name).ok())
            .or_else(|| self.session.identities.name_of(connection_id).cloned())
            .unwrap_or_else(DisplayName::anonymous)
    }

    pub(super) async fn push_to(&self, connection_id: &ConnectionId, event: &SessionEvent) {
        if let Err(e) = self.message_pusher.push_to(connection_id, event).await {
            tracing::warn!("Failed to push event to '{}': {}", connection_id, e);
        }
    }

    /// 全接続にブロードキャスト
    pub(super) async fn broadcast_all(&self, event: &SessionEvent) {
        let targets = self.session.all_connections();
        if let Err(e) = self.message_pusher.broadcast(&targets, event).await {
            tracing::warn!("Failed to broadcast event: {}", e);
        }
    }

    /// ルームの接続にブロードキャスト（`exclude` を除く）
    pub(super) async fn broadcast_room(
        &self,
        room: &RoomKey,
        event: &SessionEvent,
        exclude: Option<&ConnectionId>,
    ) {
        let targets: Vec<ConnectionId> = self
            .session
            .rooms
            .connections_in(room)
            .into_iter()
            .filter(|connection_id| Some(connection_id) != exclude)
            .collect();
        if let Err(e) = self.message_pusher.broadcast(&targets, event).await {
            tracing::warn!("Failed to broadcast event to room '{}': {}", room, e);
        }
    }

    /// ルームの最新の参加者一覧をルーム全体に送る
    pub(super) async fn broadcast_participants(&self, room: &RoomKey) {
        let event = SessionEvent::RoomParticipants {
            participants: self.session.rooms.participants(room),
        };
        self.broadcast_room(room, &event, None).await;
    }
}
