//! UseCase: 接続・名前登録・切断

use crate::domain::{ConnectionId, DisplayName, JoinError, PusherChannel, SessionEvent};

use super::coordinator::SessionCoordinator;

impl SessionCoordinator {
    /// 新しい接続を登録する
    ///
    /// 投票が実行中でなければ、その接続に待機画面の表示を指示する。
    pub(super) async fn connect(&mut self, connection_id: ConnectionId, sender: PusherChannel) {
        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;
        self.session.connections.insert(connection_id.clone());
        tracing::info!(
            "Connection '{}' opened ({} open)",
            connection_id,
            self.session.connections.len()
        );

        if !self.session.poll.is_running() {
            self.push_to(&connection_id, &SessionEvent::PollWaiting).await;
        }
    }

    /// `identity.join`: 表示名を登録する
    ///
    /// 受理されたら、実行中の投票のスナップショット（残り秒数と現在の集計）
    /// または待機通知を本人に送る。
    pub(super) async fn join_identity(&mut self, connection_id: &ConnectionId, requested: &str) {
        let name = match DisplayName::new(requested) {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!("Dropped identity.join from '{}': {}", connection_id, e);
                return;
            }
        };

        let name = match self.session.identities.join(connection_id, name) {
            Ok(name) => name,
            Err(JoinError::NameTaken(name)) => {
                tracing::info!(
                    "Rejected identity '{}' for '{}': name taken",
                    name,
                    connection_id
                );
                self.push_to(connection_id, &SessionEvent::NameTaken).await;
                return;
            }
        };

        tracing::info!(
            "Identity '{}' joined on '{}' ({} active)",
            name,
            connection_id,
            self.session.identities.count_active()
        );
        self.push_to(connection_id, &SessionEvent::IdentityJoined { name })
            .await;

        let now = self.now();
        match self.session.poll.running_snapshot(now) {
            Some(snapshot) => {
                self.push_to(
                    connection_id,
                    &SessionEvent::PollStarted {
                        question: snapshot.question,
                        duration_secs: snapshot.remaining_secs,
                        options: snapshot.options,
                    },
                )
                .await;
                self.push_to(
                    connection_id,
                    &SessionEvent::PollUpdate {
                        option_counts: snapshot.option_counts,
                    },
                )
                .await;
            }
            None => {
                self.push_to(connection_id, &SessionEvent::PollWaiting).await;
            }
        }
    }

    /// 接続が閉じたときの後始末
    ///
    /// 名前の解放、全ルームからの退出と通知を行い、残った参加者が
    /// 全員回答済みなら投票を終了する。
    pub(super) async fn disconnect(&mut self, connection_id: &ConnectionId) {
        self.message_pusher.unregister_client(connection_id).await;
        self.session.connections.remove(connection_id);

        if let Some(name) = self.session.identities.leave(connection_id) {
            tracing::info!("Identity '{}' left", name);
        }

        for departure in self.session.rooms.disconnect(connection_id) {
            if departure.name_removed {
                self.broadcast_room(
                    &departure.room,
                    &SessionEvent::RoomLeft {
                        name: departure.name,
                    },
                    None,
                )
                .await;
            }
            self.broadcast_participants(&departure.room).await;
        }

        tracing::info!(
            "Connection '{}' closed ({} open)",
            connection_id,
            self.session.connections.len()
        );

        self.end_if_all_answered().await;
    }
}
