//! UseCase: ルームの参加者管理とチャット
//!
//! ルームは最初の参加時に作られ、削除はされない。表示名は
//! 指定名 → 登録済みの名前 → "User" の順で決まる。

use crate::domain::{ConnectionId, DisplayName, MessageText, RoomJoin, SessionEvent};

use super::coordinator::SessionCoordinator;

impl SessionCoordinator {
    /// `room.join`: ルームに参加する
    ///
    /// 同じ名前での再参加は何も通知せず、本人に参加者一覧だけを返す。
    pub(super) async fn join_room(
        &mut self,
        connection_id: &ConnectionId,
        room: Option<String>,
        name: Option<String>,
        role: Option<String>,
    ) {
        let room = self.resolve_room(room);
        let name = self.resolve_chat_name(connection_id, name);

        let released = match self
            .session
            .rooms
            .join(connection_id, room.clone(), name.clone())
        {
            RoomJoin::Unchanged => {
                let participants = self.session.rooms.participants(&room);
                self.push_to(connection_id, &SessionEvent::RoomParticipants { participants })
                    .await;
                return;
            }
            RoomJoin::Joined { released } => released,
        };

        if let Some(previous) = released {
            tracing::info!("'{}' renamed to '{}' in room '{}'", previous, name, room);
            self.broadcast_room(&room, &SessionEvent::RoomLeft { name: previous }, None)
                .await;
        }

        tracing::info!("'{}' joined room '{}'", name, room);
        self.broadcast_room(
            &room,
            &SessionEvent::RoomJoined { name, role },
            Some(connection_id),
        )
        .await;
        self.broadcast_participants(&room).await;
    }

    /// `room.leave`: ルームから退出する
    pub(super) async fn leave_room(&mut self, connection_id: &ConnectionId, room: Option<String>) {
        let room = self.resolve_room(room);
        let Some(departure) = self.session.rooms.leave(connection_id, &room) else {
            tracing::debug!(
                "Dropped room.leave from '{}': not in room '{}'",
                connection_id,
                room
            );
            return;
        };

        tracing::info!("'{}' left room '{}'", departure.name, room);
        if departure.name_removed {
            self.broadcast_room(
                &room,
                &SessionEvent::RoomLeft {
                    name: departure.name,
                },
                None,
            )
            .await;
        }
        self.broadcast_participants(&room).await;
    }

    /// `room.list`: 参加者一覧を本人にだけ返す
    pub(super) async fn list_room(&mut self, connection_id: &ConnectionId, room: Option<String>) {
        let room = self.resolve_room(room);
        let participants = self.session.rooms.participants(&room);
        self.push_to(connection_id, &SessionEvent::RoomParticipants { participants })
            .await;
    }

    /// `room.message`: 送信者以外のルーム参加者に配信する
    pub(super) async fn send_message(
        &mut self,
        connection_id: &ConnectionId,
        room: Option<String>,
        text: &str,
        name: Option<String>,
        role: Option<String>,
    ) {
        let text = match MessageText::new(text) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("Dropped room.message from '{}': {}", connection_id, e);
                return;
            }
        };
        let room = self.resolve_room(room);
        let name = self.resolve_chat_name(connection_id, name);
        let sent_at = self.now();

        let message = self
            .session
            .rooms
            .compose_message(room.clone(), name, role, text, sent_at);
        tracing::debug!("Message #{} in room '{}'", message.id, room);
        self.broadcast_room(
            &room,
            &SessionEvent::RoomMessage(message),
            Some(connection_id),
        )
        .await;
    }

    /// `room.kick`: 指定した名前の参加者を強制退出させる
    ///
    /// ルームからの退出に加えて名前の登録も解除するため、
    /// 全員回答の判定対象からも外れる。
    pub(super) async fn kick(&mut self, room: Option<String>, name: &str) {
        let name = match DisplayName::new(name) {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!("Dropped room.kick: {}", e);
                return;
            }
        };
        let room = self.resolve_room(room);

        let kicked = self.session.rooms.kick(&room, &name);
        for connection_id in &kicked {
            self.push_to(connection_id, &SessionEvent::IdentityKicked)
                .await;
        }
        self.broadcast_participants(&room).await;

        let released = self.session.identities.remove_name(&name);
        tracing::info!(
            "Kicked '{}' from room '{}' ({} connection(s), identity released: {})",
            name,
            room,
            kicked.len(),
            released.is_some()
        );

        self.end_if_all_answered().await;
    }
}
