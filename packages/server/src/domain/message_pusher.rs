//! MessagePusher trait 定義
//!
//! ドメイン層が必要とする「接続へのイベント通知」のインターフェース。
//! 具体的な実装（WebSocket など）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{MessagePushError, SessionEvent, value_object::ConnectionId};

/// 各接続の送信チャンネル（エンコード済みフレームを流す）
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// 接続へのイベント通知の抽象化
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続を登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の登録を解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定の接続にイベントを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &SessionEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続にイベントを送信（一部の送信失敗は許容）
    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        event: &SessionEvent,
    ) -> Result<(), MessagePushError>;
}
