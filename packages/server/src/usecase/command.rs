//! コーディネーターへ送られるコマンド

use crate::domain::{ConnectionId, PusherChannel};

/// コーディネーターのキューに積まれる 1 件の入力
#[derive(Debug)]
pub enum SessionCommand {
    /// 新しい接続（送信チャンネル付き）
    Connect {
        connection_id: ConnectionId,
        sender: PusherChannel,
    },
    /// 接続が閉じた
    Disconnect { connection_id: ConnectionId },
    /// クライアントからのコマンド
    Client {
        connection_id: ConnectionId,
        command: ClientCommand,
    },
    /// カウントダウンの tick（開始時の世代番号付き）
    Tick { generation: u64 },
}

/// クライアントから受け取るコマンド
///
/// 値はまだ検証されていない。空文字などの不正な値は
/// コーディネーターが黙って破棄する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    JoinIdentity {
        name: String,
    },
    StartPoll {
        question: String,
        duration_secs: Option<u64>,
        options: Vec<String>,
    },
    Vote {
        option_index: Option<i64>,
    },
    PreparePoll,
    JoinRoom {
        room: Option<String>,
        name: Option<String>,
        role: Option<String>,
    },
    LeaveRoom {
        room: Option<String>,
    },
    ListRoom {
        room: Option<String>,
    },
    SendMessage {
        room: Option<String>,
        text: String,
        name: Option<String>,
        role: Option<String>,
    },
    Kick {
        room: Option<String>,
        name: String,
    },
}
