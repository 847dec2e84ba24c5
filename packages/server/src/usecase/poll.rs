//! UseCase: 投票のライフサイクル
//!
//! 開始 → 毎秒のカウントダウン → 時間切れ or 全員回答で終了、の流れを扱う。
//! 終了した投票は履歴に保存してから最終集計をブロードキャストする。

use crate::domain::{ConnectionId, EndReason, HistoryEntry, PollDraft, SessionEvent};

use super::coordinator::SessionCoordinator;

impl SessionCoordinator {
    /// `poll.start`: 新しい投票を開始する
    ///
    /// 時間が省略または 0 の場合は設定のデフォルト時間を使う。
    pub(super) async fn start_poll(
        &mut self,
        question: String,
        duration_secs: Option<u64>,
        options: Vec<String>,
    ) {
        let draft = PollDraft {
            question,
            options,
            duration_secs: duration_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(self.config.default_duration_secs),
        };

        let now = self.now();
        let started = match self.session.poll.start(draft, now, self.ticker.as_ref()) {
            Ok(started) => started,
            Err(e) => {
                tracing::debug!("Dropped poll.start: {}", e);
                return;
            }
        };

        tracing::info!(
            "Poll started: '{}' ({} options, {}s)",
            started.question,
            started.options.len(),
            started.remaining_secs
        );
        self.broadcast_all(&SessionEvent::PollStarted {
            question: started.question,
            duration_secs: started.remaining_secs,
            options: started.options,
        })
        .await;
    }

    /// カウントダウンの 1 tick
    ///
    /// 古い世代の tick は無視する。残り 0 秒で時間切れとして終了する。
    pub(super) async fn tick(&mut self, generation: u64) {
        let now = self.now();
        let Some(report) = self.session.poll.tick(generation, now) else {
            tracing::trace!("Ignored stale tick (generation {})", generation);
            return;
        };

        self.broadcast_all(&SessionEvent::PollTick {
            remaining_secs: report.remaining_secs,
        })
        .await;

        if let Some(entry) = report.ended {
            self.archive(entry).await;
        }
    }

    /// `poll.vote`: 1 名前につき 1 票
    pub(super) async fn vote(
        &mut self,
        connection_id: &ConnectionId,
        option_index: Option<i64>,
    ) {
        let Some(option_index) = option_index else {
            tracing::debug!("Dropped poll.vote from '{}': no option", connection_id);
            return;
        };

        let voter = self.session.identities.name_of(connection_id).cloned();
        let option_counts = match self.session.poll.vote(voter.as_ref(), option_index) {
            Ok(option_counts) => option_counts,
            Err(e) => {
                tracing::debug!("Dropped poll.vote from '{}': {}", connection_id, e);
                return;
            }
        };

        tracing::debug!(
            "Vote accepted from '{}' ({}/{} voted)",
            connection_id,
            self.session.poll.voter_count(),
            self.session.identities.count_active()
        );
        self.broadcast_all(&SessionEvent::PollUpdate { option_counts })
            .await;

        self.end_if_all_answered().await;
    }

    /// `poll.prepare`: 実行中でなければ全員に待機を指示する
    pub(super) async fn prepare_poll(&mut self) {
        if !self.session.poll.prepare() {
            tracing::debug!("Dropped poll.prepare: poll is running");
            return;
        }
        self.broadcast_all(&SessionEvent::PollWaiting).await;
    }

    /// 登録済みの全員が回答していれば投票を終了する
    pub(super) async fn end_if_all_answered(&mut self) {
        let active = self.session.identities.count_active();
        if self.session.poll.all_answered(active) {
            self.end_poll(EndReason::AllAnswered).await;
        }
    }

    pub(super) async fn end_poll(&mut self, reason: EndReason) {
        let now = self.now();
        if let Some(entry) = self.session.poll.end(reason, now) {
            self.archive(entry).await;
        }
    }

    /// 終了した投票を履歴に保存し、最終集計をブロードキャストする
    async fn archive(&mut self, entry: HistoryEntry) {
        tracing::info!(
            "Poll #{} ended ({}): '{}' {:?}",
            entry.id,
            entry.reason.as_str(),
            entry.question,
            entry.option_counts
        );

        let option_counts = entry.option_counts.clone();
        if let Err(e) = self.history_repository.append(entry).await {
            tracing::warn!("Failed to archive poll: {}", e);
        }

        self.broadcast_all(&SessionEvent::PollEnded { option_counts })
            .await;
    }
}
