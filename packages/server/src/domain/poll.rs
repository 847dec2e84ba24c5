//! Poll engine: the single global poll and its state machine.
//!
//! ```text
//! Idle --start--> Running --end(time | all-answered)--> Ended --prepare--> Idle
//!                                                          \--start--> Running
//! ```
//!
//! Ending a poll archives it and immediately clears the question, options
//! and vote ledger, so `Ended` behaves like `Idle` for every command except
//! that clients still show the final results.

use std::collections::HashMap;

use thiserror::Error;

use super::{
    history::{EndReason, HistoryEntry},
    ticker::{TickHandle, Ticker},
    value_object::{DisplayName, Timestamp},
};

/// Minimum number of non-blank options a poll must offer
pub const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollStatus {
    #[default]
    Idle,
    Running,
    Ended,
}

/// Presenter input for a new poll, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDraft {
    pub question: String,
    pub options: Vec<String>,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StartPollError {
    #[error("a poll is already running")]
    AlreadyRunning,

    #[error("question must not be blank")]
    EmptyQuestion,

    #[error("a poll needs at least {min} options, got {0}", min = MIN_OPTIONS)]
    NotEnoughOptions(usize),

    #[error("poll duration must be positive")]
    InvalidDuration,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VoteRejection {
    #[error("no poll is running")]
    NotRunning,

    #[error("option index {0} is out of range")]
    OptionOutOfRange(i64),

    #[error("connection has no identity")]
    NoIdentity,

    #[error("'{0}' has already voted")]
    AlreadyVoted(String),
}

/// View of the running poll, as sent to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningPoll {
    pub question: String,
    pub options: Vec<String>,
    pub remaining_secs: u64,
    pub option_counts: Vec<u32>,
}

/// Result of a countdown tick that belonged to the running poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub remaining_secs: u64,
    /// Set when this tick exhausted the countdown and ended the poll.
    pub ended: Option<HistoryEntry>,
}

#[derive(Debug, Default)]
pub struct PollEngine {
    status: PollStatus,
    question: String,
    options: Vec<String>,
    duration_secs: u64,
    ends_at: Timestamp,
    option_counts: Vec<u32>,
    votes_by_identity: HashMap<DisplayName, usize>,
    /// Bumped on every start; ticks armed for an older generation are stale.
    generation: u64,
    archived: u64,
    timer: Option<Box<dyn TickHandle>>,
}

impl PollEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new poll and arm its countdown.
    pub fn start(
        &mut self,
        draft: PollDraft,
        now: Timestamp,
        ticker: &dyn Ticker,
    ) -> Result<RunningPoll, StartPollError> {
        if self.is_running() {
            return Err(StartPollError::AlreadyRunning);
        }

        let question = draft.question.trim();
        if question.is_empty() {
            return Err(StartPollError::EmptyQuestion);
        }

        let options: Vec<String> = draft
            .options
            .iter()
            .map(|option| option.trim())
            .filter(|option| !option.is_empty())
            .map(str::to_string)
            .collect();
        if options.len() < MIN_OPTIONS {
            return Err(StartPollError::NotEnoughOptions(options.len()));
        }

        if draft.duration_secs == 0 {
            return Err(StartPollError::InvalidDuration);
        }

        self.cancel_timer();
        self.generation += 1;
        self.status = PollStatus::Running;
        self.question = question.to_string();
        self.option_counts = vec![0; options.len()];
        self.options = options;
        self.duration_secs = draft.duration_secs;
        self.ends_at = Timestamp::new(
            now.value()
                .saturating_add(secs_to_millis(draft.duration_secs)),
        );
        self.votes_by_identity.clear();
        self.timer = Some(ticker.arm(self.generation));

        Ok(RunningPoll {
            question: self.question.clone(),
            options: self.options.clone(),
            remaining_secs: self.duration_secs,
            option_counts: self.option_counts.clone(),
        })
    }

    /// Handle one countdown tick.
    ///
    /// Returns `None` for ticks that do not belong to the running poll.
    pub fn tick(&mut self, generation: u64, now: Timestamp) -> Option<TickReport> {
        if !self.is_running() || generation != self.generation {
            return None;
        }

        let remaining_secs = self.remaining_secs(now);
        let ended = if remaining_secs == 0 {
            self.end(EndReason::Time, now)
        } else {
            None
        };

        Some(TickReport {
            remaining_secs,
            ended,
        })
    }

    /// Record a vote. The first vote of an identity wins.
    ///
    /// Returns the updated option counts.
    pub fn vote(
        &mut self,
        voter: Option<&DisplayName>,
        option_index: i64,
    ) -> Result<Vec<u32>, VoteRejection> {
        if !self.is_running() {
            return Err(VoteRejection::NotRunning);
        }

        let index = usize::try_from(option_index)
            .ok()
            .filter(|index| *index < self.options.len())
            .ok_or(VoteRejection::OptionOutOfRange(option_index))?;

        let voter = voter.ok_or(VoteRejection::NoIdentity)?;
        if self.votes_by_identity.contains_key(voter) {
            return Err(VoteRejection::AlreadyVoted(voter.as_str().to_string()));
        }

        self.votes_by_identity.insert(voter.clone(), index);
        self.option_counts[index] += 1;
        Ok(self.option_counts.clone())
    }

    /// Whether the running poll should end early because everyone voted.
    ///
    /// `active_identities` is read at decision time, so identities that join
    /// mid-poll raise the bar and identities that leave lower it. At least
    /// one vote is required.
    pub fn all_answered(&self, active_identities: usize) -> bool {
        self.is_running()
            && !self.votes_by_identity.is_empty()
            && self.votes_by_identity.len() >= active_identities
    }

    /// Stop the running poll and archive it.
    ///
    /// Returns `None` (and does nothing) when no poll is running.
    pub fn end(&mut self, reason: EndReason, now: Timestamp) -> Option<HistoryEntry> {
        if !self.is_running() {
            return None;
        }

        self.cancel_timer();
        self.archived += 1;
        let duration_millis = secs_to_millis(self.duration_secs);
        let entry = HistoryEntry {
            id: self.archived,
            question: std::mem::take(&mut self.question),
            options: std::mem::take(&mut self.options),
            option_counts: std::mem::take(&mut self.option_counts),
            started_at: Timestamp::new(self.ends_at.value().saturating_sub(duration_millis)),
            ended_at: now,
            duration_secs: self.duration_secs,
            reason,
        };

        self.status = PollStatus::Ended;
        self.duration_secs = 0;
        self.ends_at = Timestamp::default();
        self.votes_by_identity.clear();

        Some(entry)
    }

    /// Presenter is composing the next question.
    ///
    /// Returns `true` when clients should be told to wait, i.e. nothing is
    /// running.
    pub fn prepare(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.status = PollStatus::Idle;
        true
    }

    /// Seconds left on the countdown, rounded up and floored at zero.
    pub fn remaining_secs(&self, now: Timestamp) -> u64 {
        if !self.is_running() {
            return 0;
        }
        let millis = self.ends_at.value().saturating_sub(now.value());
        if millis <= 0 {
            0
        } else {
            (millis as u64).div_ceil(1000)
        }
    }

    /// Snapshot for a participant arriving while the poll runs.
    pub fn running_snapshot(&self, now: Timestamp) -> Option<RunningPoll> {
        if !self.is_running() {
            return None;
        }
        Some(RunningPoll {
            question: self.question.clone(),
            options: self.options.clone(),
            remaining_secs: self.remaining_secs(now),
            option_counts: self.option_counts.clone(),
        })
    }

    pub fn status(&self) -> PollStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == PollStatus::Running
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn option_counts(&self) -> &[u32] {
        &self.option_counts
    }

    pub fn ends_at(&self) -> Timestamp {
        self.ends_at
    }

    pub fn voter_count(&self) -> usize {
        self.votes_by_identity.len()
    }

    #[cfg(test)]
    pub(crate) fn has_voted(&self, name: &DisplayName) -> bool {
        self.votes_by_identity.contains_key(name)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn cancel_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
    }
}

fn secs_to_millis(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX).saturating_mul(1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ticker::MockTicker;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug)]
    struct CountingHandle {
        cancels: Arc<AtomicUsize>,
    }

    impl TickHandle for CountingHandle {
        fn cancel(&mut self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Ticker mock that expects `arms` armings and counts cancellations.
    fn counting_ticker(arms: usize) -> (MockTicker, Arc<AtomicUsize>) {
        let cancels = Arc::new(AtomicUsize::new(0));
        let handle_cancels = cancels.clone();
        let mut ticker = MockTicker::new();
        ticker.expect_arm().times(arms).returning(move |_| -> Box<dyn TickHandle> {
            Box::new(CountingHandle {
                cancels: handle_cancels.clone(),
            })
        });
        (ticker, cancels)
    }

    fn draft(question: &str, options: &[&str], duration_secs: u64) -> PollDraft {
        PollDraft {
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            duration_secs,
        }
    }

    fn name(value: &str) -> DisplayName {
        DisplayName::new(value).unwrap()
    }

    #[test]
    fn test_start_sets_running_state_and_arms_timer() {
        // テスト項目: 投票開始で Running になり、カウントダウンが 1 回だけ登録される
        // given (前提条件):
        let (ticker, cancels) = counting_ticker(1);
        let mut engine = PollEngine::new();

        // when (操作):
        let started = engine
            .start(draft(" Color? ", &["Red", " ", "Blue "], 15), Timestamp::new(1_000), &ticker)
            .unwrap();

        // then (期待する結果):
        assert_eq!(engine.status(), PollStatus::Running);
        assert_eq!(started.question, "Color?");
        assert_eq!(started.options, vec!["Red".to_string(), "Blue".to_string()]);
        assert_eq!(started.remaining_secs, 15);
        assert_eq!(engine.option_counts(), &[0, 0]);
        assert_eq!(engine.ends_at(), Timestamp::new(16_000));
        assert_eq!(cancels.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_start_rejects_invalid_drafts() {
        // テスト項目: 空の質問・選択肢不足・0 秒の投票は開始されない
        // given (前提条件):
        let (ticker, _cancels) = counting_ticker(0);
        let mut engine = PollEngine::new();

        // when (操作):
        let blank = engine.start(draft("  ", &["a", "b"], 10), Timestamp::new(0), &ticker);
        let single = engine.start(draft("Q", &["a", " "], 10), Timestamp::new(0), &ticker);
        let zero = engine.start(draft("Q", &["a", "b"], 0), Timestamp::new(0), &ticker);

        // then (期待する結果):
        assert_eq!(blank, Err(StartPollError::EmptyQuestion));
        assert_eq!(single, Err(StartPollError::NotEnoughOptions(1)));
        assert_eq!(zero, Err(StartPollError::InvalidDuration));
        assert_eq!(engine.status(), PollStatus::Idle);
    }

    #[test]
    fn test_start_while_running_changes_nothing() {
        // テスト項目: 実行中の開始要求は質問・選択肢・終了時刻を変えない
        // given (前提条件):
        let (ticker, _cancels) = counting_ticker(1);
        let mut engine = PollEngine::new();
        engine
            .start(draft("First?", &["a", "b"], 30), Timestamp::new(0), &ticker)
            .unwrap();

        // when (操作):
        let result = engine.start(
            draft("Second?", &["x", "y", "z"], 5),
            Timestamp::new(500),
            &ticker,
        );

        // then (期待する結果):
        assert_eq!(result, Err(StartPollError::AlreadyRunning));
        assert_eq!(engine.question(), "First?");
        assert_eq!(engine.options(), &["a".to_string(), "b".to_string()]);
        assert_eq!(engine.ends_at(), Timestamp::new(30_000));
    }

    #[test]
    fn test_first_vote_wins() {
        // テスト項目: 同じ名前の 2 回目の投票は無視され、集計は変わらない
        // given (前提条件):
        let (ticker, _cancels) = counting_ticker(1);
        let mut engine = PollEngine::new();
        engine
            .start(draft("Q", &["a", "b"], 30), Timestamp::new(0), &ticker)
            .unwrap();
        let alice = name("alice");

        // when (操作):
        let first = engine.vote(Some(&alice), 0);
        let second = engine.vote(Some(&alice), 1);

        // then (期待する結果):
        assert_eq!(first, Ok(vec![1, 0]));
        assert_eq!(second, Err(VoteRejection::AlreadyVoted("alice".to_string())));
        assert_eq!(engine.option_counts(), &[1, 0]);
        assert_eq!(engine.voter_count(), 1);
    }

    #[test]
    fn test_vote_rejections() {
        // テスト項目: 実行前・範囲外・匿名の投票はすべて拒否される
        // given (前提条件):
        let (ticker, _cancels) = counting_ticker(1);
        let mut engine = PollEngine::new();
        let alice = name("alice");
        let before_start = engine.vote(Some(&alice), 0);
        engine
            .start(draft("Q", &["a", "b"], 30), Timestamp::new(0), &ticker)
            .unwrap();

        // when (操作):
        let negative = engine.vote(Some(&alice), -1);
        let too_large = engine.vote(Some(&alice), 2);
        let anonymous = engine.vote(None, 0);

        // then (期待する結果):
        assert_eq!(before_start, Err(VoteRejection::NotRunning));
        assert_eq!(negative, Err(VoteRejection::OptionOutOfRange(-1)));
        assert_eq!(too_large, Err(VoteRejection::OptionOutOfRange(2)));
        assert_eq!(anonymous, Err(VoteRejection::NoIdentity));
        assert_eq!(engine.option_counts(), &[0, 0]);
    }

    #[test]
    fn test_counts_sum_equals_distinct_voters() {
        // テスト項目: 集計の合計は投票に成功した人数と常に一致する
        // given (前提条件):
        let (ticker, _cancels) = counting_ticker(1);
        let mut engine = PollEngine::new();
        engine
            .start(draft("Q", &["a", "b", "c"], 30), Timestamp::new(0), &ticker)
            .unwrap();
        let votes = [("a", 0), ("b", 2), ("a", 1), ("c", 2), ("b", 0), ("d", 7)];

        // when (操作):
        for (voter, index) in votes {
            let _ = engine.vote(Some(&name(voter)), index);
        }

        // then (期待する結果):
        let total: u32 = engine.option_counts().iter().sum();
        assert_eq!(total as usize, engine.voter_count());
        assert_eq!(engine.option_counts(), &[1, 0, 2]);
    }

    #[test]
    fn test_all_answered_uses_live_identity_count() {
        // テスト項目: 全員回答の判定は判定時点のアクティブ人数で行われる
        // given (前提条件):
        let (ticker, _cancels) = counting_ticker(1);
        let mut engine = PollEngine::new();
        engine
            .start(draft("Q", &["a", "b"], 30), Timestamp::new(0), &ticker)
            .unwrap();
        engine.vote(Some(&name("a")), 0).unwrap();

        // when (操作):
        let with_three_active = engine.all_answered(3);
        let with_one_active = engine.all_answered(1);

        // then (期待する結果):
        assert!(!with_three_active);
        assert!(with_one_active);
    }

    #[test]
    fn test_all_answered_is_false_without_votes_even_when_nobody_is_active() {
        // テスト項目: 投票が 0 件なら、アクティブ人数が 0 人でも全員回答とはみなさない
        // given (前提条件):
        let (ticker, _cancels) = counting_ticker(1);
        let mut engine = PollEngine::new();
        engine
            .start(draft("Q", &["a", "b"], 30), Timestamp::new(0), &ticker)
            .unwrap();

        // when (操作):
        let nobody_active = engine.all_answered(0);
        let one_active = engine.all_answered(1);

        // then (期待する結果):
        assert!(!nobody_active);
        assert!(!one_active);
        assert!(engine.is_running());
    }

    #[test]
    fn test_end_archives_and_resets() {
        // テスト項目: 終了すると履歴エントリが作られ、質問などがリセットされる
        // given (前提条件):
        let (ticker, cancels) = counting_ticker(1);
        let mut engine = PollEngine::new();
        engine
            .start(draft("Color?", &["Red", "Blue"], 15), Timestamp::new(10_000), &ticker)
            .unwrap();
        engine.vote(Some(&name("A")), 0).unwrap();
        engine.vote(Some(&name("B")), 1).unwrap();

        // when (操作):
        let entry = engine
            .end(EndReason::AllAnswered, Timestamp::new(12_000))
            .unwrap();

        // then (期待する結果):
        assert_eq!(entry.id, 1);
        assert_eq!(entry.question, "Color?");
        assert_eq!(entry.options, vec!["Red".to_string(), "Blue".to_string()]);
        assert_eq!(entry.option_counts, vec![1, 1]);
        assert_eq!(entry.started_at, Timestamp::new(10_000));
        assert_eq!(entry.ended_at, Timestamp::new(12_000));
        assert_eq!(entry.duration_secs, 15);
        assert_eq!(entry.reason, EndReason::AllAnswered);

        assert_eq!(engine.status(), PollStatus::Ended);
        assert_eq!(engine.question(), "");
        assert!(engine.options().is_empty());
        assert_eq!(engine.voter_count(), 0);
        assert_eq!(cancels.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_end_is_idempotent() {
        // テスト項目: 終了済みの投票を再度終了しても何も起きない
        // given (前提条件):
        let (ticker, cancels) = counting_ticker(1);
        let mut engine = PollEngine::new();
        engine
            .start(draft("Q", &["a", "b"], 15), Timestamp::new(0), &ticker)
            .unwrap();
        engine.end(EndReason::Time, Timestamp::new(15_000)).unwrap();

        // when (操作):
        let again = engine.end(EndReason::Time, Timestamp::new(16_000));

        // then (期待する結果):
        assert_eq!(again, None);
        assert_eq!(cancels.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_tick_counts_down_and_ends_on_zero() {
        // テスト項目: tick は残り秒数を切り上げで返し、0 になると時間切れで終了する
        // given (前提条件):
        let (ticker, cancels) = counting_ticker(1);
        let mut engine = PollEngine::new();
        engine
            .start(draft("Q", &["a", "b"], 3), Timestamp::new(0), &ticker)
            .unwrap();
        let generation = engine.generation();

        // when (操作):
        let after_one = engine.tick(generation, Timestamp::new(1_000)).unwrap();
        let mid_second = engine.tick(generation, Timestamp::new(1_500)).unwrap();
        let expired = engine.tick(generation, Timestamp::new(3_200)).unwrap();

        // then (期待する結果):
        assert_eq!(after_one.remaining_secs, 2);
        assert_eq!(after_one.ended, None);
        assert_eq!(mid_second.remaining_secs, 2);
        assert_eq!(expired.remaining_secs, 0);
        assert_eq!(expired.ended.map(|entry| entry.reason), Some(EndReason::Time));
        assert_eq!(engine.status(), PollStatus::Ended);
        assert_eq!(cancels.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        // テスト項目: 前の投票の tick は新しい投票に影響しない
        // given (前提条件):
        let (ticker, _cancels) = counting_ticker(2);
        let mut engine = PollEngine::new();
        engine
            .start(draft("Old", &["a", "b"], 1), Timestamp::new(0), &ticker)
            .unwrap();
        let stale_generation = engine.generation();
        engine.end(EndReason::Time, Timestamp::new(1_000));
        engine
            .start(draft("New", &["a", "b"], 30), Timestamp::new(2_000), &ticker)
            .unwrap();

        // when (操作):
        let report = engine.tick(stale_generation, Timestamp::new(40_000));

        // then (期待する結果):
        assert_eq!(report, None);
        assert!(engine.is_running());
        assert_eq!(engine.question(), "New");
    }

    #[test]
    fn test_tick_after_end_is_ignored() {
        // テスト項目: 終了後に届いた tick は無視される
        // given (前提条件):
        let (ticker, _cancels) = counting_ticker(1);
        let mut engine = PollEngine::new();
        engine
            .start(draft("Q", &["a", "b"], 10), Timestamp::new(0), &ticker)
            .unwrap();
        let generation = engine.generation();
        engine.end(EndReason::AllAnswered, Timestamp::new(1_000));

        // when (操作):
        let report = engine.tick(generation, Timestamp::new(2_000));

        // then (期待する結果):
        assert_eq!(report, None);
    }

    #[test]
    fn test_prepare_only_when_not_running() {
        // テスト項目: prepare は実行中でなければ待機通知を要求し、Idle に戻す
        // given (前提条件):
        let (ticker, _cancels) = counting_ticker(1);
        let mut engine = PollEngine::new();
        engine
            .start(draft("Q", &["a", "b"], 10), Timestamp::new(0), &ticker)
            .unwrap();

        // when (操作):
        let while_running = engine.prepare();
        engine.end(EndReason::Time, Timestamp::new(10_000));
        let after_end = engine.prepare();

        // then (期待する結果):
        assert!(!while_running);
        assert!(after_end);
        assert_eq!(engine.status(), PollStatus::Idle);
    }

    #[test]
    fn test_running_snapshot_reports_remaining_time() {
        // テスト項目: 途中参加者向けスナップショットは残り秒数と現在の集計を含む
        // given (前提条件):
        let (ticker, _cancels) = counting_ticker(1);
        let mut engine = PollEngine::new();
        engine
            .start(draft("Q", &["a", "b"], 20), Timestamp::new(0), &ticker)
            .unwrap();
        engine.vote(Some(&name("alice")), 1).unwrap();

        // when (操作):
        let snapshot = engine.running_snapshot(Timestamp::new(5_001)).unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.remaining_secs, 15);
        assert_eq!(snapshot.option_counts, vec![0, 1]);
        assert_eq!(snapshot.question, "Q");
    }

    #[test]
    fn test_vote_ledger_is_keyed_by_name() {
        // テスト項目: 投票記録は名前単位なので、同名で再参加した人は再投票できない
        // given (前提条件):
        let (ticker, _cancels) = counting_ticker(1);
        let mut engine = PollEngine::new();
        engine
            .start(draft("Q", &["a", "b"], 20), Timestamp::new(0), &ticker)
            .unwrap();
        engine.vote(Some(&name("bob")), 0).unwrap();

        // when (操作):
        let same_name_again = engine.vote(Some(&name("bob")), 1);

        // then (期待する結果):
        assert!(engine.has_voted(&name("bob")));
        assert_eq!(same_name_again, Err(VoteRejection::AlreadyVoted("bob".to_string())));
    }
}
