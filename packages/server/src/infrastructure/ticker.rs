//! tokio を使った Ticker 実装
//!
//! 投票ごとに周期タスクを 1 本起動し、tick のたびに世代番号付きで
//! コールバックを呼ぶ。コールバックが `false` を返す（コーディネーターが
//! 止まっている）とタスクは終了する。

use std::{fmt, sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

use crate::domain::{TickHandle, Ticker};

/// Production countdown period
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

type OnTick = Arc<dyn Fn(u64) -> bool + Send + Sync>;

/// `tokio::time::interval` で tick を発生させる Ticker
pub struct TokioTicker {
    period: Duration,
    on_tick: OnTick,
}

impl TokioTicker {
    /// 新しい TokioTicker を作成
    ///
    /// 最初の tick は `period` 経過後に発生する。
    pub fn new<F>(period: Duration, on_tick: F) -> Self
    where
        F: Fn(u64) -> bool + Send + Sync + 'static,
    {
        Self {
            period,
            on_tick: Arc::new(on_tick),
        }
    }
}

impl Ticker for TokioTicker {
    fn arm(&self, generation: u64) -> Box<dyn TickHandle> {
        let period = self.period;
        let on_tick = self.on_tick.clone();
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !on_tick(generation) {
                    tracing::debug!("Tick receiver gone, stopping countdown {}", generation);
                    break;
                }
            }
        });
        tracing::debug!("Countdown {} armed ({:?} period)", generation, period);
        Box::new(TokioTickHandle { generation, task })
    }
}

/// 周期タスクのハンドル。キャンセルまたは drop でタスクを中断する。
pub struct TokioTickHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl fmt::Debug for TokioTickHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioTickHandle")
            .field("generation", &self.generation)
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl TickHandle for TokioTickHandle {
    fn cancel(&mut self) {
        if !self.task.is_finished() {
            tracing::debug!("Countdown {} cancelled", self.generation);
        }
        self.task.abort();
    }
}

impl Drop for TokioTickHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
