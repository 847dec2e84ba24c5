//! Countdown scheduling seam.
//!
//! The poll engine arms a ticker when a poll starts and cancels the returned
//! handle on every transition out of `Running`. Implementations deliver
//! ticks back to the coordinator tagged with the generation they were armed
//! for, so ticks from a finished poll can be recognised and ignored.

use std::fmt;

/// Handle to an armed periodic tick.
pub trait TickHandle: Send + Sync + fmt::Debug {
    /// Stop delivering ticks. Calling it more than once is harmless.
    fn cancel(&mut self);
}

/// Arms periodic ticks for the poll countdown.
#[cfg_attr(test, mockall::automock)]
pub trait Ticker: Send + Sync {
    fn arm(&self, generation: u64) -> Box<dyn TickHandle>;
}
