//! Utilities shared by the livepoll crates: logging bootstrap and clocks.

pub mod logger;
pub mod time;
