//! Infrastructure 層
//!
//! ドメイン層が定義する trait（`MessagePusher`, `HistoryRepository`, `Ticker`）の
//! 具体的な実装と、通信プロトコルの DTO を提供します。

pub mod dto;
pub mod message_pusher;
pub mod repository;
pub mod ticker;
