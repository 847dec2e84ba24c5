//! Live classroom polling server.
//!
//! A single session coordinator owns the poll, identities and chat rooms;
//! WebSocket connections feed it commands and receive events back.

pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
