//! UI 層: HTTP / WebSocket サーバー

mod handler;
mod server;
mod signal;
mod state;

pub use server::Server;
