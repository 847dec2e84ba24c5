//! Live-poll server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin livepoll-server
//! cargo run --bin livepoll-server -- --host 0.0.0.0 --port 4000 --default-duration 30
//! ```

use std::{collections::HashMap, sync::Arc};

use clap::Parser;
use livepoll_server::{
    domain::RoomKey,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::InMemoryHistoryRepository,
        ticker::{TICK_PERIOD, TokioTicker},
    },
    ui::Server,
    usecase::{GetHistoryUseCase, SessionConfig, SessionCoordinator, SessionHandle},
};
use livepoll_shared::{logger::setup_logger, time::SystemClock};
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(name = "livepoll-server")]
#[command(about = "Live classroom polling server over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "LIVEPOLL_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "4000")]
    port: u16,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, env = "LIVEPOLL_LOG_LEVEL", default_value = "debug")]
    log_level: String,

    /// Poll duration in seconds when a start request carries none
    #[arg(
        long,
        env = "LIVEPOLL_DEFAULT_DURATION",
        default_value = "60",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    default_duration: u64,

    /// Room used when a room command names none
    #[arg(long, env = "LIVEPOLL_DEFAULT_ROOM", default_value = "poll-global")]
    default_room: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let default_room = match RoomKey::new(&args.default_room) {
        Ok(room) => room,
        Err(e) => {
            tracing::error!("Invalid --default-room '{}': {}", args.default_room, e);
            std::process::exit(1);
        }
    };
    let config = SessionConfig {
        default_duration_secs: args.default_duration,
        default_room,
    };
    tracing::debug!("{:?}", config);

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. Ticker
    // 4. Coordinator and UseCases
    // 5. Server

    // 1. Create Repository (in-memory history log)
    let history_repository = Arc::new(InMemoryHistoryRepository::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher_clients = Arc::new(Mutex::new(HashMap::new()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(message_pusher_clients));

    // 3. Create Ticker (posts ticks back into the coordinator queue)
    let (session, commands) = SessionHandle::channel();
    let tick_session = session.clone();
    let ticker = Arc::new(TokioTicker::new(TICK_PERIOD, move |generation| {
        tick_session.tick(generation).is_ok()
    }));

    // 4. Create the coordinator task and UseCases
    let coordinator = SessionCoordinator::new(
        config,
        message_pusher,
        history_repository.clone(),
        ticker,
        Arc::new(SystemClock),
    );
    tokio::spawn(coordinator.run(commands));
    let get_history_usecase = Arc::new(GetHistoryUseCase::new(history_repository));

    // 5. Create and run the server
    let server = Server::new(session, get_history_usecase);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
