//! Room coordination server.
//!
//! Serves the room HTTP API and the `/ws` WebSocket endpoint.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin codepair-server
//! cargo run --bin codepair-server -- --host 0.0.0.0 --port 3000 --ended-ledger ./ended-rooms.json
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;

use codepair_server::{
    domain::{EndedRoomLedger, RoomPolicy},
    infrastructure::repository::{InMemoryEndedLedger, JsonFileEndedLedger},
    ui::{AppState, Server},
};
use codepair_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "codepair-server")]
#[command(about = "Room coordination server with presence, chat and playback sync", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seconds a dropped connection keeps its slot
    #[arg(long, default_value = "5")]
    grace_window_secs: u64,

    /// Seconds a slot is kept after the client announced in-app navigation
    #[arg(long, default_value = "15")]
    navigation_window_secs: u64,

    /// Seconds a message id counts as a duplicate
    #[arg(long, default_value = "60")]
    dedup_window_secs: u64,

    /// Message ids remembered per connection
    #[arg(long, default_value = "256")]
    dedup_capacity: usize,

    /// Recent messages replayed to joining connections
    #[arg(long, default_value = "100")]
    history_capacity: usize,

    /// Seconds after which an idle room is ended
    #[arg(long, default_value = "86400")]
    room_ttl_secs: u64,

    /// Seconds between room expiry sweeps
    #[arg(long, default_value = "60")]
    reaper_interval_secs: u64,

    /// JSON file that keeps ended room ids across restarts (in-memory if omitted)
    #[arg(long)]
    ended_ledger: Option<PathBuf>,
}

impl Args {
    fn policy(&self) -> RoomPolicy {
        RoomPolicy {
            grace_window: Duration::from_secs(self.grace_window_secs),
            navigation_window: Duration::from_secs(self.navigation_window_secs),
            dedup_window: Duration::from_secs(self.dedup_window_secs),
            dedup_capacity: self.dedup_capacity,
            history_capacity: self.history_capacity,
            room_ttl: Duration::from_secs(self.room_ttl_secs),
            reaper_interval: Duration::from_secs(self.reaper_interval_secs.max(1)),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let policy = args.policy();
    tracing::debug!("Room policy: {:?}", policy);

    // 1. Ended-room ledger
    let ledger: Arc<dyn EndedRoomLedger> = match &args.ended_ledger {
        Some(path) => match JsonFileEndedLedger::open(path).await {
            Ok(ledger) => {
                tracing::info!("Ended-room ledger: {}", path.display());
                Arc::new(ledger)
            }
            Err(e) => {
                tracing::error!("Failed to open ended-room ledger {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Arc::new(InMemoryEndedLedger::new()),
    };

    // 2. Repositories, MessagePusher and UseCases
    let state = AppState::in_memory(policy, ledger);

    // 3. Server
    if let Err(e) = Server::new(state).run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
