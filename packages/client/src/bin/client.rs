//! Command-line client for codepair rooms.
//!
//! Creates or joins a room, then sends chat lines and playback commands from
//! stdin. Reconnects on connection loss (max 5 attempts, 5 seconds apart),
//! reusing its session token.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin codepair-client -- --name Creator create
//! cargo run --bin codepair-client -- --name Guest-42 join <room_id>
//! ```

use clap::{Parser, Subcommand};

use codepair_client::{ClientConfig, RoomTarget, run_client};
use codepair_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "codepair-client")]
#[command(about = "Room client with chat and playback sync", long_about = None)]
struct Args {
    /// Display name in the room
    #[arg(short = 'n', long)]
    name: String,

    /// HTTP base URL of the server
    #[arg(short = 's', long, default_value = "http://127.0.0.1:8080")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a room and join it as its creator
    Create {
        /// Identity to create the room as (random if omitted)
        #[arg(short = 'i', long)]
        identity: Option<String>,
    },
    /// Join an existing room
    Join {
        room_id: String,

        /// Session token from an earlier join or from room creation
        #[arg(short = 't', long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let target = match args.command {
        Command::Create { identity } => RoomTarget::Create {
            creator_identity: identity.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        },
        Command::Join { room_id, token } => RoomTarget::Join { room_id, token },
    };

    let config = ClientConfig {
        server: args.server,
        name: args.name,
        target,
    };

    // Run the client
    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
