//! `hexhive serve` runs a server, `hexhive bot` plays on one.

use std::time::Duration;

use clap::{Parser, Subcommand};
use hexhive::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Hexhive: a hex-tile game server and random bot
#[derive(Parser, Debug)]
#[command(name = "hexhive", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a matchmaking game server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:9000")]
        bind: String,

        /// Matches allowed to run at once
        #[arg(long, default_value_t = 20)]
        max_games: usize,

        /// Seconds the side to move has before the match is aborted
        #[arg(long, default_value_t = 60)]
        move_timeout: u64,

        /// Score undecided matches as a tie after this many plies
        #[arg(long)]
        max_turns: Option<u32>,

        /// Speak WebSocket instead of length-prefixed TCP
        #[arg(long)]
        websocket: bool,
    },

    /// Connect a bot that plays random legal moves
    Bot {
        /// Server address (`host:port`, or a `ws://` URL for WebSocket)
        #[arg(long, default_value = "127.0.0.1:9000")]
        addr: String,

        /// Identity to handshake with
        #[arg(long)]
        player_id: u64,

        /// Seed for reproducible play
        #[arg(long)]
        seed: Option<u64>,

        /// Matches to play back to back
        #[arg(long, default_value_t = 1)]
        games: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), HexhiveError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Serve {
            bind,
            max_games,
            move_timeout,
            max_turns,
            websocket,
        } => {
            let config = ServerConfig {
                max_active_games: max_games,
                move_timeout: Duration::from_secs(move_timeout),
                max_turns,
                ..ServerConfig::default()
            };
            let builder = GameServer::builder().bind(&bind).config(config);
            if websocket {
                serve(builder.build_websocket().await?).await
            } else {
                serve(builder.build().await?).await
            }
        }
        Command::Bot {
            addr,
            player_id,
            seed,
            games,
        } => {
            let mut engine = match seed {
                Some(seed) => RandomEngine::seeded(seed),
                None => RandomEngine::new(),
            };
            for _ in 0..games {
                let report = if addr.starts_with("ws://") {
                    let conn = WebSocketConnection::connect(&addr).await?;
                    HiveClient::new(conn, PlayerId(player_id)).play(&mut engine).await?
                } else {
                    let conn = TcpConnection::connect(addr.as_str()).await?;
                    HiveClient::new(conn, PlayerId(player_id)).play(&mut engine).await?
                };
                info!(
                    game_id = %report.game_id,
                    color = %report.color,
                    won = report.won(),
                    tie = report.result.tie,
                    turns = report.turns,
                    "match done"
                );
            }
            Ok(())
        }
    }
}

/// Runs `server` until Ctrl-C.
async fn serve<T, K>(server: GameServer<T, K>) -> Result<(), HexhiveError>
where
    T: Transport,
    K: Codec + Clone,
{
    info!(addr = %server.local_addr()?, "listening");
    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "could not listen for Ctrl-C");
            return;
        }
        info!("Ctrl-C received, shutting down");
        shutdown.cancel();
    });
    server.run().await
}
