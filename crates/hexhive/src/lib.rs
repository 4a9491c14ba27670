//! # Hexhive
//!
//! Matchmaking game server (and a bot client) for Hexhive, a two-player
//! hex-tile game of surrounding the enemy queen bee.
//!
//! Players connect, identify themselves with a handshake, and wait in a
//! lobby. The server pairs them first-come, first-served, flips a coin
//! for colors, and runs each match in its own task: it relays moves to a
//! [`GameSession`](hexhive_session::GameSession), which alone decides
//! what is legal, and sends both players a status update after every ply.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hexhive::prelude::*;
//!
//! # async fn example() -> Result<(), HexhiveError> {
//! let server = GameServer::builder()
//!     .bind("0.0.0.0:9000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```
//!
//! And a bot to play on it:
//!
//! ```rust,no_run
//! use hexhive::prelude::*;
//!
//! # async fn example() -> Result<(), HexhiveError> {
//! let conn = TcpConnection::connect("127.0.0.1:9000").await?;
//! let client = HiveClient::new(conn, PlayerId(1));
//! let report = client.play(&mut RandomEngine::new()).await?;
//! println!("{:?}", report.result);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod handler;
mod lobby;
mod match_task;
mod registry;
mod server;

pub use client::{Engine, HiveClient, MatchReport, RandomEngine};
pub use config::ServerConfig;
pub use error::HexhiveError;
pub use lobby::Lobby;
pub use registry::{GameRecord, GameRegistry, PlayerRecord, PlayerRegistry};
pub use server::{GameServer, GameServerBuilder};

/// The types most programs need, in one import.
pub mod prelude {
    pub use crate::{
        Engine, GameServer, GameServerBuilder, HexhiveError, HiveClient,
        MatchReport, RandomEngine, ServerConfig,
    };
    pub use hexhive_engine::{Move, Piece, PieceColor, PieceType, Position};
    pub use hexhive_protocol::{
        Codec, GameId, GameState, JsonCodec, PlayerId, StatusUpdate,
    };
    pub use hexhive_transport::{
        Connection, TcpConnection, TcpTransport, Transport,
    };
    #[cfg(feature = "websocket")]
    pub use hexhive_transport::{WebSocketConnection, WebSocketTransport};
}
