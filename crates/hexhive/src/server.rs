//! `GameServer` builder and pairing loop.
//!
//! This is the entry point for running a Hexhive server. It ties the
//! layers together: transport → handshake → lobby → one task per match.
//!
//! ```text
//!  accept loop ──(player, conn)──► pairing loop ──spawn──► match task
//!       │                             ▲    │                   │
//!  handshake task per conn            │    └── Lobby (FIFO)    │
//!                                     └──── slot freed ◄───────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hexhive_engine::PieceColor;
use hexhive_protocol::{Codec, GameId, JsonCodec};
use hexhive_transport::{Connection, TcpTransport, Transport};
#[cfg(feature = "websocket")]
use hexhive_transport::WebSocketTransport;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::handler::{Arrival, accept_loop};
use crate::lobby::Lobby;
use crate::match_task::{Match, MatchGuard, Seat};
use crate::registry::{GameRegistry, PlayerRegistry};
use crate::HexhiveError;

/// Registries shared between the pairing loop, handshake tasks and match
/// cleanup.
///
/// Each lock is held for one registry call at a time and never across
/// network I/O.
#[derive(Debug, Default)]
pub(crate) struct Shared {
    pub(crate) players: Mutex<PlayerRegistry>,
    pub(crate) games: Mutex<GameRegistry>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring and starting a Hexhive server.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use hexhive::GameServer;
///
/// # async fn example() -> Result<(), hexhive::HexhiveError> {
/// let server = GameServer::builder()
///     .bind("0.0.0.0:9000")
///     .max_active_games(50)
///     .move_timeout(Duration::from_secs(30))
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GameServerBuilder {
    bind_addr: String,
    config: ServerConfig,
}

impl GameServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:9000".to_string(),
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_active_games(mut self, max: usize) -> Self {
        self.config.max_active_games = max;
        self
    }

    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    pub fn move_timeout(mut self, timeout: Duration) -> Self {
        self.config.move_timeout = timeout;
        self
    }

    pub fn max_turns(mut self, turns: u32) -> Self {
        self.config.max_turns = Some(turns);
        self
    }

    /// Binds a length-prefixed TCP listener speaking JSON.
    pub async fn build(self) -> Result<GameServer<TcpTransport, JsonCodec>, HexhiveError> {
        let transport = TcpTransport::bind(self.bind_addr.as_str()).await?;
        Ok(self.serve(transport, JsonCodec))
    }

    /// Binds a WebSocket listener speaking JSON.
    #[cfg(feature = "websocket")]
    pub async fn build_websocket(
        self,
    ) -> Result<GameServer<WebSocketTransport, JsonCodec>, HexhiveError> {
        let transport = WebSocketTransport::bind(self.bind_addr.as_str()).await?;
        Ok(self.serve(transport, JsonCodec))
    }

    /// Uses an already-bound transport and any codec. The bind address is
    /// ignored.
    pub fn serve<T, K>(self, transport: T, codec: K) -> GameServer<T, K>
    where
        T: Transport,
        K: Codec + Clone,
    {
        GameServer {
            transport,
            codec,
            config: self.config,
            shared: Arc::new(Shared::default()),
            shutdown: CancellationToken::new(),
        }
    }
}

impl Default for GameServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// A bound Hexhive server.
///
/// Call [`run()`](Self::run) to start accepting and pairing players.
pub struct GameServer<T, K> {
    transport: T,
    codec: K,
    config: ServerConfig,
    shared: Arc<Shared>,
    shutdown: CancellationToken,
}

impl GameServer<TcpTransport, JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> GameServerBuilder {
        GameServerBuilder::new()
    }
}

impl<T, K> GameServer<T, K>
where
    T: Transport,
    K: Codec + Clone,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, HexhiveError> {
        Ok(self.transport.local_addr()?)
    }

    /// A token that stops the server when cancelled. Running matches are
    /// aborted and [`run()`](Self::run) returns once they have wound down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs the server until the shutdown token is cancelled.
    pub async fn run(self) -> Result<(), HexhiveError> {
        let (arrivals_tx, mut arrivals) = mpsc::channel(64);
        let (finished_tx, mut finished) = mpsc::unbounded_channel();

        let accept_task = tokio::spawn(accept_loop(
            self.transport,
            self.codec.clone(),
            Arc::clone(&self.shared),
            self.config.handshake_timeout,
            arrivals_tx,
            self.shutdown.clone(),
        ));

        let mut pairing = Pairing {
            lobby: Lobby::new(),
            matches: JoinSet::new(),
            shared: self.shared,
            codec: self.codec,
            config: self.config,
            finished: finished_tx,
            shutdown: self.shutdown.clone(),
        };

        tracing::info!(
            max_active_games = pairing.config.max_active_games,
            "Hexhive server running"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                Some(arrival) = arrivals.recv() => pairing.admit(arrival).await,
                Some(game_id) = finished.recv() => {
                    tracing::debug!(%game_id, "match slot freed");
                }
                Some(joined) = pairing.matches.join_next() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "match task panicked");
                    }
                }
            }
            pairing.pair_waiting().await;
        }

        tracing::info!("Hexhive server shutting down");
        if let Err(e) = accept_task.await {
            tracing::error!(error = %e, "accept loop panicked");
        }
        pairing.wind_down().await;
        tracing::info!("Hexhive server stopped");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pairing
// ---------------------------------------------------------------------------

/// State owned by the pairing loop. Nothing else touches the lobby.
struct Pairing<C, K> {
    lobby: Lobby<C>,
    matches: JoinSet<()>,
    shared: Arc<Shared>,
    codec: K,
    config: ServerConfig,
    finished: mpsc::UnboundedSender<GameId>,
    shutdown: CancellationToken,
}

impl<C, K> Pairing<C, K>
where
    C: Connection,
    K: Codec + Clone,
{
    /// Queues a handshaken connection. A second connection for an identity
    /// that is already waiting is closed.
    async fn admit(&mut self, (player_id, conn): Arrival<C>) {
        match self.lobby.enqueue(player_id, conn) {
            Ok(()) => {
                tracing::debug!(%player_id, waiting = self.lobby.len(), "player queued");
            }
            Err(conn) => {
                tracing::warn!(%player_id, "identity already waiting, closing duplicate");
                let _ = conn.close().await;
            }
        }
    }

    /// Starts matches for waiting pairs while there is capacity.
    async fn pair_waiting(&mut self) {
        loop {
            if self.lobby.len() < 2 {
                return;
            }

            let mut games = self.shared.games.lock().await;
            if games.active_count() >= self.config.max_active_games {
                tracing::debug!(
                    waiting = self.lobby.len(),
                    "at capacity, pairing deferred"
                );
                return;
            }
            let Some((first, second)) = self.lobby.pop_pair() else {
                return;
            };

            let ((white, white_conn), (black, black_conn)) = if rand::random::<bool>() {
                (first, second)
            } else {
                (second, first)
            };
            let game_id = games.create(white, black);
            drop(games);

            {
                let mut players = self.shared.players.lock().await;
                players.join_game(white, game_id);
                players.join_game(black, game_id);
            }

            tracing::info!(%game_id, %white, %black, "match started");

            let game = Match::new(
                game_id,
                Seat {
                    player: white,
                    color: PieceColor::White,
                    conn: white_conn,
                },
                Seat {
                    player: black,
                    color: PieceColor::Black,
                    conn: black_conn,
                },
                self.codec.clone(),
                &self.config,
                self.shutdown.clone(),
            );
            let guard = MatchGuard {
                game_id,
                white,
                black,
                shared: Arc::clone(&self.shared),
                finished: self.finished.clone(),
            };
            self.matches.spawn(async move {
                let _guard = guard;
                game.run().await;
            });
        }
    }

    /// Closes everyone still waiting and lets running matches abort.
    async fn wind_down(mut self) {
        for (player_id, conn) in self.lobby.drain() {
            tracing::debug!(%player_id, "closing waiting player");
            let _ = conn.close().await;
        }
        while let Some(joined) = self.matches.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "match task panicked");
            }
        }
    }
}
