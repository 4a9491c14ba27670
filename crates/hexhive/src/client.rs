//! Playing against a Hexhive server.
//!
//! [`HiveClient`] speaks the protocol over any [`Connection`]; an
//! [`Engine`] decides what to play. [`RandomEngine`] picks uniformly among
//! the legal moves, which is enough to exercise a server end to end.

use hexhive_engine::{Move, PieceColor};
use hexhive_protocol::{
    ClientMessage, Codec, FailureKind, GameFinished, GameId, GameState,
    JsonCodec, PlayerId, ServerMessage, StatusUpdate,
};
use hexhive_transport::Connection;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use crate::HexhiveError;

// ---------------------------------------------------------------------------
// Engines
// ---------------------------------------------------------------------------

/// Chooses a move for the position in a status update.
///
/// Only called when it is the engine's turn. Returning `None` gives up
/// the match.
pub trait Engine: Send {
    fn make_move(&mut self, state: &GameState) -> Option<Move>;
}

/// Plays a uniformly random legal move.
#[derive(Debug, Clone)]
pub struct RandomEngine {
    rng: StdRng,
}

impl RandomEngine {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// A reproducible engine: the same seed and the same positions give
    /// the same moves.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for RandomEngine {
    fn make_move(&mut self, state: &GameState) -> Option<Move> {
        state.to_session().legal_moves().choose(&mut self.rng).copied()
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// How a match ended, from one player's seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchReport {
    pub game_id: GameId,
    pub color: PieceColor,
    pub result: GameFinished,
    /// Plies played in the whole match, both sides.
    pub turns: u32,
}

impl MatchReport {
    pub fn won(&self) -> bool {
        self.result.winner == Some(self.color)
    }
}

/// One player's connection to a server.
pub struct HiveClient<C, K = JsonCodec> {
    conn: C,
    codec: K,
    player_id: PlayerId,
}

impl<C: Connection> HiveClient<C> {
    pub fn new(conn: C, player_id: PlayerId) -> Self {
        Self::with_codec(conn, player_id, JsonCodec)
    }
}

impl<C, K> HiveClient<C, K>
where
    C: Connection,
    K: Codec,
{
    pub fn with_codec(conn: C, player_id: PlayerId, codec: K) -> Self {
        Self {
            conn,
            codec,
            player_id,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Identifies this client. Must be the first thing sent.
    pub async fn handshake(&self) -> Result<(), HexhiveError> {
        self.send(&ClientMessage::Handshake {
            player_id: self.player_id,
        })
        .await
    }

    /// Waits for the next status update.
    ///
    /// Cancel-safe, so it can be raced against a timeout.
    pub async fn next_update(&self) -> Result<StatusUpdate, HexhiveError> {
        let frame = self.conn.recv().await?.ok_or(HexhiveError::Disconnected)?;
        let ServerMessage::StatusUpdate(update) =
            self.codec.decode::<ServerMessage>(&frame)?;
        Ok(update)
    }

    pub async fn submit(&self, game_id: GameId, mv: Move) -> Result<(), HexhiveError> {
        self.send(&ClientMessage::PlayMove { game_id, mv }).await
    }

    pub async fn close(&self) -> Result<(), HexhiveError> {
        Ok(self.conn.close().await?)
    }

    /// Handshakes, then plays one match with `engine` until it finishes.
    ///
    /// A refused move is logged and the engine is asked again. An aborted
    /// match is an error.
    pub async fn play(&self, engine: &mut impl Engine) -> Result<MatchReport, HexhiveError> {
        self.handshake().await?;

        loop {
            let update = self.next_update().await?;

            if let Some(failure) = &update.game_failed {
                match failure.kind {
                    FailureKind::Aborted => {
                        return Err(HexhiveError::Aborted(failure.message.clone()));
                    }
                    FailureKind::IllegalMove => tracing::warn!(
                        player_id = %self.player_id,
                        reason = %failure.message,
                        "move refused, retrying"
                    ),
                }
            }

            if let Some(result) = update.game_finished {
                tracing::info!(
                    player_id = %self.player_id,
                    game_id = %update.game_id,
                    ?result,
                    "match over"
                );
                return Ok(MatchReport {
                    game_id: update.game_id,
                    color: update.game_state.color,
                    result,
                    turns: update.game_state.turn,
                });
            }

            if update.game_state.is_my_turn() {
                let mv = engine
                    .make_move(&update.game_state)
                    .ok_or(HexhiveError::NoMove)?;
                tracing::debug!(player_id = %self.player_id, %mv, "submitting");
                self.submit(update.game_id, mv).await?;
            }
        }
    }

    async fn send(&self, message: &ClientMessage) -> Result<(), HexhiveError> {
        let frame = self.codec.encode(message)?;
        self.conn.send(&frame).await?;
        Ok(())
    }
}
