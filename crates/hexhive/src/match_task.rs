//! One task per match: relay moves between two seats and the session.
//!
//! The task is the only owner of its [`GameSession`], so no locking is
//! needed for game state. It reads moves from the side to move and answers
//! every submission with a status update. The other seat is watched too:
//! anything it sends out of turn, or its hanging up, ends the match.
//!
//! Every ply has one deadline, set when the mover is first asked. Refused
//! submissions do not push it back. Outgoing updates are bounded by the
//! same `move_timeout`, so a peer that stops reading cannot stall the task.

use std::sync::Arc;
use std::time::Duration;

use hexhive_engine::{Move, PieceColor};
use hexhive_protocol::{
    ClientMessage, Codec, FailureKind, GameId, GameState, PlayerId,
    ProtocolError, ServerMessage, StatusUpdate,
};
use hexhive_session::{GameSession, Outcome};
use hexhive_transport::Connection;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::HexhiveError;
use crate::config::ServerConfig;
use crate::server::Shared;

/// Limit for the abort notice and the closing of each seat. These also run
/// after shutdown, so the token cannot bound them.
const ABORT_GRACE: Duration = Duration::from_secs(1);

/// A player sitting at one side of the board.
pub(crate) struct Seat<C> {
    pub(crate) player: PlayerId,
    pub(crate) color: PieceColor,
    pub(crate) conn: C,
}

pub(crate) struct Match<C, K> {
    game_id: GameId,
    session: GameSession,
    white: Seat<C>,
    black: Seat<C>,
    codec: K,
    move_timeout: Duration,
    shutdown: CancellationToken,
}

impl<C, K> Match<C, K>
where
    C: Connection,
    K: Codec,
{
    pub(crate) fn new(
        game_id: GameId,
        white: Seat<C>,
        black: Seat<C>,
        codec: K,
        config: &ServerConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let session = match config.max_turns {
            Some(limit) => GameSession::new().with_turn_limit(limit),
            None => GameSession::new(),
        };
        Self {
            game_id,
            session,
            white,
            black,
            codec,
            move_timeout: config.move_timeout,
            shutdown,
        }
    }

    /// Plays the match to its end and closes both connections.
    ///
    /// Returns the outcome, or `None` if the match was aborted.
    pub(crate) async fn run(mut self) -> Option<Outcome> {
        let game_id = self.game_id;
        let result = self.play().await;

        let outcome = match result {
            Ok(outcome) => {
                tracing::info!(
                    %game_id,
                    %outcome,
                    turns = self.session.turn(),
                    "match finished"
                );
                Some(outcome)
            }
            Err(e) => {
                tracing::warn!(%game_id, error = %e, "match aborted");
                self.broadcast_abort(&e).await;
                None
            }
        };

        for seat in [&self.white, &self.black] {
            if tokio::time::timeout(ABORT_GRACE, seat.conn.close())
                .await
                .is_err()
            {
                tracing::debug!(%game_id, player_id = %seat.player, "close timed out");
            }
        }
        outcome
    }

    async fn play(&mut self) -> Result<Outcome, HexhiveError> {
        self.broadcast().await?;

        loop {
            if let Some(outcome) = self.session.state().outcome() {
                return Ok(outcome);
            }

            if self.session.legal_moves().is_empty() {
                tracing::debug!(
                    game_id = %self.game_id,
                    side = %self.session.side_to_move(),
                    "no legal action, passing"
                );
                self.session.pass()?;
                self.broadcast().await?;
                continue;
            }

            let mover = self.session.side_to_move();
            let deadline = Instant::now() + self.move_timeout;
            loop {
                let mv = self.await_move(mover, deadline).await?;
                let Err(e) = self.session.apply(mv) else {
                    break;
                };
                tracing::debug!(
                    game_id = %self.game_id,
                    %mv,
                    error = %e,
                    "move refused"
                );
                let update = self
                    .status_for(mover)
                    .with_failure(FailureKind::IllegalMove, e.to_string());
                self.send(self.seat(mover), update).await?;
            }
            self.broadcast().await?;
        }
    }

    /// Waits until `deadline` for the side to move to submit a `PlayMove`
    /// for this game, while watching the idle seat.
    async fn await_move(
        &self,
        mover: PieceColor,
        deadline: Instant,
    ) -> Result<Move, HexhiveError> {
        let seat = self.seat(mover);
        let idle = self.seat(mover.opponent());

        let frame = tokio::select! {
            _ = self.shutdown.cancelled() => return Err(HexhiveError::Shutdown),
            received = tokio::time::timeout_at(deadline, seat.conn.recv()) => {
                received
                    .map_err(|_| HexhiveError::Timeout("move"))??
                    .ok_or(HexhiveError::Disconnected)?
            }
            spoke = idle.conn.recv() => {
                return Err(match spoke? {
                    None => HexhiveError::Disconnected,
                    Some(frame) => {
                        let message = self.codec.decode::<ClientMessage>(&frame)?;
                        ProtocolError::OutOfTurn {
                            player: idle.player,
                            got: message.kind(),
                        }
                        .into()
                    }
                });
            }
        };

        match self.codec.decode::<ClientMessage>(&frame)? {
            ClientMessage::PlayMove { game_id, mv } if game_id == self.game_id => {
                Ok(mv)
            }
            ClientMessage::PlayMove { game_id, .. } => Err(ProtocolError::WrongGame {
                player: seat.player,
                expected: self.game_id,
                got: game_id,
            }
            .into()),
            other => Err(ProtocolError::UnexpectedMessage {
                expected: "PlayMove",
                got: other.kind(),
            }
            .into()),
        }
    }

    // -----------------------------------------------------------------------
    // Outgoing
    // -----------------------------------------------------------------------

    fn seat(&self, color: PieceColor) -> &Seat<C> {
        match color {
            PieceColor::White => &self.white,
            PieceColor::Black => &self.black,
        }
    }

    fn status_for(&self, color: PieceColor) -> StatusUpdate {
        let update = StatusUpdate::new(
            self.game_id,
            GameState::for_player(&self.session, color),
        );
        match self.session.state().outcome() {
            Some(outcome) => update.with_outcome(outcome),
            None => update,
        }
    }

    /// Sends one update, giving up on shutdown or after `move_timeout`.
    async fn send(
        &self,
        seat: &Seat<C>,
        update: StatusUpdate,
    ) -> Result<(), HexhiveError> {
        tokio::select! {
            _ = self.shutdown.cancelled() => Err(HexhiveError::Shutdown),
            sent = self.deliver(seat, update, self.move_timeout) => sent,
        }
    }

    async fn deliver(
        &self,
        seat: &Seat<C>,
        update: StatusUpdate,
        limit: Duration,
    ) -> Result<(), HexhiveError> {
        let frame = self.codec.encode(&ServerMessage::from(update))?;
        tokio::time::timeout(limit, seat.conn.send(&frame))
            .await
            .map_err(|_| HexhiveError::Timeout("peer to read"))??;
        Ok(())
    }

    /// Sends the current position to both seats, each from its own side.
    async fn broadcast(&self) -> Result<(), HexhiveError> {
        for seat in [&self.white, &self.black] {
            self.send(seat, self.status_for(seat.color)).await?;
        }
        Ok(())
    }

    /// Best effort: a seat that is gone or not reading simply misses it.
    async fn broadcast_abort(&self, reason: &HexhiveError) {
        for seat in [&self.white, &self.black] {
            let update = StatusUpdate::new(
                self.game_id,
                GameState::for_player(&self.session, seat.color),
            )
            .with_failure(FailureKind::Aborted, reason.to_string());
            if let Err(e) = self.deliver(seat, update, ABORT_GRACE).await {
                tracing::debug!(
                    game_id = %self.game_id,
                    player_id = %seat.player,
                    error = %e,
                    "could not deliver abort"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Cleanup
// ---------------------------------------------------------------------------

/// Drop guard that releases a match's slot when its task ends.
///
/// Runs even if the task panics. `Drop` is synchronous, so the async
/// registry update is spawned as a fire-and-forget task; the pairing loop
/// is told only after the slot is actually free.
pub(crate) struct MatchGuard {
    pub(crate) game_id: GameId,
    pub(crate) white: PlayerId,
    pub(crate) black: PlayerId,
    pub(crate) shared: Arc<Shared>,
    pub(crate) finished: mpsc::UnboundedSender<GameId>,
}

impl Drop for MatchGuard {
    fn drop(&mut self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let game_id = self.game_id;
        let players = [self.white, self.black];
        let shared = Arc::clone(&self.shared);
        let finished = self.finished.clone();
        handle.spawn(async move {
            shared.games.lock().await.remove(game_id);
            {
                let mut registry = shared.players.lock().await;
                for player in players {
                    registry.leave_game(player, game_id);
                }
            }
            let _ = finished.send(game_id);
        });
    }
}
