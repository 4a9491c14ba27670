//! Everything that travels on the wire between a Hexhive server and its
//! players.
//!
//! There are exactly three message shapes:
//!
//! ```text
//! client ──Handshake{player_id}──────────────► server   (once, first)
//! client ◄──StatusUpdate{game_id, game_state,── server   (every ply)
//!                        game_failed?, game_finished?}
//! client ──PlayMove{game_id, move}────────────► server   (on your turn)
//! ```
//!
//! All of them are internally tagged with a `"type"` field so a reader can
//! dispatch on it before looking at anything else.

use std::fmt;

use hexhive_engine::{Board, Move, PieceColor};
use hexhive_session::{GameSession, Hand, Outcome};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable player identity, chosen by the client in its handshake.
///
/// Newtype over `u64` so a `GameId` can never be passed where a player is
/// expected. `#[serde(transparent)]` keeps it a bare number on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifies one match, assigned by the server when two players are
/// paired.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Messages a player sends to the server.
///
/// Internally tagged: `PlayMove` becomes
/// `{"type":"PlayMove","game_id":1,"move":{...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// First message on every connection: who is this?
    Handshake { player_id: PlayerId },

    /// A placement or movement for the given game.
    PlayMove {
        game_id: GameId,
        #[serde(rename = "move")]
        mv: Move,
    },
}

impl ClientMessage {
    /// The variant name, for error messages and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Handshake { .. } => "Handshake",
            Self::PlayMove { .. } => "PlayMove",
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Messages the server sends to a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    StatusUpdate(StatusUpdate),
}

/// The game as one player sees it.
///
/// `hand` is always the receiver's own hand and `color` the receiver's
/// side, so the same struct works for both seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub hand: Hand,
    pub opponent_hand: Hand,
    /// The receiver's color.
    pub color: PieceColor,
    /// The side whose ply it is.
    pub to_move: PieceColor,
    /// Plies played so far, counting both sides.
    pub turn: u32,
}

impl GameState {
    /// Snapshot of `session` from `color`'s seat.
    pub fn for_player(session: &GameSession, color: PieceColor) -> Self {
        Self {
            board: session.board().clone(),
            hand: session.hand(color).clone(),
            opponent_hand: session.hand(color.opponent()).clone(),
            color,
            to_move: session.side_to_move(),
            turn: session.turn(),
        }
    }

    /// Returns `true` if the receiver is the side to move.
    pub fn is_my_turn(&self) -> bool {
        self.color == self.to_move
    }

    /// Rebuilds a session from this snapshot, e.g. to enumerate legal
    /// moves on the client.
    pub fn to_session(&self) -> GameSession {
        let (white, black) = match self.color {
            PieceColor::White => (self.hand.clone(), self.opponent_hand.clone()),
            PieceColor::Black => (self.opponent_hand.clone(), self.hand.clone()),
        };
        GameSession::from_position(self.board.clone(), white, black, self.turn)
    }
}

/// What went wrong, from the receiver's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The receiver's last move was refused. The game goes on and the
    /// receiver is still on move.
    IllegalMove,
    /// The match is over without a result (opponent gone, protocol
    /// violation, move deadline, server shutdown).
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFailed {
    pub kind: FailureKind,
    /// Human-readable reason.
    pub message: String,
}

/// Final result. `winner` is `None` exactly when `tie` is `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFinished {
    pub winner: Option<PieceColor>,
    pub tie: bool,
}

impl From<Outcome> for GameFinished {
    fn from(outcome: Outcome) -> Self {
        Self {
            winner: outcome.winner(),
            tie: outcome == Outcome::Tie,
        }
    }
}

/// Sent after every ply, after a refused move, and at the end of a match.
///
/// `game_failed` and `game_finished` are omitted from the JSON when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub game_id: GameId,
    pub game_state: GameState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_failed: Option<GameFailed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_finished: Option<GameFinished>,
}

impl StatusUpdate {
    pub fn new(game_id: GameId, game_state: GameState) -> Self {
        Self {
            game_id,
            game_state,
            game_failed: None,
            game_finished: None,
        }
    }

    pub fn with_failure(
        mut self,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        self.game_failed = Some(GameFailed {
            kind,
            message: message.into(),
        });
        self
    }

    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.game_finished = Some(outcome.into());
        self
    }

    /// Returns `true` if no further updates will follow for this game.
    pub fn is_terminal(&self) -> bool {
        self.game_finished.is_some()
            || self
                .game_failed
                .as_ref()
                .is_some_and(|f| f.kind == FailureKind::Aborted)
    }
}

impl From<StatusUpdate> for ServerMessage {
    fn from(update: StatusUpdate) -> Self {
        Self::StatusUpdate(update)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! These tests pin the JSON shapes; a mismatch means a client in any
    //! language can no longer parse what we send.

    use super::*;
    use hexhive_engine::{PieceType, Position};
    use serde_json::json;

    fn opening_state() -> GameState {
        GameState::for_player(&GameSession::new(), PieceColor::White)
    }

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_ids_display_with_prefix() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
        assert_eq!(GameId(3).to_string(), "G-3");
    }

    // =====================================================================
    // ClientMessage
    // =====================================================================

    #[test]
    fn test_handshake_json_format() {
        let msg = ClientMessage::Handshake {
            player_id: PlayerId(9),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, json!({ "type": "Handshake", "player_id": 9 }));
    }

    #[test]
    fn test_play_move_uses_move_field_name() {
        let msg = ClientMessage::PlayMove {
            game_id: GameId(1),
            mv: Move::place(PieceType::QueenBee, PieceColor::White, Position::ORIGIN),
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "PlayMove");
        assert_eq!(json["game_id"], 1);
        assert_eq!(json["move"]["destination"], json!({ "x": 0, "y": 0 }));
        assert_eq!(json["move"]["piece"]["piece_type"], "QueenBee");
    }

    #[test]
    fn test_play_move_deserializes_from_hand_written_json() {
        let raw = json!({
            "type": "PlayMove",
            "game_id": 5,
            "move": {
                "piece": {
                    "position": { "x": 0, "y": 0 },
                    "piece_type": "Beetle",
                    "color": "Black",
                    "placed": false,
                    "level": 0
                },
                "destination": { "x": 1, "y": 0 }
            }
        });
        let msg: ClientMessage = serde_json::from_value(raw).unwrap();
        let ClientMessage::PlayMove { game_id, mv } = msg else {
            panic!("expected PlayMove");
        };
        assert_eq!(game_id, GameId(5));
        assert!(mv.is_placement());
        assert_eq!(mv.piece.piece_type, PieceType::Beetle);
    }

    #[test]
    fn test_unknown_message_type_fails_to_decode() {
        let raw = json!({ "type": "Resign", "game_id": 1 });
        assert!(serde_json::from_value::<ClientMessage>(raw).is_err());
    }

    // =====================================================================
    // StatusUpdate
    // =====================================================================

    #[test]
    fn test_status_update_omits_absent_optionals() {
        let msg = ServerMessage::from(StatusUpdate::new(GameId(2), opening_state()));
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "StatusUpdate");
        assert_eq!(json["game_id"], 2);
        assert_eq!(json["game_state"]["turn"], 0);
        assert_eq!(json["game_state"]["board"], json!([]));
        assert_eq!(json["game_state"]["hand"]["Spider"], 2);
        assert!(json.get("game_failed").is_none());
        assert!(json.get("game_finished").is_none());
    }

    #[test]
    fn test_status_update_with_failure_is_terminal_only_when_aborted() {
        let illegal = StatusUpdate::new(GameId(1), opening_state())
            .with_failure(FailureKind::IllegalMove, "no");
        let aborted = StatusUpdate::new(GameId(1), opening_state())
            .with_failure(FailureKind::Aborted, "gone");

        assert!(!illegal.is_terminal());
        assert!(aborted.is_terminal());
    }

    #[test]
    fn test_status_update_with_outcome_tie() {
        let update =
            StatusUpdate::new(GameId(1), opening_state()).with_outcome(Outcome::Tie);
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json["game_finished"],
            json!({ "winner": null, "tie": true })
        );
        assert!(update.is_terminal());
    }

    #[test]
    fn test_game_finished_from_winner() {
        let finished = GameFinished::from(Outcome::Winner(PieceColor::Black));
        assert_eq!(finished.winner, Some(PieceColor::Black));
        assert!(!finished.tie);
    }

    // =====================================================================
    // GameState
    // =====================================================================

    #[test]
    fn test_game_state_for_black_swaps_hands() {
        let mut session = GameSession::new();
        session
            .apply(Move::place(PieceType::QueenBee, PieceColor::White, Position::ORIGIN))
            .unwrap();

        let black = GameState::for_player(&session, PieceColor::Black);
        assert!(black.is_my_turn());
        assert_eq!(black.hand.count(PieceType::QueenBee), 1);
        assert_eq!(black.opponent_hand.count(PieceType::QueenBee), 0);
    }

    #[test]
    fn test_game_state_to_session_round_trips_position() {
        let mut session = GameSession::new();
        session
            .apply(Move::place(PieceType::Spider, PieceColor::White, Position::ORIGIN))
            .unwrap();

        let rebuilt = GameState::for_player(&session, PieceColor::Black).to_session();
        assert_eq!(rebuilt.turn(), 1);
        assert_eq!(rebuilt.board(), session.board());
        assert_eq!(rebuilt.hand(PieceColor::White), session.hand(PieceColor::White));
        assert_eq!(rebuilt.legal_moves(), session.legal_moves());
    }
}
