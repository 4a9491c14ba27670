//! Why a submitted move was refused.

use hexhive_engine::{Piece, PieceColor, PieceType, Position};

/// A move or pass the rules do not allow.
///
/// Returning one of these never changes the session: the player may submit
/// another move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LegalityError {
    /// The game has already finished.
    #[error("the game is already over")]
    GameOver,

    /// The submitted piece belongs to the side that is not on move.
    #[error("it is {to_move}'s turn, cannot play a {piece} piece")]
    NotYourPiece {
        piece: PieceColor,
        to_move: PieceColor,
    },

    /// No piece of this type is left in hand.
    #[error("no {0} left in hand")]
    HandExhausted(PieceType),

    /// The queen bee is still in hand on or after the fourth ply of this
    /// side, and the move is something other than placing it.
    #[error("the queen bee must be placed by each side's fourth ply")]
    QueenDeadline,

    /// The destination is not a legal placement cell.
    #[error("cannot place a piece at {0}")]
    IllegalPlacement(Position),

    /// No exposed piece matching the submission sits at its position.
    #[error("no movable {0}")]
    PieceNotFound(Piece),

    /// Lifting the piece would split the hive in two.
    #[error("moving {0} would split the hive")]
    HiveWouldSplit(Piece),

    /// The piece exists and may move, but not to this cell.
    #[error("{piece} cannot move to {destination}")]
    IllegalMove { piece: Piece, destination: Position },

    /// A pass was requested while a legal action exists.
    #[error("cannot pass while a legal move is available")]
    CannotPass,
}
