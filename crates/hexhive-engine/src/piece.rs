//! Pieces, colors, and the move record submitted by players.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Position;

/// The insect printed on a tile. Each type has its own movement rule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
pub enum PieceType {
    /// Moves one cell. Surrounding it ends the game.
    QueenBee,
    /// Slides exactly three cells around the hive.
    Spider,
    /// Moves one cell and may climb on top of other pieces.
    Beetle,
    /// Jumps in a straight line over a run of pieces.
    Grasshopper,
    /// Slides any distance around the hive.
    SoldierAnt,
}

impl PieceType {
    /// Every piece type, in a fixed order.
    pub const ALL: [PieceType; 5] = [
        PieceType::QueenBee,
        PieceType::Spider,
        PieceType::Beetle,
        PieceType::Grasshopper,
        PieceType::SoldierAnt,
    ];
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::QueenBee => "queen bee",
            Self::Spider => "spider",
            Self::Beetle => "beetle",
            Self::Grasshopper => "grasshopper",
            Self::SoldierAnt => "soldier ant",
        };
        f.write_str(name)
    }
}

/// Which side a piece belongs to. White moves on even turns.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    /// The other side.
    pub fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// The side to move on the given (0-based) turn.
    pub fn for_turn(turn: u32) -> Self {
        if turn % 2 == 0 { Self::White } else { Self::Black }
    }
}

impl fmt::Display for PieceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => f.write_str("white"),
            Self::Black => f.write_str("black"),
        }
    }
}

/// A single tile.
///
/// `placed == false` means the piece is still in its owner's hand and
/// `position`/`level` carry no meaning. `level` is the stack height once on
/// the board: 0 on the ground, 1 for a beetle on top of one piece, etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub position: Position,
    pub piece_type: PieceType,
    pub color: PieceColor,
    pub placed: bool,
    pub level: u32,
}

impl Piece {
    /// A piece still in hand.
    pub fn in_hand(piece_type: PieceType, color: PieceColor) -> Self {
        Self {
            position: Position::ORIGIN,
            piece_type,
            color,
            placed: false,
            level: 0,
        }
    }

    /// A piece already on the board at ground level.
    pub fn on_board(
        piece_type: PieceType,
        color: PieceColor,
        position: Position,
    ) -> Self {
        Self {
            position,
            piece_type,
            color,
            placed: true,
            level: 0,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.placed {
            write!(f, "{} {} at {}", self.color, self.piece_type, self.position)
        } else {
            write!(f, "{} {} (in hand)", self.color, self.piece_type)
        }
    }
}

/// One ply: either place `piece` from hand at `destination`, or move the
/// placed `piece` (identified by its current position) to `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub piece: Piece,
    pub destination: Position,
}

impl Move {
    pub fn place(
        piece_type: PieceType,
        color: PieceColor,
        destination: Position,
    ) -> Self {
        Self {
            piece: Piece::in_hand(piece_type, color),
            destination,
        }
    }

    pub fn relocate(piece: Piece, destination: Position) -> Self {
        Self { piece, destination }
    }

    pub fn is_placement(&self) -> bool {
        !self.piece.placed
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.piece, self.destination)
    }
}
