//! The board: every placed piece plus a per-cell stack index.
//!
//! Pieces live in a flat `Vec` (that is also the wire representation).
//! Next to it, `stacks` maps each occupied cell to the indices of the pieces
//! on it, bottom first. "Who is on top here?" and "is this cell occupied?"
//! are then a single map lookup instead of a scan over every piece.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{Piece, PieceColor, PieceType, Position};

/// Index of a piece inside [`Board::pieces`].
pub type PieceIndex = usize;

/// All pieces currently on the hex grid.
///
/// Serialized as the plain list of pieces; the stack index is rebuilt on
/// deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Piece>", into = "Vec<Piece>")]
pub struct Board {
    pieces: Vec<Piece>,
    stacks: HashMap<Position, Vec<PieceIndex>>,
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from pieces already on it. Pieces still in hand
    /// (`placed == false`) are skipped.
    pub fn from_pieces(pieces: impl IntoIterator<Item = Piece>) -> Self {
        let mut board = Self::new();
        let mut placed: Vec<Piece> =
            pieces.into_iter().filter(|p| p.placed).collect();
        // Lower levels first so each stack is pushed bottom-up.
        placed.sort_by_key(|p| p.level);
        for piece in placed {
            let index = board.pieces.len();
            board.pieces.push(piece);
            board.stacks.entry(piece.position).or_default().push(index);
        }
        board
    }

    /// All pieces on the board, in placement order.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, index: PieceIndex) -> Option<&Piece> {
        self.pieces.get(index)
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Returns `true` if at least one piece sits on `position`.
    pub fn is_occupied(&self, position: Position) -> bool {
        self.stacks.contains_key(&position)
    }

    /// Number of pieces stacked on `position`.
    pub fn height(&self, position: Position) -> u32 {
        self.stacks.get(&position).map_or(0, |s| s.len() as u32)
    }

    /// The exposed piece on `position`, if any.
    pub fn top(&self, position: Position) -> Option<&Piece> {
        let index = *self.stacks.get(&position)?.last()?;
        self.pieces.get(index)
    }

    /// The exposed piece of every occupied cell.
    pub fn tops(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.stacks
            .values()
            .filter_map(|stack| stack.last())
            .map(|&i| &self.pieces[i])
    }

    /// Finds the board piece described by `piece`: same cell, type and
    /// color, and exposed on top of its stack.
    ///
    /// A buried piece is never returned: it cannot be moved.
    pub fn find_top(&self, piece: &Piece) -> Option<PieceIndex> {
        let index = *self.stacks.get(&piece.position)?.last()?;
        let top = &self.pieces[index];
        (top.piece_type == piece.piece_type && top.color == piece.color)
            .then_some(index)
    }

    /// Finds the position of `color`'s queen bee, if it has been placed.
    pub fn queen_position(&self, color: PieceColor) -> Option<Position> {
        self.pieces
            .iter()
            .find(|p| p.piece_type == PieceType::QueenBee && p.color == color)
            .map(|p| p.position)
    }

    /// Puts a new piece on top of `position` and returns its index.
    pub fn place(
        &mut self,
        piece_type: PieceType,
        color: PieceColor,
        position: Position,
    ) -> PieceIndex {
        let index = self.pieces.len();
        self.pieces.push(Piece {
            position,
            piece_type,
            color,
            placed: true,
            level: self.height(position),
        });
        self.stacks.entry(position).or_default().push(index);
        index
    }

    /// Lifts the piece at `index` off its stack and drops it on top of
    /// `destination`, updating its level.
    ///
    /// Returns `false` (and changes nothing) if the piece is not the
    /// exposed top of its stack.
    pub fn relocate(
        &mut self,
        index: PieceIndex,
        destination: Position,
    ) -> bool {
        let Some(from) = self.pieces.get(index).map(|p| p.position) else {
            return false;
        };
        let is_top = self
            .stacks
            .get(&from)
            .and_then(|s| s.last())
            .is_some_and(|&top| top == index);
        if !is_top {
            return false;
        }

        if let Some(stack) = self.stacks.get_mut(&from) {
            stack.pop();
            if stack.is_empty() {
                self.stacks.remove(&from);
            }
        }

        let level = self.height(destination);
        let piece = &mut self.pieces[index];
        piece.position = destination;
        piece.level = level;
        self.stacks.entry(destination).or_default().push(index);
        true
    }

    /// The occupied cells as they would be with the piece at `index`
    /// lifted off the board. A cell stays occupied if something is buried
    /// under the lifted piece.
    pub fn occupied_without(&self, index: PieceIndex) -> HashSet<Position> {
        self.stacks
            .iter()
            .filter(|(_, stack)| {
                !(stack.len() == 1 && stack[0] == index)
            })
            .map(|(pos, _)| *pos)
            .collect()
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.pieces == other.pieces
    }
}

impl Eq for Board {}

impl From<Vec<Piece>> for Board {
    fn from(pieces: Vec<Piece>) -> Self {
        Self::from_pieces(pieces)
    }
}

impl From<Board> for Vec<Piece> {
    fn from(board: Board) -> Self {
        board.pieces
    }
}
