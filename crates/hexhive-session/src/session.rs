//! The per-match state machine.
//!
//! A [`GameSession`] owns one board, both hands and the turn counter. It is
//! the only thing allowed to change them, and it does so in exactly one
//! place: [`GameSession::apply`] (plus [`GameSession::pass`] for the rare
//! position where the side to move has nothing legal to do).
//!
//! Validation always runs to completion *before* anything is mutated, so a
//! rejected move leaves the session exactly as it was. That property is
//! what lets the server hand the error back to the player and simply wait
//! for another submission.
//!
//! ```text
//!   apply(mv) ──► validate ──Err──► (unchanged)
//!                    │
//!                    Ok
//!                    ▼
//!             mutate board/hand ──► turn += 1 ──► check queens
//!                                                  │
//!                             InProgress ◄─────────┴────► Finished(outcome)
//! ```

use hexhive_engine::{
    Board, Move, PieceColor, PieceIndex, PieceType, available_to_move,
    available_to_place, queen_surrounded, stays_connected_without,
};
use tracing::debug;

use crate::{Hand, LegalityError, Outcome, SessionState};

/// First turn (0-based, counting both sides) at which a side that still
/// holds its queen bee may do nothing but place it. Turn 6 is White's
/// fourth ply; Black's fourth is turn 7.
pub const QUEEN_DEADLINE_TURN: u32 = 6;

/// Consecutive forced passes that end the game in a tie.
const PASSES_TO_TIE: u32 = 2;

/// One game of Hexhive, from the first placement to the end.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    white_hand: Hand,
    black_hand: Hand,
    turn: u32,
    state: SessionState,
    consecutive_passes: u32,
    turn_limit: Option<u32>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// An empty board with both sides holding the standard set.
    pub fn new() -> Self {
        Self::from_position(Board::new(), Hand::standard(), Hand::standard(), 0)
    }

    /// Resumes play from an arbitrary position.
    ///
    /// Nothing is validated: the caller vouches that `board`, the hands and
    /// `turn` belong together. Clients use this to rebuild a session from a
    /// status update and enumerate legal moves.
    pub fn from_position(
        board: Board,
        white_hand: Hand,
        black_hand: Hand,
        turn: u32,
    ) -> Self {
        Self {
            board,
            white_hand,
            black_hand,
            turn,
            state: SessionState::InProgress,
            consecutive_passes: 0,
            turn_limit: None,
        }
    }

    /// Ends the game in a tie once `limit` plies (and passes) have been
    /// played without a result.
    pub fn with_turn_limit(mut self, limit: u32) -> Self {
        self.turn_limit = Some(limit);
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn hand(&self, color: PieceColor) -> &Hand {
        match color {
            PieceColor::White => &self.white_hand,
            PieceColor::Black => &self.black_hand,
        }
    }

    /// Number of plies (and passes) played so far.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// The color whose turn it is. White moves on even turns.
    pub fn side_to_move(&self) -> PieceColor {
        PieceColor::for_turn(self.turn)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Returns `true` if `color` is past the queen deadline without having
    /// placed its queen bee.
    pub fn queen_overdue(&self, color: PieceColor) -> bool {
        self.turn >= QUEEN_DEADLINE_TURN && self.hand(color).has(PieceType::QueenBee)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Validates `mv` for the side to move and, if legal, plays it.
    ///
    /// On success returns the state after the move (which may be
    /// `Finished`). On error nothing has changed.
    pub fn apply(&mut self, mv: Move) -> Result<SessionState, LegalityError> {
        if self.is_finished() {
            return Err(LegalityError::GameOver);
        }

        let mover = self.side_to_move();
        if mv.piece.color != mover {
            return Err(LegalityError::NotYourPiece {
                piece: mv.piece.color,
                to_move: mover,
            });
        }

        if mv.is_placement() {
            self.check_placement(&mv)?;
            self.hand_mut(mover).take(mv.piece.piece_type);
            self.board.place(mv.piece.piece_type, mover, mv.destination);
        } else {
            let index = self.check_movement(&mv)?;
            self.board.relocate(index, mv.destination);
        }

        debug!(turn = self.turn, %mv, "move applied");
        self.consecutive_passes = 0;
        Ok(self.advance(mover))
    }

    /// Skips the turn of a side that has no legal action.
    ///
    /// Two forced passes in a row (neither side can act) end the game in a
    /// tie.
    pub fn pass(&mut self) -> Result<SessionState, LegalityError> {
        if self.is_finished() {
            return Err(LegalityError::GameOver);
        }
        if !self.legal_moves().is_empty() {
            return Err(LegalityError::CannotPass);
        }

        debug!(turn = self.turn, side = %self.side_to_move(), "forced pass");
        self.turn += 1;
        self.consecutive_passes += 1;
        if self.consecutive_passes >= PASSES_TO_TIE || self.turn_limit_reached() {
            self.state = SessionState::Finished(Outcome::Tie);
        }
        Ok(self.state)
    }

    /// Every legal action for the side to move: placements first (by piece
    /// type, then cell), then movements (by piece position, then cell).
    ///
    /// Empty once the game is finished.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_finished() {
            return Vec::new();
        }

        let mover = self.side_to_move();
        let overdue = self.queen_overdue(mover);
        let mut moves = Vec::new();

        let cells = available_to_place(&self.board, mover);
        for piece_type in self.hand(mover).available() {
            if overdue && piece_type != PieceType::QueenBee {
                continue;
            }
            moves.extend(
                cells.iter().map(|&cell| Move::place(piece_type, mover, cell)),
            );
        }

        if overdue {
            return moves;
        }

        let mut own: Vec<_> = self
            .board
            .tops()
            .filter(|p| p.color == mover)
            .copied()
            .collect();
        own.sort_by_key(|p| p.position);
        for piece in own {
            moves.extend(
                available_to_move(&self.board, &piece)
                    .into_iter()
                    .map(|dest| Move::relocate(piece, dest)),
            );
        }

        moves
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn hand_mut(&mut self, color: PieceColor) -> &mut Hand {
        match color {
            PieceColor::White => &mut self.white_hand,
            PieceColor::Black => &mut self.black_hand,
        }
    }

    fn turn_limit_reached(&self) -> bool {
        self.turn_limit.is_some_and(|limit| self.turn >= limit)
    }

    fn check_placement(&self, mv: &Move) -> Result<(), LegalityError> {
        let mover = mv.piece.color;
        let piece_type = mv.piece.piece_type;

        if self.queen_overdue(mover) && piece_type != PieceType::QueenBee {
            return Err(LegalityError::QueenDeadline);
        }
        if !self.hand(mover).has(piece_type) {
            return Err(LegalityError::HandExhausted(piece_type));
        }
        if !available_to_place(&self.board, mover).contains(&mv.destination) {
            return Err(LegalityError::IllegalPlacement(mv.destination));
        }
        Ok(())
    }

    fn check_movement(&self, mv: &Move) -> Result<PieceIndex, LegalityError> {
        let index = self
            .board
            .find_top(&mv.piece)
            .ok_or(LegalityError::PieceNotFound(mv.piece))?;

        if self.queen_overdue(mv.piece.color) {
            return Err(LegalityError::QueenDeadline);
        }
        if !stays_connected_without(&self.board, index) {
            return Err(LegalityError::HiveWouldSplit(mv.piece));
        }
        if !available_to_move(&self.board, &mv.piece).contains(&mv.destination) {
            return Err(LegalityError::IllegalMove {
                piece: mv.piece,
                destination: mv.destination,
            });
        }
        Ok(index)
    }

    /// Moves the turn forward and checks whether `mover`'s ply ended the
    /// game. Surrounding your own queen loses, even if it also surrounds
    /// the opponent's: that case is a tie.
    fn advance(&mut self, mover: PieceColor) -> SessionState {
        self.turn += 1;

        let own = queen_surrounded(&self.board, mover);
        let theirs = queen_surrounded(&self.board, mover.opponent());
        self.state = match (own, theirs) {
            (true, true) => SessionState::Finished(Outcome::Tie),
            (true, false) => {
                SessionState::Finished(Outcome::Winner(mover.opponent()))
            }
            (false, true) => SessionState::Finished(Outcome::Winner(mover)),
            (false, false) if self.turn_limit_reached() => {
                SessionState::Finished(Outcome::Tie)
            }
            (false, false) => SessionState::InProgress,
        };

        if let SessionState::Finished(outcome) = self.state {
            debug!(turn = self.turn, %outcome, "game finished");
        }
        self.state
    }
}

// =========================================================================
// Tests
// =========================================================================
