//! Rule engine for Hexhive.
//!
//! A pure, synchronous library: no I/O, no async, no logging. Given a
//! [`Board`], it answers two questions for the side to move:
//!
//! - where may a new piece be placed? → [`available_to_place`]
//! - where may this placed piece go? → [`available_to_move`]
//!
//! # Key types
//!
//! - [`Position`]: a cell on the unbounded hex grid
//! - [`Piece`]: one tile, in hand or on the board
//! - [`Move`]: a placement or a relocation submitted by a player
//! - [`Board`]: every placed piece plus per-cell stacks

mod board;
mod connectivity;
mod geometry;
mod movegen;
mod piece;

pub use board::{Board, PieceIndex};
pub use connectivity::{is_connected, stays_connected_without};
pub use geometry::{DIRECTIONS, Position, direction_between};
pub use movegen::{
    available_to_move, available_to_place, is_surrounded, queen_surrounded,
};
pub use piece::{Move, Piece, PieceColor, PieceType};
