//! Turn-by-turn game state for Hexhive.
//!
//! Wraps the rule engine in a state machine that owns the board, both
//! hands and the turn counter, validates each submitted move, and decides
//! when the game is over.
//!
//! # Key types
//!
//! - [`GameSession`]: one game, from empty board to outcome
//! - [`Hand`]: pieces a side has not placed yet
//! - [`SessionState`]: in progress, or finished with an [`Outcome`]
//! - [`LegalityError`]: why a move was refused

mod error;
mod hand;
mod session;
mod state;

pub use error::LegalityError;
pub use hand::Hand;
pub use session::{GameSession, QUEEN_DEADLINE_TURN};
pub use state::{Outcome, SessionState};
