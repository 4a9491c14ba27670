//! Session lifecycle: in progress or finished with an outcome.

use std::fmt;

use hexhive_engine::PieceColor;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// One side surrounded the other's queen.
    Winner(PieceColor),
    /// Both queens surrounded at once, or neither side could act.
    Tie,
}

impl Outcome {
    /// The winning color, if there is one.
    pub fn winner(self) -> Option<PieceColor> {
        match self {
            Self::Winner(color) => Some(color),
            Self::Tie => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Winner(color) => write!(f, "{color} wins"),
            Self::Tie => f.write_str("tie"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle state of a [`GameSession`](crate::GameSession).
///
/// There is exactly one transition, and it is one-way:
///
/// ```text
/// InProgress → Finished(outcome)
/// ```
///
/// Once finished, every further `apply`/`pass` is rejected with
/// [`LegalityError::GameOver`](crate::LegalityError::GameOver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    InProgress,
    Finished(Outcome),
}

impl SessionState {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::InProgress => None,
            Self::Finished(outcome) => Some(*outcome),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => f.write_str("InProgress"),
            Self::Finished(outcome) => write!(f, "Finished ({outcome})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_in_progress_has_no_outcome() {
        assert!(!SessionState::InProgress.is_finished());
        assert_eq!(SessionState::InProgress.outcome(), None);
    }

    #[test]
    fn test_session_state_finished_reports_winner() {
        let state = SessionState::Finished(Outcome::Winner(PieceColor::Black));
        assert!(state.is_finished());
        assert_eq!(
            state.outcome().and_then(Outcome::winner),
            Some(PieceColor::Black)
        );
    }

    #[test]
    fn test_session_state_display() {
        assert_eq!(SessionState::InProgress.to_string(), "InProgress");
        assert_eq!(
            SessionState::Finished(Outcome::Tie).to_string(),
            "Finished (tie)"
        );
        assert_eq!(
            SessionState::Finished(Outcome::Winner(PieceColor::White))
                .to_string(),
            "Finished (white wins)"
        );
    }
}
