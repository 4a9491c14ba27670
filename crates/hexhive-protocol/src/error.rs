//! Error types for the protocol layer.

use crate::{GameId, PlayerId};

/// A message that could not be encoded, decoded, or does not fit the
/// conversation.
///
/// All of these are fatal to the connection that produced them: the peer
/// is either broken or not speaking our protocol.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The bytes are not a valid message: malformed JSON, a missing field,
    /// an unknown `"type"`.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A well-formed message arrived where another was expected, e.g. a
    /// `PlayMove` before the handshake.
    #[error("unexpected message: expected {expected}, got {got}")]
    UnexpectedMessage {
        expected: &'static str,
        got: &'static str,
    },

    /// A move named a game the sender is not playing in.
    #[error("{player} sent a move for {got}, but plays in {expected}")]
    WrongGame {
        player: PlayerId,
        expected: GameId,
        got: GameId,
    },

    /// A player spoke while it was the opponent's turn.
    #[error("{player} sent {got} while the opponent is to move")]
    OutOfTurn { player: PlayerId, got: &'static str },
}
