//! Unified error type for the Hexhive server and client.

use hexhive_protocol::ProtocolError;
use hexhive_session::LegalityError;
use hexhive_transport::TransportError;

/// Top-level error wrapping the lower crates' errors plus the failures
/// that only make sense once there is a match: a peer vanishing, a
/// deadline passing, the server going down.
#[derive(Debug, thiserror::Error)]
pub enum HexhiveError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, unexpected message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session refused an action the server itself initiated.
    #[error(transparent)]
    Rules(#[from] LegalityError),

    /// The peer closed its connection.
    #[error("peer disconnected")]
    Disconnected,

    /// Nothing arrived in time. The payload names what was awaited.
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    /// The server is shutting down.
    #[error("server shutting down")]
    Shutdown,

    /// The server aborted the match this client was playing.
    #[error("match aborted: {0}")]
    Aborted(String),

    /// The engine found nothing to play although the server says it is
    /// our turn.
    #[error("engine produced no move")]
    NoMove,
}
