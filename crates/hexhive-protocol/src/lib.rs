//! Wire protocol for Hexhive.
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`StatusUpdate`],
//!   [`GameState`]): what players and server say to each other.
//! - **Codec** ([`Codec`], [`JsonCodec`]): how one message becomes one
//!   frame body.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol knows nothing about sockets. It sits between the
//! transport, which moves whole frames, and the server, which runs games:
//!
//! ```text
//! Transport (frames) → Protocol (messages) → Server (players, games)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, FailureKind, GameFailed, GameFinished, GameId, GameState,
    PlayerId, ServerMessage, StatusUpdate,
};
