//! Transport abstraction layer for Hexhive.
//!
//! A transport hands out [`Connection`]s; a connection moves whole frames
//! (one encoded message each) in both directions. What a frame contains is
//! the protocol layer's business.
//!
//! Two implementations:
//!
//! - [`TcpTransport`]: raw TCP, each frame prefixed with its length as a
//!   big-endian `u32`. Always available.
//! - [`WebSocketTransport`]: one binary WebSocket message per frame.
//!   Behind the `websocket` feature (on by default).
//!
//! # Why `impl Future + Send` instead of `async fn`
//!
//! The server spawns one Tokio task per match, and that task awaits
//! connection methods of a *generic* connection type. `tokio::spawn`
//! requires the whole task future to be `Send`, which the compiler can
//! only prove if the trait promises it. Writing the trait methods as
//! `fn ... -> impl Future<Output = ...> + Send` makes that promise;
//! implementations can still be written with plain `async fn`.

mod error;
mod tcp;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use tcp::{MAX_FRAME_LEN, TcpConnection, TcpTransport};
#[cfg(feature = "websocket")]
pub use websocket::{UPGRADE_TIMEOUT, WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counter, shared by every transport so IDs never collide.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates a fresh, never-before-used ID.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;

    /// Waits for and accepts the next incoming connection.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;

    /// The address actually bound (useful after binding port 0).
    fn local_addr(&self) -> Result<SocketAddr, TransportError>;
}

/// A single connection that sends and receives whole frames.
///
/// Sending and receiving use separate locks, so one task may wait in
/// `recv` while another sends on the same connection.
pub trait Connection: Send + Sync + 'static {
    /// Sends one frame to the remote peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    /// Cancel-safe: dropping the future before it completes loses no data.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// Closes the connection. Closing twice is not an error.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
