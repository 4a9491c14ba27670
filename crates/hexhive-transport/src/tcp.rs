//! Length-prefixed frames over plain TCP.
//!
//! Every frame on the wire is a 4-byte big-endian length followed by that
//! many bytes of payload:
//!
//! ```text
//! ┌──────────────┬──────────────────────────────┐
//! │ len: u32 (BE)│ payload (len bytes)          │
//! └──────────────┴──────────────────────────────┘
//! ```
//!
//! `tokio_util`'s `LengthDelimitedCodec` does the splitting and joining, so
//! a frame that arrives in several TCP segments (or several frames in one
//! segment) is still delivered as exactly one `recv` result.

use std::net::SocketAddr;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;
use tokio_util::bytes::Bytes;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tracing::{debug, info};

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Largest accepted frame payload (1 MiB). A peer announcing a longer
/// frame gets a receive error instead of an unbounded allocation.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

type FramedTcp = Framed<TcpStream, LengthDelimitedCodec>;

fn frame_codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(4)
        .big_endian()
        .max_frame_length(MAX_FRAME_LEN)
        .new_codec()
}

// ---------------------------------------------------------------------------
// TcpTransport
// ---------------------------------------------------------------------------

/// Listens for TCP connections and frames them.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Binds to `addr`. Use port 0 to let the OS pick, then read the
    /// result back with [`Transport::local_addr`].
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        if let Ok(local) = listener.local_addr() {
            info!(%local, "TCP transport listening");
        }
        Ok(Self { listener })
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;

    async fn accept(&mut self) -> Result<TcpConnection, TransportError> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        let conn = TcpConnection::from_stream(stream, peer);
        debug!(id = %conn.id, %peer, "accepted TCP connection");
        Ok(conn)
    }

    fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener
            .local_addr()
            .map_err(TransportError::BindFailed)
    }
}

// ---------------------------------------------------------------------------
// TcpConnection
// ---------------------------------------------------------------------------

/// One framed TCP stream, either accepted by [`TcpTransport`] or dialed
/// with [`TcpConnection::connect`].
pub struct TcpConnection {
    id: ConnectionId,
    peer: SocketAddr,
    writer: Mutex<SplitSink<FramedTcp, Bytes>>,
    reader: Mutex<SplitStream<FramedTcp>>,
}

impl TcpConnection {
    /// Dials a Hexhive server.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(TransportError::ConnectFailed)?;
        let peer = stream.peer_addr().map_err(TransportError::ConnectFailed)?;
        debug!(%peer, "connected over TCP");
        Ok(Self::from_stream(stream, peer))
    }

    fn from_stream(stream: TcpStream, peer: SocketAddr) -> Self {
        // Frames are small and latency matters more than throughput.
        if let Err(e) = stream.set_nodelay(true) {
            debug!(%peer, error = %e, "could not disable Nagle");
        }
        let (writer, reader) = Framed::new(stream, frame_codec()).split();
        Self {
            id: ConnectionId::next(),
            peer,
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
        }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Connection for TcpConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        self.writer
            .lock()
            .await
            .send(Bytes::copy_from_slice(data))
            .await
            .map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.reader.lock().await.next().await {
            Some(Ok(frame)) => Ok(Some(frame.to_vec())),
            Some(Err(e)) => Err(TransportError::ReceiveFailed(e)),
            None => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.writer
            .lock()
            .await
            .close()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
