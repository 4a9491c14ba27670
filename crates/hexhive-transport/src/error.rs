use std::io;

/// Errors that can occur in the transport layer.
///
/// Every variant is fatal to the connection it came from; there is no
/// retry at this level.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listening socket could not be opened.
    #[error("bind failed: {0}")]
    BindFailed(#[source] io::Error),

    /// Accepting (or upgrading) an incoming connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] io::Error),

    /// Dialing the server failed.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] io::Error),

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] io::Error),

    /// Reading a frame failed, including frames over the size limit.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] io::Error),
}

