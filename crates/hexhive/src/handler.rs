//! Accept loop and handshake.
//!
//! Every accepted connection gets its own short-lived task that waits for
//! the `Handshake` message, registers the player and hands the connection
//! to the pairing loop over a channel. The accept loop itself never
//! awaits a client, so one slow peer cannot stall the others.

use std::sync::Arc;
use std::time::Duration;

use hexhive_protocol::{ClientMessage, Codec, PlayerId, ProtocolError};
use hexhive_transport::{Connection, Transport};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::HexhiveError;
use crate::server::Shared;

/// A connection that has identified itself.
pub(crate) type Arrival<C> = (PlayerId, C);

/// Accepts connections until `shutdown` fires.
///
/// Accept errors are logged and skipped: a single failed upgrade must not
/// take the listener down.
pub(crate) async fn accept_loop<T, K>(
    mut transport: T,
    codec: K,
    shared: Arc<Shared>,
    handshake_timeout: Duration,
    arrivals: mpsc::Sender<Arrival<T::Connection>>,
    shutdown: CancellationToken,
) where
    T: Transport,
    K: Codec + Clone,
{
    loop {
        let conn = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = transport.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                    continue;
                }
            },
        };

        let codec = codec.clone();
        let shared = Arc::clone(&shared);
        let arrivals = arrivals.clone();
        tokio::spawn(async move {
            let conn_id = conn.id();
            match perform_handshake(&conn, &codec, handshake_timeout).await {
                Ok(player_id) => {
                    shared.players.lock().await.register(player_id, conn_id);
                    tracing::info!(%conn_id, %player_id, "player connected");
                    // Fails only once the server has stopped; dropping the
                    // connection closes it.
                    let _ = arrivals.send((player_id, conn)).await;
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "handshake failed");
                    let _ = conn.close().await;
                }
            }
        });
    }

    tracing::debug!("accept loop stopped");
}

/// Waits for the first message and checks that it is a `Handshake`.
pub(crate) async fn perform_handshake<C, K>(
    conn: &C,
    codec: &K,
    limit: Duration,
) -> Result<PlayerId, HexhiveError>
where
    C: Connection,
    K: Codec,
{
    let frame = tokio::time::timeout(limit, conn.recv())
        .await
        .map_err(|_| HexhiveError::Timeout("handshake"))??
        .ok_or(HexhiveError::Disconnected)?;

    match codec.decode::<ClientMessage>(&frame)? {
        ClientMessage::Handshake { player_id } => Ok(player_id),
        other => Err(ProtocolError::UnexpectedMessage {
            expected: "Handshake",
            got: other.kind(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexhive_protocol::{GameId, JsonCodec};
    use hexhive_transport::{TcpConnection, TcpTransport};

    async fn pair() -> (TcpConnection, TcpConnection) {
        let mut transport = TcpTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();
        let client = tokio::spawn(TcpConnection::connect(addr));
        let server = transport.accept().await.unwrap();
        (server, client.await.unwrap().unwrap())
    }

    #[tokio::test]
    async fn test_perform_handshake_returns_player_id() {
        let (server, client) = pair().await;
        let frame = JsonCodec
            .encode(&ClientMessage::Handshake {
                player_id: PlayerId(42),
            })
            .unwrap();
        client.send(&frame).await.unwrap();

        let id = perform_handshake(&server, &JsonCodec, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(id, PlayerId(42));
    }

    #[tokio::test]
    async fn test_perform_handshake_rejects_play_move_first() {
        let (server, client) = pair().await;
        let frame = JsonCodec
            .encode(&ClientMessage::PlayMove {
                game_id: GameId(1),
                mv: hexhive_engine::Move::place(
                    hexhive_engine::PieceType::QueenBee,
                    hexhive_engine::PieceColor::White,
                    hexhive_engine::Position::ORIGIN,
                ),
            })
            .unwrap();
        client.send(&frame).await.unwrap();

        let err = perform_handshake(&server, &JsonCodec, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HexhiveError::Protocol(ProtocolError::UnexpectedMessage {
                expected: "Handshake",
                got: "PlayMove",
            })
        ));
    }

    #[tokio::test]
    async fn test_perform_handshake_silent_client_times_out() {
        let (server, _client) = pair().await;
        let err = perform_handshake(&server, &JsonCodec, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, HexhiveError::Timeout("handshake")));
    }

    #[tokio::test]
    async fn test_perform_handshake_closed_client_is_disconnected() {
        let (server, client) = pair().await;
        client.close().await.unwrap();
        drop(client);

        let err = perform_handshake(&server, &JsonCodec, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, HexhiveError::Disconnected));
    }
}
