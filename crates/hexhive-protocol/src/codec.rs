//! Turning messages into frame payloads and back.
//!
//! Framing (where one message ends and the next begins) is the transport's
//! job. A [`Codec`] only ever sees the bytes of a single, complete message.
//! Keeping the two apart means the same codec works over length-prefixed
//! TCP and over WebSocket frames.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes any serde type into one message body and decodes it back.
///
/// The methods are generic over the message type, so one codec value
/// serves both directions: `encode::<ServerMessage>` on the server,
/// `decode::<ServerMessage>` on the client. `DeserializeOwned` means the
/// decoded value does not borrow from the frame, which is dropped right
/// after decoding.
///
/// `Send + Sync + 'static` lets a codec be cloned into spawned match tasks.
pub trait Codec: Send + Sync + 'static {
    /// # Errors
    /// [`ProtocolError::Encode`] if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// # Errors
    /// [`ProtocolError::Decode`] if the bytes are not a valid `T`:
    /// malformed, truncated, unknown `"type"` tag, missing fields.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// JSON message bodies via `serde_json`. Readable in a packet capture and
/// easy to speak from any language, which is what the wire format asks
/// for.
///
/// ```rust
/// use hexhive_protocol::{ClientMessage, Codec, JsonCodec, PlayerId};
///
/// let codec = JsonCodec;
/// let bytes = codec
///     .encode(&ClientMessage::Handshake { player_id: PlayerId(1) })
///     .unwrap();
/// assert_eq!(bytes, br#"{"type":"Handshake","player_id":1}"#);
///
/// let back: ClientMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(back, ClientMessage::Handshake { player_id: PlayerId(1) });
/// ```
///
/// Behind the `json` feature (on by default).
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
