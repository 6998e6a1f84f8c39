//! Codec trait for turning persisted records into bytes and back.
//!
//! Session markers are written to disk so an operator can see what was
//! running before an unclean restart. The marker store doesn't care HOW a
//! record is serialized; it just needs something that implements
//! [`Codec`]. We ship [`JsonCodec`]: markers stay human-readable and can be
//! inspected or fixed by hand.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back to values.
///
/// `Send + Sync + 'static` so a store holding a codec can live inside the
/// engine task. The methods are generic: any `Serialize` value can be
/// encoded and any `DeserializeOwned` value decoded. `DeserializeOwned`
/// means the decoded value owns its data, so the read buffer can be
/// dropped right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that writes pretty-printed JSON (via `serde_json`).
///
/// ```rust
/// use wayforge_protocol::{Codec, JsonCodec, Location};
///
/// let codec = JsonCodec;
/// let loc = Location::new("world", 100.5, 70.0, 100.5);
///
/// let bytes = codec.encode(&loc).unwrap();
/// let back: Location = codec.decode(&bytes).unwrap();
/// assert_eq!(loc, back);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec_pretty(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Notice, ParticipantId};

    #[test]
    fn test_json_codec_decode_garbage_returns_decode_error() {
        let result: Result<Notice, _> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_output_is_readable() {
        let bytes = JsonCodec
            .encode(&Notice::RequestDenied { target: ParticipantId(9) })
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"RequestDenied\""));
        assert!(text.contains("\"target\": 9"));
    }
}
