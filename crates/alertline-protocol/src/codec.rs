//! Codec trait and implementations for serializing/deserializing frames.
//!
//! The session layer never touches bytes directly; it asks a [`Codec`] to
//! turn a [`Frame`](crate::Frame) into bytes and back. [`JsonCodec`] is the
//! only implementation today and matches what browser clients speak.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use alertline_protocol::{ChannelEvent, Codec, Frame, JsonCodec};
///
/// let codec = JsonCodec;
/// let frame: Frame = codec.decode(br#"{"event":"DEBUG","data":{"x":1}}"#).unwrap();
/// let event = ChannelEvent::from(frame);
/// assert_eq!(event.kind(), "DEBUG");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Frame;

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result: Result<Frame, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_produces_compact_json() {
        let frame = Frame::new("REGISTER", serde_json::json!({"code": "Z"}));
        let bytes = JsonCodec.encode(&frame).unwrap();
        assert_eq!(bytes, br#"{"event":"REGISTER","data":{"code":"Z"}}"#);
    }
}
