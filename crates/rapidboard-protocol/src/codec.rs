//! Codec trait and implementations for serializing/deserializing values.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The HTTP service decodes response and error bodies through it and
//! doesn't care HOW the bytes look, only that something implements
//! [`Codec`].

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// - `Send + Sync` → shareable between Tokio tasks.
/// - `'static` → owns everything it needs, so it can live inside
///   long-lived services and stores.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// The leaderboard backend speaks JSON, and a JSON identity file is easy
/// to inspect by hand when debugging a guest that "lost" its id.
///
/// ## Example
///
/// ```rust
/// use rapidboard_protocol::{Codec, JsonCodec, ScoreEntry};
///
/// let codec = JsonCodec;
/// let entry = ScoreEntry { rank: 1, name: "ada".into(), score: 100 };
///
/// let bytes = codec.encode(&entry).unwrap();
/// let decoded: ScoreEntry = codec.decode(&bytes).unwrap();
/// assert_eq!(entry, decoded);
/// ```
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
