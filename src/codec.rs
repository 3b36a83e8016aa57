//! Serialization seam for persisted collection state
//!
//! The codec turns a [`CollectionState`] into the opaque bytes stored at
//! the collection key and back. Exactly one encode pass happens per
//! persistence operation, regardless of backend; adapters must not wrap
//! the payload in a second serialization layer.

use crate::collection::CollectionState;
use crate::error::Result;

/// Encodes and decodes the full persisted state of a collection
///
/// Implementations must round-trip every persisted field exactly:
/// identity, ordering configuration, the entry sequence (including order)
/// and the entry count. `decode` must return a state whose derived id
/// index has been rebuilt (see [`CollectionState::reindex`]).
pub trait Codec: Send + Sync {
    /// Serialize the full state to bytes
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Codec`] if serialization fails.
    fn encode(&self, state: &CollectionState) -> Result<Vec<u8>>;

    /// Reconstruct a state from bytes produced by `encode`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Codec`] on malformed input.
    fn decode(&self, bytes: &[u8]) -> Result<CollectionState>;

    /// Short identifier of the wire format, for diagnostics
    fn codec_id(&self) -> &str;
}

/// Default codec: MessagePack with named fields
///
/// Field names travel with the payload, so the format is self-describing
/// and a blob can be decoded without external schema lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgpackCodec;

impl Codec for MsgpackCodec {
    fn encode(&self, state: &CollectionState) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(state)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<CollectionState> {
        let mut state: CollectionState = rmp_serde::from_slice(bytes)?;
        state.reindex();
        Ok(state)
    }

    fn codec_id(&self) -> &str {
        "msgpack"
    }
}
