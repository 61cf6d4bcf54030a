//! Conversion between JSON values and their stored byte form.
//!
//! Objects are emitted with sorted keys (`serde_json`'s default map), so a
//! document encodes to the same bytes regardless of the order the caller
//! sent its keys in.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;

/// Serialize a value to its stored byte form.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if the value cannot be represented as JSON
/// (for example a map with non-string keys).
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(CodecError::Encode)
}

/// Deserialize stored bytes.
///
/// Absent and empty input both decode to `Ok(None)`: a document created
/// without a body has nothing to decode.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if the bytes are non-empty and not valid
/// JSON for `T`.
pub fn decode<T: DeserializeOwned>(bytes: Option<&[u8]>) -> Result<Option<T>, CodecError> {
    match bytes {
        None | Some([]) => Ok(None),
        Some(raw) => serde_json::from_slice(raw).map(Some).map_err(CodecError::Decode),
    }
}
