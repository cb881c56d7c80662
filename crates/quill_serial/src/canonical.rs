//! Canonical byte encoding used as the deduplication key.
//!
//! Two values get the same key exactly when they are structurally equal:
//! the encoding is the compact binary form of the value's variant tags and
//! contents, with mapping entries in sorted key order. Physical identity
//! plays no part, so independently built equal entities collapse into one
//! table entry.

use quill_core::Value;

use crate::error::SerialError;

/// Returns the canonical byte encoding of `value`.
pub fn canonical_key(value: &Value) -> Result<Vec<u8>, SerialError> {
    bincode::serde::encode_to_vec(value, bincode::config::standard()).map_err(|e| {
        SerialError::Canonical {
            reason: e.to_string(),
        }
    })
}
