//! Error types for encoding and decoding annotation graphs.

/// Errors raised while converting between values and wire trees.
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    /// A wire node names an entity alias that is not registered.
    #[error("unknown entity alias '{alias}'")]
    UnknownAlias {
        /// The alias found on the wire.
        alias: String,
    },

    /// An entity's fields on the wire do not match its declared layout.
    #[error("field mismatch for {kind}: {reason}")]
    FieldMismatch {
        /// Structural name of the entity variant.
        kind: &'static str,
        /// What was wrong with the fields.
        reason: String,
    },

    /// A user mapping uses a key reserved by the wire format.
    #[error("mapping key '{key}' is reserved by the wire format")]
    ReservedKey {
        /// The offending key.
        key: String,
    },

    /// A wire node has a shape no value can be built from.
    #[error("unsupported wire node: {found}")]
    UnsupportedWire {
        /// Description of the node.
        found: String,
    },

    /// A back-reference points past the end of the decode table.
    #[error("back-reference {index} is out of range (table has {len} entries)")]
    DanglingReference {
        /// The referenced index.
        index: u64,
        /// Number of entries decoded so far.
        len: usize,
    },

    /// The canonical encoding of a value could not be computed.
    #[error("canonical encoding failed: {reason}")]
    Canonical {
        /// Description of the failure.
        reason: String,
    },
}
