//! Structural serializers for annotation graphs.
//!
//! Three interchangeable encodings turn a [`Value`] into a wire tree made only
//! of primitives, arrays and objects ([`Wire`]) and back:
//!
//! - [`PlainSerializer`]: readable; entities become objects tagged with
//!   `"_type"` and keyed by field name.
//! - [`DeduplicatingSerializer`]: entities are written positionally as
//!   `{"&": alias, "_": [...]}` the first time and as `{"*": index}`
//!   back-references afterwards.
//! - [`FullyDeduplicatingSerializer`]: every node, containers and leaves
//!   included, may become a back-reference.
//!
//! Deduplication is by content: two independently built but equal values
//! share one table entry.

#![warn(missing_docs)]

pub mod canonical;
pub mod dedup;
pub mod error;
pub mod full;
pub mod plain;
mod wire;

use std::fmt;
use std::str::FromStr;

use quill_core::Value;

pub use dedup::DeduplicatingSerializer;
pub use error::SerialError;
pub use full::FullyDeduplicatingSerializer;
pub use plain::PlainSerializer;

/// The wire tree: JSON-shaped data with no custom types.
pub type Wire = serde_json::Value;

/// Converts values to wire trees and back.
pub trait Serializer {
    /// Encodes a value into a wire tree.
    fn encode(&self, value: &Value) -> Result<Wire, SerialError>;

    /// Decodes a wire tree produced by [`Serializer::encode`].
    fn decode(&self, wire: &Wire) -> Result<Value, SerialError>;
}

/// What a decoder returns for a back-reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sharing {
    /// Every back-reference yields the one instance decoded first.
    Shared,
    /// Every back-reference yields an independent deep copy.
    Copy,
}

/// Selects one of the serializer variants by name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SerializerKind {
    /// [`PlainSerializer`].
    #[default]
    Plain,
    /// [`DeduplicatingSerializer`].
    Deduplicating,
    /// [`FullyDeduplicatingSerializer`].
    FullyDeduplicating,
}

impl SerializerKind {
    /// All variants.
    pub const ALL: [SerializerKind; 3] = [
        SerializerKind::Plain,
        SerializerKind::Deduplicating,
        SerializerKind::FullyDeduplicating,
    ];

    /// The tag used in configuration files and on the command line.
    pub fn tag(self) -> &'static str {
        match self {
            SerializerKind::Plain => "plain",
            SerializerKind::Deduplicating => "dedup",
            SerializerKind::FullyDeduplicating => "full-dedup",
        }
    }

    /// Instantiates the serializer, decoding back-references per `sharing`.
    pub fn build(self, sharing: Sharing) -> Box<dyn Serializer> {
        match self {
            SerializerKind::Plain => Box::new(PlainSerializer),
            SerializerKind::Deduplicating => Box::new(DeduplicatingSerializer::new(sharing)),
            SerializerKind::FullyDeduplicating => {
                Box::new(FullyDeduplicatingSerializer::new(sharing))
            }
        }
    }
}

impl fmt::Display for SerializerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SerializerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.tag() == s)
            .ok_or_else(|| format!("unknown serializer '{s}' (use plain, dedup, or full-dedup)"))
    }
}
