//! Entity-deduplicating serializer.
//!
//! The first occurrence of each distinct entity is written positionally as
//! `{"&": alias, "_": [field, ...]}` and takes the next index in an
//! append-only table. Later occurrences of an equal entity are written as
//! `{"*": index}`. Entities are numbered once their fields have been
//! encoded, and the decoder numbers them once their fields have been decoded,
//! so both sides agree on every index as long as mapping keys are visited in
//! the same (sorted) order.

use std::collections::HashMap;

use quill_core::Value;
use serde_json::Map;

use crate::canonical::canonical_key;
use crate::error::SerialError;
use crate::wire::{
    build_entity, decode_primitive, encode_primitive, kind_of_alias, reference_index,
    reject_reserved, sorted_entries,
};
use crate::{Serializer, Sharing, Wire};

/// Key introducing a first occurrence (holds the alias).
pub const DEF_KEY: &str = "&";
/// Key holding the positional fields of a first occurrence.
pub const FIELDS_KEY: &str = "_";
/// Key of a back-reference (holds the table index).
pub const REF_KEY: &str = "*";

/// Serializer that deduplicates equal entities.
#[derive(Clone, Copy, Debug)]
pub struct DeduplicatingSerializer {
    sharing: Sharing,
}

impl DeduplicatingSerializer {
    /// Creates a serializer decoding back-references per `sharing`.
    pub fn new(sharing: Sharing) -> Self {
        Self { sharing }
    }

    /// Back-references decode to the shared first instance.
    pub fn shared() -> Self {
        Self::new(Sharing::Shared)
    }

    /// Back-references decode to independent deep copies.
    pub fn copying() -> Self {
        Self::new(Sharing::Copy)
    }
}

#[derive(Default)]
struct Encoder {
    table: HashMap<Vec<u8>, usize>,
}

impl Encoder {
    fn encode(&mut self, value: &Value) -> Result<Wire, SerialError> {
        match value {
            Value::List(items) => items
                .iter()
                .map(|v| self.encode(v))
                .collect::<Result<Vec<_>, _>>()
                .map(Wire::Array),
            Value::Map(entries) => {
                reject_reserved(entries, &[REF_KEY, DEF_KEY])?;
                let mut obj = Map::new();
                for (k, v) in entries.iter() {
                    obj.insert(k.clone(), self.encode(v)?);
                }
                Ok(Wire::Object(obj))
            }
            Value::Entity(entity) => {
                let key = canonical_key(value)?;
                if let Some(&index) = self.table.get(&key) {
                    return Ok(reference(index));
                }
                let fields = entity
                    .fields()
                    .into_iter()
                    .map(|f| self.encode(f))
                    .collect::<Result<Vec<_>, _>>()?;
                let index = self.table.len();
                self.table.insert(key, index);
                Ok(definition(entity.kind().alias(), fields))
            }
            Value::Null | Value::Int(_) | Value::Str(_) => Ok(encode_primitive(value)),
        }
    }
}

struct Decoder {
    table: Vec<Value>,
    sharing: Sharing,
}

impl Decoder {
    fn decode(&mut self, wire: &Wire) -> Result<Value, SerialError> {
        match wire {
            Wire::Array(items) => items
                .iter()
                .map(|w| self.decode(w))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::list),
            Wire::Object(obj) => {
                if let Some(target) = obj.get(REF_KEY) {
                    return lookup(&self.table, target, self.sharing);
                }
                if let Some(alias) = obj.get(DEF_KEY) {
                    let kind = kind_of_alias(alias)?;
                    let fields = positional_fields(obj)?
                        .iter()
                        .map(|w| self.decode(w))
                        .collect::<Result<Vec<_>, _>>()?;
                    let entity = build_entity(kind, fields)?;
                    self.table.push(entity.clone());
                    return Ok(entity);
                }
                let mut entries = Vec::with_capacity(obj.len());
                for (k, v) in sorted_entries(obj) {
                    entries.push((k.clone(), self.decode(v)?));
                }
                Ok(Value::map(entries))
            }
            _ => decode_primitive(wire),
        }
    }
}

/// Builds a `{"*": index}` back-reference.
pub(crate) fn reference(index: usize) -> Wire {
    let mut obj = Map::new();
    obj.insert(REF_KEY.to_string(), Wire::from(index));
    Wire::Object(obj)
}

/// Builds a `{"&": alias, "_": fields}` first occurrence.
pub(crate) fn definition(alias: &str, fields: Vec<Wire>) -> Wire {
    let mut obj = Map::new();
    obj.insert(DEF_KEY.to_string(), Wire::from(alias));
    obj.insert(FIELDS_KEY.to_string(), Wire::Array(fields));
    Wire::Object(obj)
}

/// Reads the positional field array of a first occurrence.
pub(crate) fn positional_fields(obj: &Map<String, Wire>) -> Result<&Vec<Wire>, SerialError> {
    obj.get(FIELDS_KEY)
        .and_then(Wire::as_array)
        .ok_or_else(|| SerialError::UnsupportedWire {
            found: "entity definition without a positional field array".to_string(),
        })
}

/// Resolves a back-reference against the decode-order table.
pub(crate) fn lookup(table: &[Value], target: &Wire, sharing: Sharing) -> Result<Value, SerialError> {
    let index = reference_index(target)?;
    let value = usize::try_from(index)
        .ok()
        .and_then(|i| table.get(i))
        .ok_or(SerialError::DanglingReference {
            index,
            len: table.len(),
        })?;
    Ok(match sharing {
        Sharing::Shared => value.clone(),
        Sharing::Copy => value.deep_copy(),
    })
}

impl Serializer for DeduplicatingSerializer {
    fn encode(&self, value: &Value) -> Result<Wire, SerialError> {
        Encoder::default().encode(value)
    }

    fn decode(&self, wire: &Wire) -> Result<Value, SerialError> {
        Decoder {
            table: Vec::new(),
            sharing: self.sharing,
        }
        .decode(wire)
    }
}
