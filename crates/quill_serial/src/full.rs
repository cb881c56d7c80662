//! Serializer that deduplicates every node.
//!
//! Same wire shapes as [`crate::dedup`], but sequences, mappings, strings,
//! integers and nulls all take table slots too, so any repeated subtree
//! becomes a `{"*": index}` back-reference. The positional field array of an
//! entity definition is not itself a node and gets no slot.

use std::collections::HashMap;

use quill_core::Value;
use serde_json::Map;

use crate::canonical::canonical_key;
use crate::dedup::{definition, lookup, positional_fields, reference, DEF_KEY, REF_KEY};
use crate::error::SerialError;
use crate::wire::{
    build_entity, decode_primitive, encode_primitive, kind_of_alias, reject_reserved,
    sorted_entries,
};
use crate::{Serializer, Sharing, Wire};

/// Serializer that deduplicates containers and leaves as well as entities.
#[derive(Clone, Copy, Debug)]
pub struct FullyDeduplicatingSerializer {
    sharing: Sharing,
}

impl FullyDeduplicatingSerializer {
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
        let key = canonical_key(value)?;
        if let Some(&index) = self.table.get(&key) {
            return Ok(reference(index));
        }
        let wire = self.encode_node(value)?;
        let index = self.table.len();
        self.table.insert(key, index);
        Ok(wire)
    }

    fn encode_node(&mut self, value: &Value) -> Result<Wire, SerialError> {
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
                let fields = entity
                    .fields()
                    .into_iter()
                    .map(|f| self.encode(f))
                    .collect::<Result<Vec<_>, _>>()?;
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
        if let Some(target) = wire.as_object().and_then(|obj| obj.get(REF_KEY)) {
            return lookup(&self.table, target, self.sharing);
        }
        let value = self.decode_node(wire)?;
        self.table.push(value.clone());
        Ok(value)
    }

    fn decode_node(&mut self, wire: &Wire) -> Result<Value, SerialError> {
        match wire {
            Wire::Array(items) => items
                .iter()
                .map(|w| self.decode(w))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::list),
            Wire::Object(obj) => {
                if let Some(alias) = obj.get(DEF_KEY) {
                    let kind = kind_of_alias(alias)?;
                    let fields = positional_fields(obj)?
                        .iter()
                        .map(|w| self.decode(w))
                        .collect::<Result<Vec<_>, _>>()?;
                    return build_entity(kind, fields);
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

impl Serializer for FullyDeduplicatingSerializer {
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

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{Goal, Hypothesis, Text};
    use serde_json::json;

    #[test]
    fn repeated_leaves_become_references() {
        let v = Value::list(vec![Value::from("x"), Value::from("x"), Value::Int(7)]);
        let wire = FullyDeduplicatingSerializer::shared().encode(&v).unwrap();
        assert_eq!(wire, json!(["x", {"*": 0}, 7]));
    }

    #[test]
    fn repeated_lists_become_references() {
        let inner = || Value::list(vec![Value::Int(1)]);
        let v = Value::list(vec![inner(), inner()]);
        let wire = FullyDeduplicatingSerializer::shared().encode(&v).unwrap();
        // 1 -> slot 0, [1] -> slot 1.
        assert_eq!(wire, json!([[1], {"*": 1}]));
    }

    #[test]
    fn field_array_takes_no_slot() {
        let v = Value::list(vec![
            Value::from(Text::new("a")),
            Value::from("a"),
            Value::from(Text::new("a")),
        ]);
        let wire = FullyDeduplicatingSerializer::shared().encode(&v).unwrap();
        // "a" -> slot 0, text("a") -> slot 1.
        assert_eq!(wire, json!([{"&": "text", "_": ["a"]}, {"*": 0}, {"*": 1}]));
    }

    #[test]
    fn decoder_indices_follow_sorted_keys() {
        // Keys on disk are in reverse order; numbering must still follow
        // "a" (slot 0: "v") before "z" (a reference to it).
        let wire = json!({"z": {"*": 0}, "a": "v"});
        let decoded = FullyDeduplicatingSerializer::shared().decode(&wire).unwrap();
        assert_eq!(decoded, Value::map(vec![("a", Value::from("v")), ("z", Value::from("v"))]));
    }

    #[test]
    fn mixed_nesting_roundtrips_with_sharing() {
        let goal = || Value::from(Goal::new(None, "True", vec![Hypothesis::new(&["H"], None, "True")]));
        let v = Value::map(vec![
            ("first", Value::list(vec![goal(), goal()])),
            ("second", goal()),
        ]);
        let s = FullyDeduplicatingSerializer::shared();
        let decoded = s.decode(&s.encode(&v).unwrap()).unwrap();
        assert_eq!(decoded, v);
        let entries = decoded.as_map().unwrap();
        let first = entries["first"].as_list().unwrap();
        assert!(first[0].same_instance(&first[1]));
        assert!(first[0].same_instance(&entries["second"]));
    }

    #[test]
    fn copying_decode_breaks_sharing() {
        let inner = || Value::list(vec![Value::from(Text::new("t"))]);
        let v = Value::list(vec![inner(), inner()]);
        let s = FullyDeduplicatingSerializer::copying();
        let decoded = s.decode(&s.encode(&v).unwrap()).unwrap();
        let items = decoded.as_list().unwrap();
        assert_eq!(items[0], items[1]);
        assert!(!items[0].same_instance(&items[1]));
    }

    #[test]
    fn reference_past_table_end_is_an_error() {
        let wire = json!(["a", {"*": 1}]);
        assert!(matches!(
            FullyDeduplicatingSerializer::shared().decode(&wire),
            Err(SerialError::DanglingReference { index: 1, len: 1 })
        ));
    }
}
