//! Human-readable serializer.
//!
//! Entities become objects whose first key is `"_type"` (the wire alias),
//! followed by one entry per field, by name, in declared order. Nothing is
//! shared: repeated entities are written out in full each time.

use quill_core::{EntityKind, Value};
use serde_json::Map;

use crate::error::SerialError;
use crate::wire::{build_entity, decode_primitive, encode_primitive, kind_of_alias, reject_reserved};
use crate::{Serializer, Wire};

/// Key holding the entity alias in plain-encoded objects.
pub const TYPE_KEY: &str = "_type";

/// The readable, non-deduplicating serializer.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainSerializer;

impl PlainSerializer {
    fn encode_value(value: &Value) -> Result<Wire, SerialError> {
        match value {
            Value::List(items) => items
                .iter()
                .map(Self::encode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Wire::Array),
            Value::Map(entries) => {
                reject_reserved(entries, &[TYPE_KEY])?;
                let mut obj = Map::new();
                for (k, v) in entries.iter() {
                    obj.insert(k.clone(), Self::encode_value(v)?);
                }
                Ok(Wire::Object(obj))
            }
            Value::Entity(entity) => {
                let kind = entity.kind();
                let mut obj = Map::new();
                obj.insert(TYPE_KEY.to_string(), Wire::from(kind.alias()));
                for (name, field) in kind.field_names().iter().zip(entity.fields()) {
                    obj.insert((*name).to_string(), Self::encode_value(field)?);
                }
                Ok(Wire::Object(obj))
            }
            Value::Null | Value::Int(_) | Value::Str(_) => Ok(encode_primitive(value)),
        }
    }

    fn decode_value(wire: &Wire) -> Result<Value, SerialError> {
        match wire {
            Wire::Array(items) => items
                .iter()
                .map(Self::decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::list),
            Wire::Object(obj) => match obj.get(TYPE_KEY) {
                // A null or empty alias marks a plain mapping.
                None | Some(Wire::Null) => Self::decode_map(obj),
                Some(Wire::String(alias)) if alias.is_empty() => Self::decode_map(obj),
                Some(alias) => Self::decode_entity(kind_of_alias(alias)?, obj),
            },
            _ => decode_primitive(wire),
        }
    }

    fn decode_map(obj: &Map<String, Wire>) -> Result<Value, SerialError> {
        let mut entries = Vec::with_capacity(obj.len());
        for (k, v) in obj.iter().filter(|(k, _)| k.as_str() != TYPE_KEY) {
            entries.push((k.clone(), Self::decode_value(v)?));
        }
        Ok(Value::map(entries))
    }

    fn decode_entity(kind: EntityKind, obj: &Map<String, Wire>) -> Result<Value, SerialError> {
        let names = kind.field_names();
        if let Some(extra) = obj
            .keys()
            .find(|k| k.as_str() != TYPE_KEY && !names.contains(&k.as_str()))
        {
            return Err(SerialError::FieldMismatch {
                kind: kind.name(),
                reason: format!("unexpected field '{extra}'"),
            });
        }
        let mut fields = Vec::with_capacity(names.len());
        for name in names {
            let wire = obj.get(*name).ok_or_else(|| SerialError::FieldMismatch {
                kind: kind.name(),
                reason: format!("missing field '{name}'"),
            })?;
            fields.push(Self::decode_value(wire)?);
        }
        build_entity(kind, fields)
    }
}

impl Serializer for PlainSerializer {
    fn encode(&self, value: &Value) -> Result<Wire, SerialError> {
        Self::encode_value(value)
    }

    fn decode(&self, wire: &Wire) -> Result<Value, SerialError> {
        Self::decode_value(wire)
    }
}
