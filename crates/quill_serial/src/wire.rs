//! Helpers shared by the serializer variants.

use std::collections::BTreeMap;

use quill_core::{Entity, EntityKind, Value};
use serde_json::Map;

use crate::error::SerialError;
use crate::Wire;

/// Encodes a primitive (`Null`, `Int`, `Str`). Containers map to `null` and
/// must be handled by the caller.
pub(crate) fn encode_primitive(value: &Value) -> Wire {
    match value {
        Value::Int(i) => Wire::from(*i),
        Value::Str(s) => Wire::from(s.as_str()),
        _ => Wire::Null,
    }
}

/// Decodes a primitive wire node.
pub(crate) fn decode_primitive(wire: &Wire) -> Result<Value, SerialError> {
    match wire {
        Wire::Null => Ok(Value::Null),
        Wire::String(s) => Ok(Value::Str(s.clone())),
        Wire::Number(n) => n.as_i64().map(Value::Int).ok_or_else(|| {
            SerialError::UnsupportedWire {
                found: format!("non-integer number {n}"),
            }
        }),
        Wire::Bool(b) => Err(SerialError::UnsupportedWire {
            found: format!("boolean {b}"),
        }),
        Wire::Array(_) | Wire::Object(_) => Err(SerialError::UnsupportedWire {
            found: "container where a primitive was expected".to_string(),
        }),
    }
}

/// Fails if a user mapping contains one of the wire format's reserved keys.
pub(crate) fn reject_reserved(
    entries: &BTreeMap<String, Value>,
    reserved: &[&str],
) -> Result<(), SerialError> {
    match reserved.iter().find(|k| entries.contains_key(**k)) {
        Some(key) => Err(SerialError::ReservedKey {
            key: (*key).to_string(),
        }),
        None => Ok(()),
    }
}

/// Object entries in sorted key order.
///
/// Wire objects keep their on-disk key order, so decoders that must mirror
/// the encoder's traversal sort explicitly instead of relying on it.
pub(crate) fn sorted_entries(obj: &Map<String, Wire>) -> Vec<(&String, &Wire)> {
    let mut entries: Vec<_> = obj.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

/// Reads the index of a `{"*": index}` back-reference.
pub(crate) fn reference_index(target: &Wire) -> Result<u64, SerialError> {
    target.as_u64().ok_or_else(|| SerialError::UnsupportedWire {
        found: format!("back-reference with non-index target {target}"),
    })
}

/// Looks up the entity kind named by a wire alias.
pub(crate) fn kind_of_alias(alias: &Wire) -> Result<EntityKind, SerialError> {
    let alias = alias.as_str().ok_or_else(|| SerialError::UnsupportedWire {
        found: format!("entity alias {alias}"),
    })?;
    EntityKind::from_alias(alias).ok_or_else(|| SerialError::UnknownAlias {
        alias: alias.to_string(),
    })
}

/// Rebuilds an entity from positional fields, checking arity.
pub(crate) fn build_entity(kind: EntityKind, fields: Vec<Value>) -> Result<Value, SerialError> {
    let found = fields.len();
    Entity::from_fields(kind, fields)
        .map(Value::from)
        .ok_or_else(|| SerialError::FieldMismatch {
            kind: kind.name(),
            reason: format!(
                "expected {} positional fields, found {found}",
                kind.field_names().len()
            ),
        })
}
