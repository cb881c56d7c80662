//! The annotation value graph.
//!
//! A [`Value`] is what provers produce and what the serializers consume:
//! primitives (integers, text, absent), ordered sequences, string-keyed
//! mappings, and annotated entities. Containers and entities are reference
//! counted so that a decoder can hand out one reconstructed instance from
//! several places in the graph.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;

use crate::entity::Entity;

/// A node of the annotation graph.
///
/// Equality is structural: two values built independently compare equal
/// when their contents match, regardless of whether they share storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Value {
    /// The absent value (`null` on the wire).
    Null,
    /// A signed integer.
    Int(i64),
    /// A text string.
    Str(String),
    /// An ordered sequence.
    List(Rc<Vec<Value>>),
    /// A mapping with unique string keys.
    Map(Rc<BTreeMap<String, Value>>),
    /// An annotated entity.
    Entity(Rc<Entity>),
}

impl Value {
    /// Builds a sequence value.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(Rc::new(items.into_iter().collect()))
    }

    /// Builds a mapping value. Later duplicates of a key replace earlier ones.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(Rc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the string contents if this is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is a [`Value::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the items if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a [`Value::Map`].
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the entity if this is a [`Value::Entity`].
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Value::Entity(e) => Some(e),
            _ => None,
        }
    }

    /// Returns `true` if both values are the same shared container or entity.
    ///
    /// Primitives never share storage, so this is `false` for them even
    /// when they are equal.
    pub fn same_instance(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Entity(a), Value::Entity(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Returns a structurally equal value that shares no storage with `self`.
    pub fn deep_copy(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Int(i) => Value::Int(*i),
            Value::Str(s) => Value::Str(s.clone()),
            Value::List(items) => Value::list(items.iter().map(Value::deep_copy)),
            Value::Map(entries) => {
                Value::map(entries.iter().map(|(k, v)| (k.clone(), v.deep_copy())))
            }
            Value::Entity(e) => Value::Entity(Rc::new(e.deep_copy())),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::list(items.into_iter().map(Into::into))
    }
}

impl From<Entity> for Value {
    fn from(e: Entity) -> Self {
        Value::Entity(Rc::new(e))
    }
}
