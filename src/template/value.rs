//! Resolved snapshot data
//!
//! A [`Value`] is a tree whose leaves are [`Primitive`]s. It is what every pull of a sequence
//! produces: no thunks, no generators, just data.
//!
//! `Primitive::Undefined` marks a slot whose generator has completed. It serializes the way a
//! JSON encoder treats an absent value: object members holding it are omitted and array
//! elements holding it become `null`.

use super::tree::{Map, Tree};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Number;
use std::fmt;

/// Scalar snapshot data
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Primitive {
    /// Slot of an exhausted generator
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// A fully resolved snapshot tree
pub type Value = Tree<Primitive>;

impl Primitive {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Primitive::Undefined)
    }
}

impl Tree<Primitive> {
    /// The exhausted-generator sentinel
    pub fn undefined() -> Self {
        Tree::Leaf(Primitive::Undefined)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Tree::Leaf(Primitive::Undefined))
    }

    /// Convert to plain JSON, dropping undefined members and nulling undefined elements
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Tree::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Tree::Object(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .filter(|(_, value)| !value.is_undefined())
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Tree::Leaf(Primitive::Undefined) | Tree::Leaf(Primitive::Null) => serde_json::Value::Null,
            Tree::Leaf(Primitive::Bool(b)) => serde_json::Value::Bool(*b),
            Tree::Leaf(Primitive::Number(n)) => serde_json::Value::Number(n.clone()),
            Tree::Leaf(Primitive::String(s)) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Undefined => write!(f, "undefined"),
            Primitive::Null => write!(f, "null"),
            Primitive::Bool(b) => write!(f, "{}", b),
            Primitive::Number(n) => write!(f, "{}", n),
            Primitive::String(s) => write!(f, "{:?}", s),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

macro_rules! primitive_from {
    ($($source:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$source> for Primitive {
                fn from($v: $source) -> Self {
                    $body
                }
            }

            impl<L: From<Primitive>> From<$source> for Tree<L> {
                fn from(value: $source) -> Self {
                    Tree::Leaf(L::from(Primitive::from(value)))
                }
            }
        )*
    };
}

primitive_from! {
    bool => |v| Primitive::Bool(v),
    i32 => |v| Primitive::Number(Number::from(v)),
    i64 => |v| Primitive::Number(Number::from(v)),
    u32 => |v| Primitive::Number(Number::from(v)),
    u64 => |v| Primitive::Number(Number::from(v)),
    usize => |v| Primitive::Number(Number::from(v)),
    f64 => |v| Number::from_f64(v).map(Primitive::Number).unwrap_or(Primitive::Null),
    Number => |v| Primitive::Number(v),
    String => |v| Primitive::String(v),
    &str => |v| Primitive::String(v.to_string()),
}

impl<L: From<Primitive>> From<Primitive> for Tree<L> {
    fn from(value: Primitive) -> Self {
        Tree::Leaf(L::from(value))
    }
}

impl<L: From<Primitive>> From<serde_json::Value> for Tree<L> {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Tree::Leaf(L::from(Primitive::Null)),
            serde_json::Value::Bool(b) => b.into(),
            serde_json::Value::Number(n) => n.into(),
            serde_json::Value::String(s) => s.into(),
            serde_json::Value::Array(items) => Tree::Array(items.into_iter().map(Tree::from).collect()),
            serde_json::Value::Object(entries) => Tree::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Tree::from(value)))
                    .collect::<Map<_>>(),
            ),
        }
    }
}

impl<L, T> From<Vec<T>> for Tree<L>
where
    T: Into<Tree<L>>,
{
    fn from(items: Vec<T>) -> Self {
        Tree::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<L> From<Map<Tree<L>>> for Tree<L> {
    fn from(entries: Map<Tree<L>>) -> Self {
        Tree::Object(entries)
    }
}

// ============================================================================
// Serde
// ============================================================================

impl Serialize for Primitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Primitive::Undefined | Primitive::Null => serializer.serialize_unit(),
            Primitive::Bool(b) => serializer.serialize_bool(*b),
            Primitive::Number(n) => n.serialize(serializer),
            Primitive::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for Tree<Primitive> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tree::Leaf(primitive) => primitive.serialize(serializer),
            Tree::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Tree::Object(entries) => {
                let present: Vec<_> = entries
                    .iter()
                    .filter(|(_, value)| !value.is_undefined())
                    .collect();
                let mut map = serializer.serialize_map(Some(present.len()))?;
                for (key, value) in present {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Tree<Primitive> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}
