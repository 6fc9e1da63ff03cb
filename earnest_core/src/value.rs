//! The magic value model and enchantment of native JSON data.

use crate::dict::{Found, FoundMut, MagicDict};
use crate::error::{Error, Result};
use crate::key::{Key, TypeTag};
use crate::list::MagicList;
use crate::nothing::Probe;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An immutable leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    /// Wide enough for every signed and unsigned 64-bit integer.
    Int(i128),
    Float(f64),
    Text(String),
}

/// A value stored inside a magic container.
///
/// Structured values are always magic containers, never native JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Dict(MagicDict),
    List(MagicList),
}

impl Value {
    /// The null value.
    pub const NULL: Value = Value::Scalar(Scalar::Null);

    /// Enchant any serializable value.
    ///
    /// The value is first converted to the JSON data model; anything that
    /// does not fit (for example maps with non-string keys) is rejected.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let native =
            serde_json::to_value(value).map_err(|e| Error::value_not_allowed(e.to_string()))?;
        Ok(Value::from(native))
    }

    /// Parse JSON text and enchant the result.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let native: serde_json::Value = serde_json::from_str(text)?;
        Ok(Value::from(native))
    }

    /// Classify this value. Null has no tag.
    pub fn type_tag(&self) -> Option<TypeTag> {
        match self {
            Value::Scalar(Scalar::Null) => None,
            Value::Scalar(Scalar::Bool(_)) => Some(TypeTag::Bool),
            Value::Scalar(Scalar::Int(_)) => Some(TypeTag::Int),
            Value::Scalar(Scalar::Float(_)) => Some(TypeTag::Float),
            Value::Scalar(Scalar::Text(_)) => Some(TypeTag::Text),
            Value::Dict(_) => Some(TypeTag::Dict),
            Value::List(_) => Some(TypeTag::List),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Scalar(Scalar::Null))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            Value::Scalar(Scalar::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_int().and_then(|i| i64::try_from(i).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Scalar(Scalar::Float(f)) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&MagicDict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut MagicDict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&MagicList> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut MagicList> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Look up `key` in this value if it is a container.
    pub fn lookup(&self, key: impl Into<Key>) -> Result<Found<'_>> {
        let key = key.into();
        match self {
            Value::Dict(dict) => dict.dispatch(&key),
            Value::List(list) => list.dispatch(&key),
            Value::Scalar(scalar) => Err(scalar_lookup(&key, scalar)),
        }
    }

    /// Look up `key` in this value with exclusive access.
    pub fn lookup_mut(&mut self, key: impl Into<Key>) -> Result<FoundMut<'_>> {
        let key = key.into();
        match self {
            Value::Dict(dict) => dict.dispatch_mut(&key),
            Value::List(list) => list.dispatch_mut(&key),
            Value::Scalar(scalar) => Err(scalar_lookup(&key, scalar)),
        }
    }

    /// Start an optional chain at this value.
    pub fn probe(&self) -> Probe<'_> {
        Probe::Value(self)
    }

    /// Convert back into native JSON.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Scalar(Scalar::Null) => serde_json::Value::Null,
            Value::Scalar(Scalar::Bool(b)) => serde_json::Value::Bool(*b),
            Value::Scalar(Scalar::Int(i)) => int_to_json(*i),
            Value::Scalar(Scalar::Float(f)) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Scalar(Scalar::Text(s)) => serde_json::Value::String(s.clone()),
            Value::Dict(dict) => dict.to_json(),
            Value::List(list) => list.to_json(),
        }
    }
}

fn scalar_lookup(key: &Key, scalar: &Scalar) -> Error {
    Error::type_mismatch(format!(
        "cannot look up {} in scalar {}",
        key,
        Value::Scalar(scalar.clone())
    ))
}

fn int_to_json(i: i128) -> serde_json::Value {
    if let Ok(i) = i64::try_from(i) {
        serde_json::Value::from(i)
    } else if let Ok(u) = u64::try_from(i) {
        serde_json::Value::from(u)
    } else {
        serde_json::Number::from_f64(i as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::NULL
    }
}

impl From<serde_json::Value> for Value {
    /// Enchant native JSON: objects become dicts, arrays become lists.
    fn from(native: serde_json::Value) -> Self {
        match native {
            serde_json::Value::Null => Value::NULL,
            serde_json::Value::Bool(b) => Value::from(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::from(i)
                } else if let Some(u) = n.as_u64() {
                    Value::from(u)
                } else {
                    Value::from(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Dict(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

impl From<MagicDict> for Value {
    fn from(dict: MagicDict) -> Self {
        Value::Dict(dict)
    }
}

impl From<MagicList> for Value {
    fn from(list: MagicList) -> Self {
        Value::List(list)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::NULL
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(i: $ty) -> Self {
                    Value::Scalar(Scalar::Int(i.into()))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Scalar(Scalar::Float(f))
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Scalar(Scalar::Float(f.into()))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(Scalar::Text(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(Scalar::Text(s))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::NULL)
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<String> for Value {
    fn eq(&self, other: &String) -> bool {
        self.as_str() == Some(other.as_str())
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        self.as_int() == Some((*other).into())
    }
}

impl PartialEq<i32> for Value {
    fn eq(&self, other: &i32) -> bool {
        self.as_int() == Some((*other).into())
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        self.as_f64() == Some(*other)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Scalar(Scalar::Null) => serializer.serialize_unit(),
            Value::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Value::Scalar(Scalar::Int(i)) => match i64::try_from(*i) {
                Ok(i) => serializer.serialize_i64(i),
                Err(_) => serializer.serialize_i128(*i),
            },
            Value::Scalar(Scalar::Float(f)) => serializer.serialize_f64(*f),
            Value::Scalar(Scalar::Text(s)) => serializer.serialize_str(s),
            Value::Dict(dict) => dict.serialize(serializer),
            Value::List(list) => list.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl fmt::Display for Value {
    /// Compact JSON rendering.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
