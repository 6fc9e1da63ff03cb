//! The magic list.

use crate::dict::{Container, ContainerMut, Found, FoundMut, resolve_path, resolve_path_mut};
use crate::error::{Error, Result};
use crate::key::Key;
use crate::value::Value;
use crate::walk::sequence_position;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// List-like container for the JSON data model.
///
/// Nested objects and arrays are stored as magic containers. Indices are
/// `i64`; negative indices count from the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MagicList {
    items: Vec<Value>,
}

impl MagicList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, index: i64) -> Option<usize> {
        sequence_position(index, self.items.len())
    }

    pub fn get(&self, index: i64) -> Option<&Value> {
        self.position(index).map(|pos| &self.items[pos])
    }

    pub fn get_mut(&mut self, index: i64) -> Option<&mut Value> {
        self.position(index).map(|pos| &mut self.items[pos])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Look up a key.
    ///
    /// Indices select elements, paths walk nested containers. Names and
    /// type filters do not apply to lists.
    pub fn lookup(&self, key: impl Into<Key>) -> Result<Found<'_>> {
        self.dispatch(&key.into())
    }

    pub(crate) fn dispatch(&self, key: &Key) -> Result<Found<'_>> {
        match key {
            Key::Index(index) => self
                .get(*index)
                .map(Found::Value)
                .ok_or_else(|| Error::key_not_found(*index)),
            Key::Path(components) => resolve_path(Container::List(self), components),
            Key::Name(_) | Key::Filter(_) => Err(name_rejected(key)),
        }
    }

    /// Look up a key that must resolve to a value.
    pub fn value(&self, key: impl Into<Key>) -> Result<&Value> {
        self.lookup(key)?.into_value()
    }

    /// Look up a key with exclusive access.
    pub fn lookup_mut(&mut self, key: impl Into<Key>) -> Result<FoundMut<'_>> {
        self.dispatch_mut(&key.into())
    }

    pub(crate) fn dispatch_mut(&mut self, key: &Key) -> Result<FoundMut<'_>> {
        match key {
            Key::Index(index) => self
                .get_mut(*index)
                .map(FoundMut::Value)
                .ok_or_else(|| Error::key_not_found(*index)),
            Key::Path(components) => resolve_path_mut(ContainerMut::List(self), components),
            Key::Name(_) | Key::Filter(_) => Err(name_rejected(key)),
        }
    }

    pub fn value_mut(&mut self, key: impl Into<Key>) -> Result<&mut Value> {
        self.lookup_mut(key)?.into_value()
    }

    /// Append a value, enchanting it.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.items.push(value.into());
    }

    /// Insert before `index`, clamping out-of-range indices to the ends.
    pub fn insert(&mut self, index: i64, value: impl Into<Value>) {
        let len = self.items.len() as i64;
        let pos = if index < 0 { len + index } else { index };
        self.items.insert(pos.clamp(0, len) as usize, value.into());
    }

    /// Replace the value at `index`, returning the previous one.
    pub fn set(&mut self, index: i64, value: impl Into<Value>) -> Result<Value> {
        let pos = self
            .position(index)
            .ok_or_else(|| Error::key_not_found(index))?;
        Ok(std::mem::replace(&mut self.items[pos], value.into()))
    }

    /// Remove and return the value at `index`.
    pub fn remove(&mut self, index: i64) -> Result<Value> {
        let pos = self
            .position(index)
            .ok_or_else(|| Error::key_not_found(index))?;
        Ok(self.items.remove(pos))
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.items.pop()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Convert back into a native JSON array.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.items.iter().map(Value::to_json).collect())
    }
}

fn name_rejected(key: &Key) -> Error {
    Error::type_mismatch(format!("list indices must be integers, got {}", key))
}

impl TryFrom<serde_json::Value> for MagicList {
    type Error = Error;

    fn try_from(native: serde_json::Value) -> Result<Self> {
        match native {
            serde_json::Value::Array(items) => Ok(items.into_iter().collect()),
            other => Err(Error::type_mismatch(format!(
                "expected a sequence, got {}",
                other
            ))),
        }
    }
}

impl<V: Into<Value>> FromIterator<V> for MagicList {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<V: Into<Value>> Extend<V> for MagicList {
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        self.items.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for MagicList {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a MagicList {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Serialize for MagicList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for value in self {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for MagicList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let native = serde_json::Value::deserialize(deserializer)?;
        MagicList::try_from(native).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for MagicList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::TypeTag;
    use serde_json::json;

    #[test]
    fn test_index_access() {
        let list = MagicList::try_from(json!(["a", "b", "c"])).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(*list.get(0).unwrap(), "a");
        assert_eq!(*list.get(-1).unwrap(), "c");
        assert!(list.get(3).is_none());
        assert!(list.get(-4).is_none());
    }

    #[test]
    fn test_lookup_dispatch() {
        let list = MagicList::try_from(json!([{"a": [10, 20]}, 2])).unwrap();
        assert_eq!(*list.value(1).unwrap(), 2);
        assert_eq!(*list.value((0, "a", 1)).unwrap(), 20);

        let err = list.lookup(5).unwrap_err();
        assert_eq!(err.not_found_key(), Some(&Key::Index(5)));

        let err = list.lookup((0, "b")).unwrap_err();
        assert_eq!(err.not_found_key(), Some(&Key::from((0, "b"))));

        assert!(matches!(list.lookup("a"), Err(Error::TypeMismatch { .. })));
        assert!(matches!(
            list.lookup(Key::of_type(TypeTag::Int)),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_mutation_enchants() {
        let mut list = MagicList::new();
        list.push(1);
        list.push(json!({"nested": [true]}));
        list.insert(0, "first");
        list.insert(100, "last");
        list.insert(-1, json!([]));

        assert_eq!(list.len(), 5);
        assert_eq!(*list.get(0).unwrap(), "first");
        assert!(list.get(2).unwrap().as_dict().is_some());
        assert!(list.get(3).unwrap().as_list().is_some());
        assert_eq!(*list.get(-1).unwrap(), "last");
        assert_eq!(*list.value((2, "nested", 0)).unwrap(), true);

        assert_eq!(list.set(-1, "end").unwrap(), "last");
        assert!(list.set(9, 0).unwrap_err().is_not_found());
        assert_eq!(list.remove(0).unwrap(), "first");
        assert!(list.remove(9).unwrap_err().is_not_found());
        assert_eq!(list.pop().unwrap(), "end");

        list.extend([json!({"k": 1})]);
        assert!(list.get(-1).unwrap().as_dict().is_some());
    }

    #[test]
    fn test_construction_requires_sequence() {
        assert!(matches!(
            MagicList::try_from(json!({"a": 1})),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_serde_round_trip() {
        let list = MagicList::try_from(json!([1, [2, {"x": null}]])).unwrap();
        let text = serde_json::to_string(&list).unwrap();
        assert_eq!(text, "[1,[2,{\"x\":null}]]");
        let back: MagicList = serde_json::from_str(&text).unwrap();
        assert_eq!(back, list);
    }
}
