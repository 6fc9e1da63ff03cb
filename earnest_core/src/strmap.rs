//! Insertion-ordered mapping restricted to text keys.

use crate::error::{Error, Result};
use crate::key::Key;
use indexmap::IndexMap;

/// A mutable mapping whose keys are always text.
///
/// Entries keep insertion order; replacing a value keeps its position and
/// removing one keeps the order of the rest.
#[derive(Debug, Clone)]
pub struct StrMap<V> {
    entries: IndexMap<String, V>,
}

impl<V> StrMap<V> {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Create an empty mapping with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.entries.insert(key.into(), value)
    }

    /// Remove a value, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    /// Get the value for a key, which must be a name.
    pub fn get_key(&self, key: &Key) -> Result<&V> {
        let name = require_name(key)?;
        self.get(name).ok_or_else(|| Error::key_not_found(name))
    }

    /// Insert a value under a key, which must be a name.
    pub fn set_key(&mut self, key: &Key, value: V) -> Result<Option<V>> {
        let name = require_name(key)?;
        Ok(self.insert(name, value))
    }

    /// Remove the value for a key, which must be a name.
    pub fn remove_key(&mut self, key: &Key) -> Result<V> {
        let name = require_name(key)?;
        self.remove(name).ok_or_else(|| Error::key_not_found(name))
    }
}

/// Extract the name from a key, rejecting every other key kind.
pub(crate) fn require_name(key: &Key) -> Result<&str> {
    key.as_name()
        .ok_or_else(|| Error::type_mismatch(format!("key must be a string, got {}", key)))
}

impl<V> Default for StrMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PartialEq> PartialEq for StrMap<V> {
    /// Content equality; order is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|other_v| v == other_v))
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for StrMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = StrMap::with_capacity(iter.size_hint().0);
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V> Extend<(K, V)> for StrMap<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<V> IntoIterator for StrMap<V> {
    type Item = (String, V);
    type IntoIter = indexmap::map::IntoIter<String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let mut map = StrMap::new();
        assert!(map.is_empty());

        assert_eq!(map.insert("a", 1), None);
        assert_eq!(map.insert("b", 2), None);
        assert_eq!(map.insert("a", 10), Some(1));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&10));
        assert!(map.contains_key("b"));
        assert!(!map.contains_key("c"));

        assert_eq!(map.remove("a"), Some(10));
        assert_eq!(map.remove("a"), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_insertion_order() {
        let mut map: StrMap<i32> = [("c", 3), ("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["c", "a", "b"]);

        // Replacing keeps the position, removing closes the gap.
        map.insert("c", 30);
        map.remove("a");
        map.insert("d", 4);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["c", "b", "d"]);
        assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![30, 2, 4]);
    }

    #[test]
    fn test_key_checked_access() {
        let mut map: StrMap<i32> = [("a", 1)].into_iter().collect();

        assert_eq!(*map.get_key(&Key::from("a")).unwrap(), 1);
        assert!(matches!(
            map.get_key(&Key::from("zzz")),
            Err(Error::KeyNotFound { .. })
        ));
        assert!(matches!(
            map.get_key(&Key::Index(123)),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            map.set_key(&Key::Index(123), 456),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            map.remove_key(&Key::Index(123)),
            Err(Error::TypeMismatch { .. })
        ));

        assert_eq!(map.set_key(&Key::from("b"), 2).unwrap(), None);
        assert_eq!(map.remove_key(&Key::from("b")).unwrap(), 2);
        assert!(map.remove_key(&Key::from("b")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: StrMap<i32> = [("x", 1), ("y", 2)].into_iter().collect();
        let b: StrMap<i32> = [("y", 2), ("x", 1)].into_iter().collect();
        let c: StrMap<i32> = [("y", 2), ("x", 3)].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_large_map_keeps_order() {
        let mut map: StrMap<usize> = (0..10_000).map(|i| (format!("k{}", i), i)).collect();
        assert_eq!(map.len(), 10_000);
        assert_eq!(map.get("k9999"), Some(&9999));

        for i in (0..10_000).step_by(2) {
            map.remove(&format!("k{}", i));
        }
        assert_eq!(map.len(), 5_000);
        assert_eq!(map.keys().next(), Some("k1"));
        assert_eq!(map.keys().last(), Some("k9999"));
        assert!(map.values().zip(map.values().skip(1)).all(|(a, b)| a < b));
    }
}
