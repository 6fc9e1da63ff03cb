//! The absorbing "nothing" container and optional chaining.

use crate::key::Key;
use crate::value::Value;
use std::fmt;
use std::ops::Index;

/// Container emulating both an empty mapping and an empty sequence.
///
/// Indexing it with anything yields [`NOTHING`] again, so chained lookups
/// such as `NOTHING["a"][0]["b"]` never fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Nothing;

/// The shared [`Nothing`] instance.
pub static NOTHING: Nothing = Nothing;

impl Nothing {
    /// Any lookup yields the singleton.
    pub fn get<K>(&self, _key: K) -> &'static Nothing {
        &NOTHING
    }

    pub fn len(&self) -> usize {
        0
    }

    pub fn is_empty(&self) -> bool {
        true
    }

    /// Always false.
    pub fn is_truthy(&self) -> bool {
        false
    }

    pub fn iter(&self) -> std::iter::Empty<&Value> {
        std::iter::empty()
    }
}

impl<K> Index<K> for Nothing {
    type Output = Nothing;

    fn index(&self, _key: K) -> &Nothing {
        &NOTHING
    }
}

impl<'a> IntoIterator for &'a Nothing {
    type Item = &'a Value;
    type IntoIter = std::iter::Empty<&'a Value>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::empty()
    }
}

impl From<Nothing> for bool {
    fn from(_: Nothing) -> bool {
        false
    }
}

impl fmt::Display for Nothing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<nothing>")
    }
}

/// A step in an optional lookup chain.
///
/// Once a step fails the chain stays on [`NOTHING`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Probe<'a> {
    Value(&'a Value),
    Nothing(&'static Nothing),
}

impl<'a> Probe<'a> {
    pub fn nothing() -> Self {
        Probe::Nothing(&NOTHING)
    }

    /// Look up `key` in the current value.
    ///
    /// Any failure, or a lookup selecting a filtered view, yields nothing.
    pub fn at(self, key: impl Into<Key>) -> Probe<'a> {
        match self {
            Probe::Value(value) => match value.lookup(key).ok().and_then(|f| f.value()) {
                Some(next) => Probe::Value(next),
                None => Probe::nothing(),
            },
            Probe::Nothing(_) => self,
        }
    }

    pub fn value(self) -> Option<&'a Value> {
        match self {
            Probe::Value(value) => Some(value),
            Probe::Nothing(_) => None,
        }
    }

    pub fn is_nothing(self) -> bool {
        matches!(self, Probe::Nothing(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::MagicDict;
    use serde_json::json;

    #[test]
    fn test_nothing_absorbs_lookups() {
        let t = &NOTHING;
        assert!(std::ptr::eq(&t["key"], t));
        assert!(std::ptr::eq(&t[0], t));
        assert!(std::ptr::eq(&t["key1"]["key2"][3][4], t));
        assert!(std::ptr::eq(t.get("x").get(1), t));
        assert_eq!(t[Key::from(("a", 1))], NOTHING);
    }

    #[test]
    fn test_nothing_is_empty_and_falsy() {
        assert_eq!(NOTHING.len(), 0);
        assert!(NOTHING.is_empty());
        assert_eq!(NOTHING.iter().count(), 0);
        assert!((&NOTHING).into_iter().next().is_none());
        assert!(!NOTHING.is_truthy());
        assert!(!bool::from(NOTHING));
        assert_eq!(NOTHING.to_string(), "<nothing>");
    }

    #[test]
    fn test_probe_chain() {
        let d = MagicDict::try_from(json!({"a": {"b": [1, {"c": "deep"}]}})).unwrap();

        assert_eq!(
            d.probe("a").at("b").at(1).at("c").value().unwrap(),
            "deep"
        );
        assert_eq!(*d.probe(("a", "b", -2)).value().unwrap(), 1);

        let missing = d.probe("a").at("zzz").at(0).at("c");
        assert!(missing.is_nothing());
        assert_eq!(missing, Probe::Nothing(&NOTHING));
        assert!(missing.value().is_none());
    }
}
