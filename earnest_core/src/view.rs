//! Live type-filtered views over a magic dict.

use crate::dict::MagicDict;
use crate::error::{Error, Result};
use crate::key::TypeTag;
use crate::value::Value;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// A proxy exposing only the entries of a dict whose value has one type.
///
/// Nothing is cached: every call re-reads the backing dict, so changes to
/// the dict are visible through the view immediately. `M` is either
/// `&MagicDict` (read-only) or `&mut MagicDict` (read-write).
pub struct TypedView<M> {
    dict: M,
    tag: TypeTag,
}

impl<M: Deref<Target = MagicDict>> TypedView<M> {
    /// Create a view of `dict` restricted to values matching `tag`.
    pub fn new(dict: M, tag: TypeTag) -> Self {
        Self { dict, tag }
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// The backing dict, unfiltered.
    pub fn dict(&self) -> &MagicDict {
        &self.dict
    }

    /// Get a value if it is present and of the view's type.
    ///
    /// A value of another type is reported as absent.
    pub fn get(&self, key: &str) -> Result<&Value> {
        match self.dict.get_value(key) {
            Some(value) if self.tag.matches(value) => Ok(value),
            _ => Err(Error::key_not_found(key)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    /// Matching entries, in the dict's order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        let tag = self.tag;
        self.dict.iter().filter(move |(_, value)| tag.matches(value))
    }

    /// Matching keys, in the dict's order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(key, _)| key)
    }

    /// Number of matching entries. O(n) in the size of the dict.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<M: DerefMut<Target = MagicDict>> TypedView<M> {
    /// The backing dict, unfiltered and writable.
    pub fn dict_mut(&mut self) -> &mut MagicDict {
        &mut self.dict
    }

    /// Write a value through to the dict if it is of the view's type.
    ///
    /// On a type mismatch the dict is left unchanged.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        let value = value.into();
        if !self.tag.matches(&value) {
            return Err(Error::type_mismatch(format!(
                "value must be a {}, got {}",
                self.tag, value
            )));
        }
        Ok(self.dict.insert(key, value))
    }

    /// Delete a value from the dict if it is visible through this view.
    pub fn remove(&mut self, key: &str) -> Result<Value> {
        self.get(key)?;
        self.dict.remove(key)
    }
}

impl<M: Deref<Target = MagicDict>> fmt::Debug for TypedView<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedView")
            .field("tag", &self.tag)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> MagicDict {
        MagicDict::try_from(json!({
            "s1": "hello",
            "s2": "world",
            "i1": 123,
            "b1": true,
            "f1": 0.5,
            "d1": {"s1": "v1"},
            "l1": [1, 2, 3],
        }))
        .unwrap()
    }

    #[test]
    fn test_read_through_view() {
        let d = sample();
        let view = TypedView::new(&d, TypeTag::Text);

        assert_eq!(*view.get("s1").unwrap(), "hello");
        assert!(view.contains_key("s2"));
        assert!(!view.contains_key("i1"));
        assert!(view.get("i1").unwrap_err().is_not_found());
        assert!(view.get("missing").unwrap_err().is_not_found());
        assert_eq!(view.len(), 2);
        assert_eq!(view.keys().collect::<Vec<_>>(), vec!["s1", "s2"]);
    }

    #[test]
    fn test_bool_is_not_int() {
        let d = sample();
        assert_eq!(
            TypedView::new(&d, TypeTag::Int).keys().collect::<Vec<_>>(),
            vec!["i1"]
        );
        assert_eq!(
            TypedView::new(&d, TypeTag::Bool).keys().collect::<Vec<_>>(),
            vec!["b1"]
        );
    }

    #[test]
    fn test_container_tags() {
        let d = sample();
        assert_eq!(
            TypedView::new(&d, TypeTag::Dict).keys().collect::<Vec<_>>(),
            vec!["d1"]
        );
        assert_eq!(
            TypedView::new(&d, TypeTag::List).keys().collect::<Vec<_>>(),
            vec!["l1"]
        );
        assert!(TypedView::new(&MagicDict::new(), TypeTag::List).is_empty());
    }

    #[test]
    fn test_write_through_view() {
        let mut d = sample();
        let mut view = TypedView::new(&mut d, TypeTag::Text);

        assert_eq!(view.set("s3", "hi").unwrap(), None);
        assert_eq!(*view.get("s3").unwrap(), "hi");
        assert_eq!(view.keys().collect::<Vec<_>>(), vec!["s1", "s2", "s3"]);

        let err = view.set("s3", 123).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(*view.get("s3").unwrap(), "hi");

        assert_eq!(view.remove("s3").unwrap(), "hi");
        assert!(!view.contains_key("s3"));
        drop(view);
        assert!(!d.contains_key("s3"));
    }

    #[test]
    fn test_remove_of_hidden_key_fails() {
        let mut d = sample();
        let mut view = TypedView::new(&mut d, TypeTag::Text);

        // Present in the dict, but invisible through the view.
        let err = view.remove("i1").unwrap_err();
        assert!(err.is_not_found());
        drop(view);
        assert_eq!(*d.get_value("i1").unwrap(), 123);
    }

    #[test]
    fn test_view_is_live() {
        let mut d = sample();
        let mut view = TypedView::new(&mut d, TypeTag::Text);
        assert_eq!(view.len(), 2);

        view.dict_mut().insert("s9", "late");
        view.dict_mut().insert("s1", 1);
        assert_eq!(view.keys().collect::<Vec<_>>(), vec!["s2", "s9"]);
        assert!(view.get("s1").unwrap_err().is_not_found());
    }

    #[test]
    fn test_nested_values_are_enchanted_on_write() {
        let mut d = MagicDict::new();
        let mut view = TypedView::new(&mut d, TypeTag::Dict);
        view.set("nested", MagicDict::try_from(json!({"a": [1]})).unwrap())
            .unwrap();
        assert!(matches!(
            view.set("raw", Value::from(json!([1]))),
            Err(Error::TypeMismatch { .. })
        ));
        assert_eq!(view.len(), 1);
    }
}
