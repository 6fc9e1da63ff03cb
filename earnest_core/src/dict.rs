//! The magic dict and its key dispatch.
//!
//! [`MagicDict::lookup`] is the single entry point for reading: plain names,
//! type filters (single key or whole-dict view) and nested paths all go
//! through it.

use crate::error::{Error, Result};
use crate::key::{Filter, Key, TypeTag};
use crate::list::MagicList;
use crate::nothing::Probe;
use crate::strmap::{StrMap, require_name};
use crate::value::Value;
use crate::view::TypedView;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::{debug, trace};

/// Result of a lookup: a stored value, or a live filtered view.
#[derive(Debug)]
pub enum Found<'a> {
    Value(&'a Value),
    View(TypedView<&'a MagicDict>),
}

impl<'a> Found<'a> {
    /// The value, if the lookup selected one.
    pub fn value(self) -> Option<&'a Value> {
        match self {
            Found::Value(value) => Some(value),
            Found::View(_) => None,
        }
    }

    /// The value, failing if the lookup selected a view.
    pub fn into_value(self) -> Result<&'a Value> {
        match self {
            Found::Value(value) => Ok(value),
            Found::View(view) => Err(view_selected(view.tag())),
        }
    }

    /// The view, if the lookup selected one.
    pub fn view(self) -> Option<TypedView<&'a MagicDict>> {
        match self {
            Found::View(view) => Some(view),
            Found::Value(_) => None,
        }
    }

    pub fn is_view(&self) -> bool {
        matches!(self, Found::View(_))
    }
}

/// Result of a mutable lookup: a stored value, or a writable filtered view.
#[derive(Debug)]
pub enum FoundMut<'a> {
    Value(&'a mut Value),
    View(TypedView<&'a mut MagicDict>),
}

impl<'a> FoundMut<'a> {
    pub fn value(self) -> Option<&'a mut Value> {
        match self {
            FoundMut::Value(value) => Some(value),
            FoundMut::View(_) => None,
        }
    }

    /// The value, failing if the lookup selected a view.
    pub fn into_value(self) -> Result<&'a mut Value> {
        match self {
            FoundMut::Value(value) => Ok(value),
            FoundMut::View(view) => Err(view_selected(view.tag())),
        }
    }

    pub fn view(self) -> Option<TypedView<&'a mut MagicDict>> {
        match self {
            FoundMut::View(view) => Some(view),
            FoundMut::Value(_) => None,
        }
    }

    pub fn is_view(&self) -> bool {
        matches!(self, FoundMut::View(_))
    }
}

fn view_selected(tag: TypeTag) -> Error {
    Error::type_mismatch(format!("lookup selected a {} view, not a value", tag))
}

/// Either kind of magic container, borrowed.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Container<'a> {
    Dict(&'a MagicDict),
    List(&'a MagicList),
}

impl<'a> Container<'a> {
    fn of(value: &'a Value) -> Option<Self> {
        match value {
            Value::Dict(dict) => Some(Container::Dict(dict)),
            Value::List(list) => Some(Container::List(list)),
            Value::Scalar(_) => None,
        }
    }

    /// One traversal step. The key kind must fit the container kind.
    fn step(self, key: &Key) -> Option<&'a Value> {
        match (self, key) {
            (Container::Dict(dict), Key::Name(name)) => dict.get_value(name),
            (Container::List(list), Key::Index(index)) => list.get(*index),
            _ => None,
        }
    }

    fn lookup(self, key: &Key) -> Result<Found<'a>> {
        match self {
            Container::Dict(dict) => dict.dispatch(key),
            Container::List(list) => list.dispatch(key),
        }
    }
}

/// Either kind of magic container, borrowed exclusively.
#[derive(Debug)]
pub(crate) enum ContainerMut<'a> {
    Dict(&'a mut MagicDict),
    List(&'a mut MagicList),
}

impl<'a> ContainerMut<'a> {
    fn of(value: &'a mut Value) -> Option<Self> {
        match value {
            Value::Dict(dict) => Some(ContainerMut::Dict(dict)),
            Value::List(list) => Some(ContainerMut::List(list)),
            Value::Scalar(_) => None,
        }
    }

    fn step(self, key: &Key) -> Option<&'a mut Value> {
        match (self, key) {
            (ContainerMut::Dict(dict), Key::Name(name)) => dict.get_value_mut(name),
            (ContainerMut::List(list), Key::Index(index)) => list.get_mut(*index),
            _ => None,
        }
    }

    fn lookup(self, key: &Key) -> Result<FoundMut<'a>> {
        match self {
            ContainerMut::Dict(dict) => dict.dispatch_mut(key),
            ContainerMut::List(list) => list.dispatch_mut(key),
        }
    }
}

/// Split a path into its leading steps and final component.
///
/// Every component but the last must be a name or an index; this is
/// checked for the whole path before traversal starts.
fn split_path(components: &[Key]) -> Result<(&[Key], &Key)> {
    let Some((last, init)) = components.split_last() else {
        return Err(Error::malformed_path("path cannot be empty"));
    };

    if !init.iter().all(Key::is_path_step) {
        return Err(Error::malformed_path(format!(
            "path must contain only names and indices before the last component: {}",
            Key::Path(components.to_vec())
        )));
    }

    trace!(depth = components.len(), "resolving path");
    Ok((init, last))
}

fn prefix_not_found(components: &[Key], pos: usize) -> Error {
    let prefix = Key::Path(components[..=pos].to_vec());
    debug!(%prefix, "path resolution stopped");
    Error::key_not_found(prefix)
}

fn full_path_not_found<T>(result: Result<T>, components: &[Key]) -> Result<T> {
    match result {
        Err(e) if e.is_not_found() => Err(Error::key_not_found(Key::Path(components.to_vec()))),
        other => other,
    }
}

/// Resolve a path key starting at `start`.
///
/// A failure during traversal reports the consumed prefix; a failure of
/// the final lookup reports the full path.
pub(crate) fn resolve_path<'a>(start: Container<'a>, components: &[Key]) -> Result<Found<'a>> {
    let (init, last) = split_path(components)?;

    let mut container = start;
    for (pos, component) in init.iter().enumerate() {
        let next = container
            .step(component)
            .ok_or_else(|| prefix_not_found(components, pos))?;
        container = Container::of(next).ok_or_else(|| prefix_not_found(components, pos))?;
    }

    full_path_not_found(container.lookup(last), components)
}

/// Resolve a path key starting at `start`, keeping exclusive access.
pub(crate) fn resolve_path_mut<'a>(
    start: ContainerMut<'a>,
    components: &[Key],
) -> Result<FoundMut<'a>> {
    let (init, last) = split_path(components)?;

    let mut container = start;
    for (pos, component) in init.iter().enumerate() {
        let next = container
            .step(component)
            .ok_or_else(|| prefix_not_found(components, pos))?;
        container = ContainerMut::of(next).ok_or_else(|| prefix_not_found(components, pos))?;
    }

    full_path_not_found(container.lookup(last), components)
}

fn index_rejected(key: &Key) -> Error {
    Error::type_mismatch(format!("key must be a string, got {}", key))
}

fn reject_step(filter: &Filter) -> Result<()> {
    match filter.step {
        Some(step) => Err(Error::not_supported(format!(
            "step specified in type filter: {}",
            step
        ))),
        None => Ok(()),
    }
}

fn check_tag(tag: TypeTag, value: &Value) -> Result<()> {
    if tag.matches(value) {
        Ok(())
    } else {
        Err(Error::type_mismatch(format!(
            "value is not of {} type: {}",
            tag, value
        )))
    }
}

/// Dict-like container for the JSON data model, with added magic.
///
/// Keys are always text. Nested objects and arrays are stored as
/// [`MagicDict`] and [`MagicList`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MagicDict {
    map: StrMap<Value>,
}

impl MagicDict {
    /// Create an empty dict.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse JSON text that must hold an object.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let native: serde_json::Value = serde_json::from_str(text)?;
        MagicDict::try_from(native)
    }

    /// Enchant any serializable value that serializes to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        match Value::from_serialize(value)? {
            Value::Dict(dict) => Ok(dict),
            other => Err(Error::type_mismatch(format!(
                "expected a mapping, got {}",
                other
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Plain name lookup without dispatch.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Plain mutable name lookup without dispatch.
    pub fn get_value_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.map.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.map.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.map.values()
    }

    /// Look up a key.
    ///
    /// - a name returns the stored value;
    /// - a filter without a key returns a live [`TypedView`]; with a key it
    ///   returns the value only if it has the requested type;
    /// - a path walks nested containers one component at a time;
    /// - an index is rejected, dict keys are text.
    pub fn lookup(&self, key: impl Into<Key>) -> Result<Found<'_>> {
        self.dispatch(&key.into())
    }

    pub(crate) fn dispatch(&self, key: &Key) -> Result<Found<'_>> {
        match key {
            Key::Name(name) => self
                .map
                .get(name)
                .map(Found::Value)
                .ok_or_else(|| Error::key_not_found(name.as_str())),
            Key::Filter(filter) => self.filter(filter),
            Key::Path(components) => resolve_path(Container::Dict(self), components),
            Key::Index(_) => Err(index_rejected(key)),
        }
    }

    fn filter(&self, filter: &Filter) -> Result<Found<'_>> {
        reject_step(filter)?;
        let Some(name) = &filter.key else {
            return Ok(Found::View(TypedView::new(self, filter.tag)));
        };

        let value = self
            .map
            .get(name)
            .ok_or_else(|| Error::key_not_found(name.as_str()))?;
        check_tag(filter.tag, value)?;
        Ok(Found::Value(value))
    }

    /// Look up a key with exclusive access.
    ///
    /// Dispatch is the same as [`MagicDict::lookup`]; values come back
    /// mutable and views come back writable, including views reached
    /// through a path.
    pub fn lookup_mut(&mut self, key: impl Into<Key>) -> Result<FoundMut<'_>> {
        self.dispatch_mut(&key.into())
    }

    pub(crate) fn dispatch_mut(&mut self, key: &Key) -> Result<FoundMut<'_>> {
        match key {
            Key::Name(name) => self
                .map
                .get_mut(name)
                .map(FoundMut::Value)
                .ok_or_else(|| Error::key_not_found(name.as_str())),
            Key::Filter(filter) => self.filter_mut(filter),
            Key::Path(components) => resolve_path_mut(ContainerMut::Dict(self), components),
            Key::Index(_) => Err(index_rejected(key)),
        }
    }

    fn filter_mut(&mut self, filter: &Filter) -> Result<FoundMut<'_>> {
        reject_step(filter)?;
        let Some(name) = &filter.key else {
            return Ok(FoundMut::View(TypedView::new(self, filter.tag)));
        };

        let value = self
            .map
            .get_mut(name)
            .ok_or_else(|| Error::key_not_found(name.as_str()))?;
        check_tag(filter.tag, value)?;
        Ok(FoundMut::Value(value))
    }

    /// Look up a key that must resolve to a value, for in-place mutation.
    pub fn value_mut(&mut self, key: impl Into<Key>) -> Result<&mut Value> {
        self.lookup_mut(key)?.into_value()
    }

    /// Look up a key, mapping "not found" to `None`.
    ///
    /// Every other error still propagates.
    pub fn get(&self, key: impl Into<Key>) -> Result<Option<Found<'_>>> {
        match self.lookup(key) {
            Ok(found) => Ok(Some(found)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Look up a value, returning `default` if it is not found.
    pub fn get_or<'a>(&'a self, key: impl Into<Key>, default: &'a Value) -> Result<&'a Value> {
        match self.get(key)? {
            Some(found) => found.into_value(),
            None => Ok(default),
        }
    }

    /// Look up a key that must resolve to a value rather than a view.
    pub fn value(&self, key: impl Into<Key>) -> Result<&Value> {
        self.lookup(key)?.into_value()
    }

    /// Start an optional chain at `key`.
    pub fn probe(&self, key: impl Into<Key>) -> Probe<'_> {
        match self.lookup(key) {
            Ok(Found::Value(value)) => Probe::Value(value),
            _ => Probe::nothing(),
        }
    }

    /// Read-only filtered view of this dict.
    pub fn view(&self, tag: TypeTag) -> TypedView<&MagicDict> {
        TypedView::new(self, tag)
    }

    /// Writable filtered view of this dict.
    pub fn view_mut(&mut self, tag: TypeTag) -> TypedView<&mut MagicDict> {
        TypedView::new(self, tag)
    }

    /// Insert a value, enchanting it. Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.map.insert(key, value.into())
    }

    /// Insert a value under a key, which must be a name.
    pub fn set(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Result<Option<Value>> {
        self.map.set_key(&key.into(), value.into())
    }

    /// Remove a value. The key must be a name and must exist.
    pub fn remove(&mut self, key: impl Into<Key>) -> Result<Value> {
        self.map.remove_key(&key.into())
    }

    /// Remove a value if present.
    pub fn pop(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Merge entries in order; later entries override earlier ones.
    pub fn update<K, V, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in entries {
            self.insert(key, value);
        }
    }

    /// Merge entries addressed by arbitrary keys, which must all be names.
    pub fn try_update<V, I>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (Key, V)>,
        V: Into<Value>,
    {
        for (key, value) in entries {
            let name = require_name(&key)?;
            self.insert(name, value);
        }
        Ok(())
    }

    /// Convert back into a native JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.map
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_json()))
                .collect(),
        )
    }
}

impl TryFrom<serde_json::Value> for MagicDict {
    type Error = Error;

    fn try_from(native: serde_json::Value) -> Result<Self> {
        match native {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(Error::type_mismatch(format!(
                "expected a mapping, got {}",
                other
            ))),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MagicDict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for MagicDict {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.update(iter);
    }
}

impl IntoIterator for MagicDict {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

impl Serialize for MagicDict {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MagicDict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let native = serde_json::Value::deserialize(deserializer)?;
        MagicDict::try_from(native).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for MagicDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
