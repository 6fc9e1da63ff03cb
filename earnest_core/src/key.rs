//! Lookup keys and type tags.
//!
//! A [`Key`] is everything a magic container can be indexed with: a plain
//! name, a sequence index, a type filter, or a path made of other keys.

use crate::error::{Error, Result};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// Category of a value, used for type filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    Bool,
    Int,
    Float,
    Text,
    Dict,
    List,
}

impl TypeTag {
    /// Every recognized tag.
    pub const ALL: [TypeTag; 6] = [
        TypeTag::Bool,
        TypeTag::Int,
        TypeTag::Float,
        TypeTag::Text,
        TypeTag::Dict,
        TypeTag::List,
    ];

    /// Get the tag's filter name.
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Text => "str",
            TypeTag::Dict => "dict",
            TypeTag::List => "list",
        }
    }

    /// Parse a tag from its filter name.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "bool" => Ok(TypeTag::Bool),
            "int" => Ok(TypeTag::Int),
            "float" => Ok(TypeTag::Float),
            "str" => Ok(TypeTag::Text),
            "dict" => Ok(TypeTag::Dict),
            "list" => Ok(TypeTag::List),
            _ => Err(Error::invalid_type_filter(name)),
        }
    }

    /// Classify a value. Null has no tag.
    pub fn of(value: &Value) -> Option<Self> {
        value.type_tag()
    }

    /// Check whether `value` belongs to this category.
    ///
    /// Booleans are not integers.
    pub fn matches(self, value: &Value) -> bool {
        value.type_tag() == Some(self)
    }

    /// Whether this tag names a scalar category.
    pub fn is_scalar(self) -> bool {
        !matches!(self, TypeTag::Dict | TypeTag::List)
    }
}

impl FromStr for TypeTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TypeTag::parse(s)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type filter, optionally bound to one key.
///
/// Without a key it selects a filtered view of the whole mapping; with a key
/// it fetches that single value and asserts its type. `step` exists so that
/// stepped filter expressions can be represented and rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub key: Option<String>,
    pub tag: TypeTag,
    pub step: Option<i64>,
}

impl Filter {
    /// Filter selecting a view of all values of `tag`.
    pub fn view(tag: TypeTag) -> Self {
        Self {
            key: None,
            tag,
            step: None,
        }
    }

    /// Filter fetching `key` and asserting its type.
    pub fn typed(key: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            key: Some(key.into()),
            tag,
            step: None,
        }
    }

    /// Attach a step.
    pub fn with_step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }
}

/// A key accepted by magic container lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Mapping key.
    Name(String),
    /// Sequence index; negative values count from the end.
    Index(i64),
    /// Type filter.
    Filter(Filter),
    /// Nested lookup, one component per level.
    Path(Vec<Key>),
}

impl Key {
    /// Build a path key from components.
    pub fn path<I, K>(components: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Key::Path(components.into_iter().map(Into::into).collect())
    }

    /// Key selecting a filtered view of all values of `tag`.
    pub fn of_type(tag: TypeTag) -> Self {
        Key::Filter(Filter::view(tag))
    }

    /// Key fetching `name` and asserting its type.
    pub fn typed(name: impl Into<String>, tag: TypeTag) -> Self {
        Key::Filter(Filter::typed(name, tag))
    }

    /// The name, if this is a plain mapping key.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Whether this key may appear before the last component of a path.
    pub fn is_path_step(&self) -> bool {
        matches!(self, Key::Name(_) | Key::Index(_))
    }

    /// Parse a key expression.
    ///
    /// Components are separated by `delimiter`; components that parse as
    /// integers become indices. The last component may carry a type filter
    /// as `name:tag`, `:tag` or `name:tag:step`. A single component yields a
    /// non-path key.
    pub fn parse(expr: &str, delimiter: &str) -> Result<Self> {
        if delimiter.is_empty() {
            return Err(Error::malformed_path("delimiter cannot be empty"));
        }

        let mut components: Vec<&str> = expr.split(delimiter).collect();
        let last = components.pop().unwrap_or_default();

        let mut keys: Vec<Key> = components.into_iter().map(parse_component).collect();
        keys.push(parse_last_component(last)?);

        if keys.len() == 1 {
            Ok(keys.remove(0))
        } else {
            Ok(Key::Path(keys))
        }
    }
}

fn parse_component(component: &str) -> Key {
    match parse_index(component) {
        Some(index) => Key::Index(index),
        None => Key::Name(component.to_string()),
    }
}

/// Read a path component as an integer index.
///
/// Accepts surrounding whitespace, a leading sign and single underscores
/// between digits. Numerals outside the `i64` range saturate, so they never
/// fall back to being names and never resolve.
pub(crate) fn parse_index(component: &str) -> Option<i64> {
    let trimmed = component.trim();
    let (negative, digits) = match trimmed.as_bytes().first()? {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let well_formed = !digits.is_empty()
        && digits.split('_').all(|group| {
            !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit())
        });
    if !well_formed {
        return None;
    }

    let magnitude = digits
        .bytes()
        .filter(u8::is_ascii_digit)
        .try_fold(0i128, |acc, b| {
            acc.checked_mul(10)?.checked_add(i128::from(b - b'0'))
        });
    let value = match magnitude {
        Some(m) if negative => -m,
        Some(m) => m,
        None if negative => i128::MIN,
        None => i128::MAX,
    };
    Some(value.clamp(i64::MIN.into(), i64::MAX.into()) as i64)
}

fn parse_last_component(component: &str) -> Result<Key> {
    let mut parts = component.splitn(3, ':');
    let name = parts.next().unwrap_or_default();
    let Some(tag) = parts.next() else {
        return Ok(parse_component(name));
    };

    let tag = TypeTag::parse(tag)?;
    let step = parts
        .next()
        .map(|step| {
            step.parse::<i64>()
                .map_err(|_| Error::malformed_path(format!("invalid filter step: {}", step)))
        })
        .transpose()?;

    Ok(Key::Filter(Filter {
        key: (!name.is_empty()).then(|| name.to_string()),
        tag,
        step,
    }))
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => write!(f, "{:?}", name),
            Key::Index(index) => write!(f, "{}", index),
            Key::Filter(filter) => {
                if let Some(key) = &filter.key {
                    write!(f, "{:?}", key)?;
                }
                write!(f, ":{}", filter.tag)?;
                if let Some(step) = filter.step {
                    write!(f, ":{}", step)?;
                }
                Ok(())
            }
            Key::Path(components) => {
                f.write_str("[")?;
                for (pos, component) in components.iter().enumerate() {
                    if pos > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", component)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key::Name(name.clone())
    }
}

impl From<i64> for Key {
    fn from(index: i64) -> Self {
        Key::Index(index)
    }
}

impl From<i32> for Key {
    fn from(index: i32) -> Self {
        Key::Index(index.into())
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

impl From<Filter> for Key {
    fn from(filter: Filter) -> Self {
        Key::Filter(filter)
    }
}

impl From<Vec<Key>> for Key {
    fn from(components: Vec<Key>) -> Self {
        Key::Path(components)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl<A: Into<Key>, B: Into<Key>> From<(A, B)> for Key {
    fn from((a, b): (A, B)) -> Self {
        Key::Path(vec![a.into(), b.into()])
    }
}

impl<A: Into<Key>, B: Into<Key>, C: Into<Key>> From<(A, B, C)> for Key {
    fn from((a, b, c): (A, B, C)) -> Self {
        Key::Path(vec![a.into(), b.into(), c.into()])
    }
}

impl<A: Into<Key>, B: Into<Key>, C: Into<Key>, D: Into<Key>> From<(A, B, C, D)> for Key {
    fn from((a, b, c, d): (A, B, C, D)) -> Self {
        Key::Path(vec![a.into(), b.into(), c.into(), d.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag_conversions() {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::parse(tag.as_str()).unwrap(), tag);
            assert_eq!(tag.to_string().parse::<TypeTag>().unwrap(), tag);
        }

        let err = TypeTag::parse("invalid-type-filter").unwrap_err();
        assert!(matches!(err, Error::InvalidTypeFilter { name } if name == "invalid-type-filter"));
        assert!(TypeTag::parse("").is_err());
        assert!(TypeTag::parse("Int").is_err());
    }

    #[test]
    fn test_type_tag_matches() {
        assert!(TypeTag::Bool.matches(&Value::from(true)));
        assert!(!TypeTag::Int.matches(&Value::from(true)));
        assert!(TypeTag::Int.matches(&Value::from(u64::MAX)));
        assert!(TypeTag::Float.matches(&Value::from(1.5)));
        assert!(!TypeTag::Float.matches(&Value::from(1)));
        assert!(TypeTag::Text.matches(&Value::from("x")));
        assert!(!TypeTag::List.matches(&Value::from("x")));
        assert_eq!(TypeTag::of(&Value::NULL), None);
        assert!(TypeTag::Text.is_scalar());
        assert!(!TypeTag::Dict.is_scalar());
    }

    #[test]
    fn test_tuple_conversion() {
        let key = Key::from(("a", 0, "b"));
        assert_eq!(
            key,
            Key::Path(vec![
                Key::Name("a".to_string()),
                Key::Index(0),
                Key::Name("b".to_string()),
            ])
        );
        assert_eq!(Key::path(["d1", "s1"]), Key::from(("d1", "s1")));
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(Key::parse("a", ".").unwrap(), Key::from("a"));
        assert_eq!(Key::parse("3", ".").unwrap(), Key::Index(3));
        assert_eq!(Key::parse("-1", ".").unwrap(), Key::Index(-1));
        assert_eq!(Key::parse("", ".").unwrap(), Key::from(""));
    }

    #[test]
    fn test_parse_path() {
        assert_eq!(
            Key::parse("d.nested.1.foo", ".").unwrap(),
            Key::from(("d", "nested", 1, "foo"))
        );
        assert_eq!(
            Key::parse("d/nested", "/").unwrap(),
            Key::from(("d", "nested"))
        );
        assert!(matches!(
            Key::parse("a.b", ""),
            Err(Error::MalformedPath { .. })
        ));
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!(
            Key::parse(":int", ".").unwrap(),
            Key::of_type(TypeTag::Int)
        );
        assert_eq!(
            Key::parse("d1.s1:str", ".").unwrap(),
            Key::from(("d1", Key::typed("s1", TypeTag::Text)))
        );
        assert_eq!(
            Key::parse("a:int:2", ".").unwrap(),
            Key::Filter(Filter::typed("a", TypeTag::Int).with_step(2))
        );
        assert!(matches!(
            Key::parse("a:nope", "."),
            Err(Error::InvalidTypeFilter { .. })
        ));
        assert!(matches!(
            Key::parse("a:int:x", "."),
            Err(Error::MalformedPath { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Key::from("a").to_string(), "\"a\"");
        assert_eq!(Key::Index(-2).to_string(), "-2");
        assert_eq!(Key::of_type(TypeTag::Bool).to_string(), ":bool");
        assert_eq!(Key::typed("s1", TypeTag::Text).to_string(), "\"s1\":str");
        assert_eq!(Key::from((0, "x")).to_string(), "[0, \"x\"]");
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("12"), Some(12));
        assert_eq!(parse_index("-3"), Some(-3));
        assert_eq!(parse_index("+4"), Some(4));
        assert_eq!(parse_index(" 1 "), Some(1));
        assert_eq!(parse_index("1_000"), Some(1000));
        assert_eq!(parse_index("007"), Some(7));
        assert_eq!(parse_index("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_index("-99999999999999999999"), Some(i64::MIN));

        for text in ["", " ", "-", "1_", "_1", "1__0", "1.5", "0x10", "one", "1 2"] {
            assert_eq!(parse_index(text), None, "{:?}", text);
        }
    }

    #[test]
    fn test_parse_wide_numerals_become_indices() {
        assert_eq!(Key::parse("a. 1", ".").unwrap(), Key::from(("a", 1)));
        assert_eq!(
            Key::parse("a.99999999999999999999", ".").unwrap(),
            Key::from(("a", i64::MAX))
        );
    }

    #[test]
    fn test_huge_usize_does_not_wrap() {
        assert_eq!(Key::from(usize::MAX), Key::Index(i64::MAX));
    }
}
