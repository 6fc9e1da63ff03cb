//! Path lookup in nested data.

use crate::error::{Error, Result};
use crate::key::{Key, parse_index};
use crate::walk::{Node, Segment};
use std::fmt;
use tracing::debug;

/// Delimiter used by the dotted path notation.
pub const DEFAULT_DELIMITER: &str = ".";

/// A path of [`Segment`]s from a root to a nested node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse dotted notation, e.g. `d.nested.1.foo`.
    ///
    /// Components that read as integers become indices, including forms
    /// such as ` 1` or `1_000`. Numerals too large for an index saturate and
    /// so never resolve.
    pub fn parse(path: &str) -> Self {
        path.split(DEFAULT_DELIMITER).map(parse_segment).collect()
    }

    /// Parse a path whose components are separated by `delimiter`.
    pub fn parse_with(path: &str, delimiter: &str) -> Result<Self> {
        if delimiter.is_empty() {
            return Err(Error::malformed_path("delimiter cannot be empty"));
        }
        Ok(path.split(delimiter).map(parse_segment).collect())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.segments.push(segment.into());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }
}

fn parse_segment(component: &str) -> Segment {
    match parse_index(component) {
        Some(index) => Segment::Index(index),
        None => Segment::Key(component.to_string()),
    }
}

impl fmt::Display for KeyPath {
    /// Dotted notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, segment) in self.segments.iter().enumerate() {
            if pos > 0 {
                f.write_str(DEFAULT_DELIMITER)?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl From<&str> for KeyPath {
    fn from(path: &str) -> Self {
        KeyPath::parse(path)
    }
}

impl From<String> for KeyPath {
    fn from(path: String) -> Self {
        KeyPath::parse(&path)
    }
}

impl From<Vec<Segment>> for KeyPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl From<&[Segment]> for KeyPath {
    fn from(segments: &[Segment]) -> Self {
        Self {
            segments: segments.to_vec(),
        }
    }
}

impl From<&KeyPath> for KeyPath {
    fn from(path: &KeyPath) -> Self {
        path.clone()
    }
}

impl<S: Into<Segment>> FromIterator<S> for KeyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<KeyPath> for Key {
    fn from(path: KeyPath) -> Self {
        Key::Path(path.segments.into_iter().map(Key::from).collect())
    }
}

impl From<&KeyPath> for Key {
    fn from(path: &KeyPath) -> Self {
        Key::from(path.clone())
    }
}

/// Resolve `path` against `root` by successive indexing.
///
/// A missing key, an out-of-range index or an attempt to index a scalar
/// fails with [`Error::KeyNotFound`] carrying the full path. The empty path
/// resolves to `root`.
pub fn lookup_path<N: Node>(root: &N, path: impl Into<KeyPath>) -> Result<&N> {
    let path = path.into();
    let mut node = root;
    for (pos, segment) in path.iter().enumerate() {
        node = match node.child(segment) {
            Some(child) => child,
            None => {
                debug!(%path, position = pos, "path lookup failed");
                return Err(Error::key_not_found(&path));
            }
        };
    }
    Ok(node)
}

/// Resolve `path` against `root`, returning `default` if it does not resolve.
pub fn lookup_path_or<'a, N: Node>(
    root: &'a N,
    path: impl Into<KeyPath>,
    default: &'a N,
) -> &'a N {
    lookup_path(root, path).unwrap_or(default)
}
