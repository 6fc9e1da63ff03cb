//! Depth-first walking of nested data.

use crate::key::Key;
use crate::value::Value;
use std::fmt;

/// One component of a path: a mapping key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(i64),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<i64> for Segment {
    fn from(index: i64) -> Self {
        Segment::Index(index)
    }
}

impl From<i32> for Segment {
    fn from(index: i32) -> Self {
        Segment::Index(index.into())
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

impl From<Segment> for Key {
    fn from(segment: Segment) -> Self {
        match segment {
            Segment::Key(key) => Key::Name(key),
            Segment::Index(index) => Key::Index(index),
        }
    }
}

/// Map a possibly negative index onto a position in a sequence of `len`.
pub(crate) fn sequence_position(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let pos = if index < 0 { len + index } else { index };
    (0..len).contains(&pos).then_some(pos as usize)
}

/// Nested data that can be walked and indexed by [`Segment`].
pub trait Node: Sized {
    /// Direct children with their path components. Scalars have none.
    fn children(&self) -> Vec<(Segment, &Self)>;

    /// The child at `segment`, if the kinds fit and it exists.
    fn child(&self, segment: &Segment) -> Option<&Self>;

    /// Whether [`Node::children`] would be non-empty.
    fn has_children(&self) -> bool {
        !self.children().is_empty()
    }
}

impl Node for serde_json::Value {
    fn children(&self) -> Vec<(Segment, &Self)> {
        match self {
            serde_json::Value::Object(map) => map
                .iter()
                .map(|(k, v)| (Segment::Key(k.clone()), v))
                .collect(),
            serde_json::Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (Segment::from(i), v))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn child(&self, segment: &Segment) -> Option<&Self> {
        match (self, segment) {
            (serde_json::Value::Object(map), Segment::Key(key)) => map.get(key),
            (serde_json::Value::Array(items), Segment::Index(index)) => {
                sequence_position(*index, items.len()).map(|pos| &items[pos])
            }
            _ => None,
        }
    }

    fn has_children(&self) -> bool {
        match self {
            serde_json::Value::Object(map) => !map.is_empty(),
            serde_json::Value::Array(items) => !items.is_empty(),
            _ => false,
        }
    }
}

impl Node for Value {
    fn children(&self) -> Vec<(Segment, &Self)> {
        match self {
            Value::Dict(dict) => dict.iter().map(|(k, v)| (Segment::from(k), v)).collect(),
            Value::List(list) => list
                .iter()
                .enumerate()
                .map(|(i, v)| (Segment::from(i), v))
                .collect(),
            Value::Scalar(_) => Vec::new(),
        }
    }

    fn child(&self, segment: &Segment) -> Option<&Self> {
        match (self, segment) {
            (Value::Dict(dict), Segment::Key(key)) => dict.get_value(key),
            (Value::List(list), Segment::Index(index)) => list.get(*index),
            _ => None,
        }
    }

    fn has_children(&self) -> bool {
        match self {
            Value::Dict(dict) => !dict.is_empty(),
            Value::List(list) => !list.is_empty(),
            Value::Scalar(_) => false,
        }
    }
}

/// Traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Pre-order: a node comes before its children.
    #[default]
    ParentFirst,
    /// Post-order: a node comes after its children.
    ParentLast,
}

struct Frame<'a, N> {
    path: Vec<Segment>,
    node: &'a N,
    expanded: bool,
}

impl<N> Clone for Frame<'_, N> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            node: self.node,
            expanded: self.expanded,
        }
    }
}

/// Lazy depth-first iterator over `(path, node)` pairs.
///
/// Cloning yields an independent iterator from the same position.
pub struct Walk<'a, N> {
    stack: Vec<Frame<'a, N>>,
    order: Order,
}

impl<N> Clone for Walk<'_, N> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            order: self.order,
        }
    }
}

impl<'a, N: Node> Walk<'a, N> {
    fn push_children(&mut self, path: &[Segment], node: &'a N) {
        // Reversed so that the first child is popped first.
        for (segment, child) in node.children().into_iter().rev() {
            let mut child_path = path.to_vec();
            child_path.push(segment);
            self.stack.push(Frame {
                path: child_path,
                node: child,
                expanded: false,
            });
        }
    }
}

impl<'a, N: Node> Iterator for Walk<'a, N> {
    type Item = (Vec<Segment>, &'a N);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.pop()?;
            match self.order {
                Order::ParentFirst => {
                    self.push_children(&frame.path, frame.node);
                    return Some((frame.path, frame.node));
                }
                Order::ParentLast => {
                    if frame.expanded || !frame.node.has_children() {
                        return Some((frame.path, frame.node));
                    }
                    let node = frame.node;
                    let path = frame.path.clone();
                    self.stack.push(Frame {
                        expanded: true,
                        ..frame
                    });
                    self.push_children(&path, node);
                }
            }
        }
    }
}

/// Walk `root` depth-first, yielding every node with its path.
///
/// The root is yielded with the empty path.
pub fn walk<N: Node>(root: &N, order: Order) -> Walk<'_, N> {
    Walk {
        stack: vec![Frame {
            path: Vec::new(),
            node: root,
            expanded: false,
        }],
        order,
    }
}

/// Walk `root` in pre-order.
pub fn walk_parent_first<N: Node>(root: &N) -> Walk<'_, N> {
    walk(root, Order::ParentFirst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "a": 1,
            "b": 2,
            "c": ["c1", "c2"],
            "d": {"nested": [1, {"foo": "bar", "baz": {}}]},
        })
    }

    fn dotted(path: &[Segment]) -> String {
        path.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    #[test]
    fn test_walk_parent_first() {
        let obj = sample();
        let paths: Vec<String> = walk_parent_first(&obj).map(|(p, _)| dotted(&p)).collect();
        assert_eq!(
            paths,
            vec![
                "", "a", "b", "c", "c.0", "c.1", "d", "d.nested", "d.nested.0",
                "d.nested.1", "d.nested.1.foo", "d.nested.1.baz",
            ]
        );
    }

    #[test]
    fn test_walk_parent_last() {
        let obj = sample();
        let paths: Vec<String> = walk(&obj, Order::ParentLast)
            .map(|(p, _)| dotted(&p))
            .collect();
        assert_eq!(
            paths,
            vec![
                "a", "b", "c.0", "c.1", "c", "d.nested.0", "d.nested.1.foo",
                "d.nested.1.baz", "d.nested.1", "d.nested", "d", "",
            ]
        );
    }

    #[test]
    fn test_walk_yields_nodes() {
        let obj = sample();
        let (path, root) = walk_parent_first(&obj).next().unwrap();
        assert!(path.is_empty());
        assert!(std::ptr::eq(root, &obj));

        let foo = walk_parent_first(&obj)
            .find(|(p, _)| dotted(p) == "d.nested.1.foo")
            .map(|(_, node)| node)
            .unwrap();
        assert_eq!(foo, &json!("bar"));
    }

    #[test]
    fn test_walk_scalar_root() {
        let obj = json!(42);
        let items: Vec<_> = walk(&obj, Order::ParentLast).collect();
        assert_eq!(items.len(), 1);
        assert!(items[0].0.is_empty());
    }

    #[test]
    fn test_walk_is_restartable() {
        let obj = sample();
        let mut first = walk_parent_first(&obj);
        first.next();
        let second = first.clone();
        assert_eq!(first.count(), second.count());
        assert_eq!(walk_parent_first(&obj).count(), 12);
    }

    #[test]
    fn test_walk_magic_value() {
        let value = Value::from(sample());
        let native: Vec<String> = walk_parent_first(&sample())
            .map(|(p, _)| dotted(&p))
            .collect();
        let magic: Vec<String> = walk_parent_first(&value)
            .map(|(p, _)| dotted(&p))
            .collect();
        assert_eq!(native, magic);
    }

    #[test]
    fn test_has_children() {
        assert!(sample().has_children());
        assert!(!json!({}).has_children());
        assert!(!json!([]).has_children());
        assert!(!json!("text").has_children());
        assert!(Value::from(json!([1])).has_children());
        assert!(!Value::from(json!({})).has_children());
        assert!(!Value::from(1).has_children());
    }

    #[test]
    fn test_huge_usize_does_not_wrap() {
        assert_eq!(Segment::from(usize::MAX), Segment::Index(i64::MAX));
        assert_eq!(json!(["x"]).child(&Segment::from(usize::MAX)), None);
    }

    #[test]
    fn test_child_negative_index() {
        let obj = json!(["x", "y"]);
        assert_eq!(obj.child(&Segment::Index(-1)), Some(&json!("y")));
        assert_eq!(obj.child(&Segment::Index(-3)), None);
        assert_eq!(obj.child(&Segment::from("0")), None);
    }
}
