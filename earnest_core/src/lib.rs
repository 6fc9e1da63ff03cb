//! # Earnest Core
//!
//! Convenient, checked access to nested JSON-like data.
//!
//! This library provides two layers. The first works on plain
//! [`serde_json::Value`] documents: [`walk`] visits every node with its path
//! and [`lookup_path`] resolves dotted or segmented paths. The second wraps a
//! document in "magic" containers ([`MagicDict`], [`MagicList`]) whose single
//! lookup entry point handles plain keys, nested paths and type filters.
//!
//! ## Features
//!
//! - Pre-order and post-order walking of nested data
//! - Dotted path lookup with numeric index coercion and defaults
//! - Text-only keys, enforced at every mutation
//! - Type-checked single-key access and live type-filtered views
//! - An absorbing [`NOTHING`] container for optional chaining
//!
//! ## Example
//!
//! ```
//! use earnest_core::{Key, MagicDict, TypeTag, lookup_path};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = json!({"d": {"nested": [1, {"foo": "bar"}]}, "n": 3});
//!
//! // Plain documents
//! assert_eq!(lookup_path(&doc, "d.nested.1.foo")?, "bar");
//!
//! // Magic containers
//! let magic = MagicDict::try_from(doc)?;
//! assert_eq!(*magic.value(("d", "nested", 1, Key::typed("foo", TypeTag::Text)))?, "bar");
//! assert_eq!(magic.view(TypeTag::Int).keys().collect::<Vec<_>>(), vec!["n"]);
//! # Ok(())
//! # }
//! ```

mod dict;
mod error;
mod key;
mod list;
mod lookup;
mod nothing;
mod strmap;
mod value;
mod view;
mod walk;

pub use dict::{Found, FoundMut, MagicDict};
pub use error::{Error, Result};
pub use key::{Filter, Key, TypeTag};
pub use list::MagicList;
pub use lookup::{DEFAULT_DELIMITER, KeyPath, lookup_path, lookup_path_or};
pub use nothing::{NOTHING, Nothing, Probe};
pub use strmap::StrMap;
pub use value::{Scalar, Value};
pub use view::TypedView;
pub use walk::{Node, Order, Segment, Walk, walk, walk_parent_first};
