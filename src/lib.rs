//! Persistent hash map on a compact hash array mapped trie.
//!
//! Hash-Array Mapped Trie (HAMT) is a data structure popular as a map (a.k.a.
//! associative array or dictionary). Nodes in this crate keep entries and
//! children in a single array indexed by two bitmaps so that lookups touch as
//! few cache lines as possible, and a map is kept in a canonical shape after
//! every removal.
//!
//! Maps are immutable and share their sub-trees with each other. For batches
//! of edits, a [`Builder`] edits nodes it owns in place and is finished into
//! a new map.
//!
//! ```
//! use champ_map::Map;
//!
//! let map = Map::new().insert("foo", 1).insert("bar", 2);
//! let other = map.mutate(|builder| {
//!     builder.insert("baz", 3);
//!     builder.remove("foo");
//! });
//!
//! assert_eq!(map.get("foo"), Some(&1));
//! assert_eq!(other.get("foo"), None);
//! assert_eq!(other.len(), 2);
//! ```

mod bitmap;
mod bucket;
mod builder;
mod config;
mod iterator;
mod key_value;
mod map;
mod node;
mod owner;
#[cfg(test)]
mod proptests;
mod transient;
mod trie;
mod utilities;

pub use builder::Builder;
pub use iterator::{IntoIter, Iter, Keys, Values};
pub use map::Map;
