//! Persistent (immutable) containers.
//!
//! Every mutator on these types returns a *new* instance; the receiver
//! is never modified, so all existing references stay valid and observe
//! their original contents. Persistence is implemented with structural
//! sharing: a mutation rebuilds only the trie spine it touches and
//! shares every other subtree with the original, so the observable
//! copy-on-write contract comes at O(log32 N) per operation rather than
//! a full copy.
//!
//! - [`PersistentHashMap`]: immutable key/value mapping (HAMT)
//! - [`PersistentHashSet`]: immutable set over the same trie
//!
//! Both are conceptually value types: assignment and `clone` copy a
//! reference to shared structure, never the data, and no holder ever
//! observes another holder's changes. Because mutators never touch
//! shared state, reading a persistent container from many threads at
//! once is safe without locks.
//!
//! # Examples
//!
//! ```rust
//! use conifer::persistent::{PersistentHashMap, PersistentHashSet};
//!
//! let map = PersistentHashMap::new().insert("a".to_string(), 1);
//! let updated = map.insert("a".to_string(), 2);
//! assert_eq!(map.get("a"), Some(&1));     // Original unchanged
//! assert_eq!(updated.get("a"), Some(&2)); // New version
//!
//! let set = PersistentHashSet::new().insert(1);
//! let extended = set.insert(2);
//! assert_eq!(set.len(), 1);
//! assert_eq!(extended.len(), 2);
//! ```

mod hashmap;
mod hashset;

pub use hashmap::PersistentHashMap;
pub use hashmap::PersistentHashMapIntoIterator;
pub use hashmap::PersistentHashMapIterator;
pub use hashset::PersistentHashSet;
pub use hashset::PersistentHashSetIntoIterator;
pub use hashset::PersistentHashSetIterator;
