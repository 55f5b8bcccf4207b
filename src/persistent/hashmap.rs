//! Persistent (immutable) hash map based on HAMT.
//!
//! This module provides [`PersistentHashMap`], an immutable key/value
//! mapping whose mutators return new maps and never touch the receiver.
//! Structural sharing keeps that cheap: a mutation rebuilds only the
//! spine from the root to the affected entry, about `log32 N` nodes.
//!
//! # Overview
//!
//! The map is a Hash Array Mapped Trie (HAMT): a 32-way branching trie
//! navigated by successive 5-bit fragments of each key's hash. Branch
//! nodes are bitmap-compressed, entries with fully colliding hashes fall
//! into a dedicated collision node, and subtrees are shared between map
//! versions through `Arc`.
//!
//! - O(log32 N) `get` / `insert` / `remove` (effectively O(1) in practice)
//! - O(1) `len` and `is_empty`
//!
//! # Examples
//!
//! ```rust
//! use conifer::persistent::PersistentHashMap;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2);
//!
//! // Structural sharing: the original map is preserved
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));       // Original unchanged
//! assert_eq!(updated.get("one"), Some(&100)); // New version
//! ```
//!
//! # Insert vs. overwrite
//!
//! [`insert`](PersistentHashMap::insert) overwrites an existing key;
//! [`try_insert`](PersistentHashMap::try_insert) refuses with
//! [`CollectionError::DuplicateKey`] instead. Callers that must notice an
//! accidental collision use `try_insert`; callers that want upsert
//! semantics use `insert`. The two are deliberately separate operations.

use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops;
use std::sync::Arc;

use crate::error::CollectionError;

// =============================================================================
// Constants and hash plumbing
// =============================================================================

/// Branching factor of the trie (2^5 = 32).
const BRANCHING_FACTOR: usize = 32;

/// Hash bits consumed per trie level.
const BITS_PER_LEVEL: usize = 5;

/// Mask extracting one level's fragment from a hash.
const FRAGMENT_MASK: u64 = (BRANCHING_FACTOR - 1) as u64;

/// Computes the full 64-bit hash of a key.
fn compute_hash<K: Hash + ?Sized>(key: &K) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Extracts the 5-bit fragment a node at `depth` branches on.
#[inline]
const fn hash_fragment(hash: u64, depth: usize) -> usize {
    ((hash >> (depth * BITS_PER_LEVEL)) & FRAGMENT_MASK) as usize
}

// =============================================================================
// Trie nodes
// =============================================================================

/// A trie node. Branch children hold nodes by value; a branch itself is
/// cheap to clone because its child slice sits behind an `Arc`.
#[derive(Clone)]
enum Node<K, V> {
    /// No entries (root of the empty map, or a vacated subtree).
    Empty,
    /// A single entry, stored with its full hash.
    Leaf { hash: u64, key: K, value: V },
    /// Bitmap-compressed interior node. Bit `i` of `bitmap` set means
    /// fragment `i` is occupied; its child sits at `popcount(bitmap
    /// below bit i)` in `children`.
    Branch {
        bitmap: u32,
        children: Arc<[Node<K, V>]>,
    },
    /// Two or more entries whose 64-bit hashes are fully equal.
    Collision { hash: u64, entries: Arc<[(K, V)]> },
}

/// Result of a structural insertion.
enum Insertion<K, V> {
    /// A rebuilt node; `added` is false when an existing value was
    /// overwritten.
    Done { node: Node<K, V>, added: bool },
    /// The key was already present and overwriting was not allowed.
    /// Nothing was rebuilt.
    Duplicate,
}

// =============================================================================
// PersistentHashMap
// =============================================================================

/// A persistent (immutable) hash map with structural sharing.
///
/// Every mutator returns a new map; existing references remain valid and
/// observe their original contents forever. Lookups on a map are
/// referentially stable once the map is in hand. Because no operation
/// mutates shared state, a `PersistentHashMap` behind an `Arc` may be
/// read from any number of threads simultaneously.
///
/// # Time Complexity
///
/// | Operation      | Complexity |
/// |----------------|------------|
/// | `new`          | O(1)       |
/// | `get`          | O(log32 N) |
/// | `insert`       | O(log32 N) |
/// | `try_insert`   | O(log32 N) |
/// | `remove`       | O(log32 N) |
/// | `len`          | O(1)       |
///
/// # Examples
///
/// ```rust
/// use conifer::persistent::PersistentHashMap;
///
/// let map = PersistentHashMap::singleton("key".to_string(), 42);
/// assert_eq!(map.get("key"), Some(&42));
/// ```
#[derive(Clone)]
pub struct PersistentHashMap<K, V> {
    root: Arc<Node<K, V>>,
    length: usize,
}

impl<K, V> PersistentHashMap<K, V> {
    /// Creates a new empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::persistent::PersistentHashMap;
    ///
    /// let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Arc::new(Node::Empty),
            length: 0,
        }
    }

    /// Returns the number of entries.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl<K: Clone + Hash + Eq, V: Clone> PersistentHashMap<K, V> {
    /// Creates a map containing a single entry.
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().insert(key, value)
    }

    /// Builds a map from key/value pairs, rejecting duplicate keys.
    ///
    /// Unlike collecting via `FromIterator` (which keeps the last value
    /// for a repeated key), construction aborts on the first duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateKey`] if two pairs share a key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::from_entries([(1, "one"), (2, "two")]).unwrap();
    /// assert_eq!(map.len(), 2);
    ///
    /// let duplicated = PersistentHashMap::from_entries([(1, "one"), (1, "uno")]);
    /// assert!(duplicated.is_err());
    /// ```
    pub fn from_entries<I>(entries: I) -> Result<Self, CollectionError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::new();
        for (key, value) in entries {
            map = map.try_insert(key, value)?;
        }
        Ok(map)
    }

    /// Returns a reference to the value corresponding to the key, or
    /// `None` if the key is absent. Never fails.
    ///
    /// The key may be any borrowed form of the map's key type, provided
    /// `Hash` and `Eq` on the borrowed form match the key type's.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("hello".to_string(), 42);
    ///
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_entry(key).map(|(_, value)| value)
    }

    /// Returns the value for a key, treating absence as an error.
    ///
    /// This is the indexed-access form: use it when a missing key means
    /// the caller's state is broken and the miss must surface
    /// immediately. For the never-failing form, use [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::KeyNotFound`] if the key is absent.
    pub fn lookup<Q>(&self, key: &Q) -> Result<&V, CollectionError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).ok_or(CollectionError::KeyNotFound)
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Walks the trie to the entry for `key`, if any.
    fn get_entry<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = compute_hash(key);
        let mut node = self.root.as_ref();
        let mut depth = 0;

        loop {
            match node {
                Node::Empty => return None,
                Node::Leaf {
                    hash: leaf_hash,
                    key: leaf_key,
                    value,
                } => {
                    return (*leaf_hash == hash && leaf_key.borrow() == key)
                        .then_some((leaf_key, value));
                }
                Node::Branch { bitmap, children } => {
                    let bit = 1u32 << hash_fragment(hash, depth);
                    if bitmap & bit == 0 {
                        return None;
                    }
                    let position = (bitmap & (bit - 1)).count_ones() as usize;
                    node = &children[position];
                    depth += 1;
                }
                Node::Collision {
                    hash: collision_hash,
                    entries,
                } => {
                    if *collision_hash != hash {
                        return None;
                    }
                    return entries
                        .iter()
                        .find(|(entry_key, _)| entry_key.borrow() == key)
                        .map(|(entry_key, value)| (entry_key, value));
                }
            }
        }
    }

    /// Inserts a key/value pair, overwriting any existing value for the
    /// key. Returns the new map.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::persistent::PersistentHashMap;
    ///
    /// let first = PersistentHashMap::new().insert("key".to_string(), 1);
    /// let second = first.insert("key".to_string(), 2);
    ///
    /// assert_eq!(first.get("key"), Some(&1));  // Original unchanged
    /// assert_eq!(second.get("key"), Some(&2)); // New version
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let hash = compute_hash(&key);
        match Self::insert_in_node(&self.root, key, value, hash, 0, true) {
            Insertion::Done { node, added } => Self {
                root: Arc::new(node),
                length: if added { self.length + 1 } else { self.length },
            },
            // Unreachable with overwriting enabled; keeping the original
            // is the correct no-op either way.
            Insertion::Duplicate => self.clone(),
        }
    }

    /// Inserts a key/value pair only if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateKey`] if the key is already
    /// present; no new map is produced in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::error::CollectionError;
    /// use conifer::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::singleton("key".to_string(), 1);
    ///
    /// assert!(map.try_insert("other".to_string(), 2).is_ok());
    /// assert_eq!(
    ///     map.try_insert("key".to_string(), 2).unwrap_err(),
    ///     CollectionError::DuplicateKey
    /// );
    /// ```
    pub fn try_insert(&self, key: K, value: V) -> Result<Self, CollectionError> {
        let hash = compute_hash(&key);
        match Self::insert_in_node(&self.root, key, value, hash, 0, false) {
            Insertion::Done { node, .. } => Ok(Self {
                root: Arc::new(node),
                length: self.length + 1,
            }),
            Insertion::Duplicate => Err(CollectionError::DuplicateKey),
        }
    }

    /// Recursive insertion. Rebuilds the spine from this node down to the
    /// affected entry; untouched siblings are shared with the original.
    fn insert_in_node(
        node: &Node<K, V>,
        key: K,
        value: V,
        hash: u64,
        depth: usize,
        overwrite: bool,
    ) -> Insertion<K, V> {
        match node {
            Node::Empty => Insertion::Done {
                node: Node::Leaf { hash, key, value },
                added: true,
            },
            Node::Leaf {
                hash: leaf_hash,
                key: leaf_key,
                value: leaf_value,
            } => {
                if *leaf_hash == hash && *leaf_key == key {
                    if overwrite {
                        Insertion::Done {
                            node: Node::Leaf { hash, key, value },
                            added: false,
                        }
                    } else {
                        Insertion::Duplicate
                    }
                } else if *leaf_hash == hash {
                    Insertion::Done {
                        node: Node::Collision {
                            hash,
                            entries: Arc::from(vec![
                                (leaf_key.clone(), leaf_value.clone()),
                                (key, value),
                            ]),
                        },
                        added: true,
                    }
                } else {
                    Insertion::Done {
                        node: Self::join_nodes(
                            node.clone(),
                            *leaf_hash,
                            Node::Leaf { hash, key, value },
                            hash,
                            depth,
                        ),
                        added: true,
                    }
                }
            }
            Node::Branch { bitmap, children } => {
                let bit = 1u32 << hash_fragment(hash, depth);
                let position = (bitmap & (bit - 1)).count_ones() as usize;

                if bitmap & bit == 0 {
                    let mut new_children = children.to_vec();
                    new_children.insert(position, Node::Leaf { hash, key, value });
                    Insertion::Done {
                        node: Node::Branch {
                            bitmap: bitmap | bit,
                            children: Arc::from(new_children),
                        },
                        added: true,
                    }
                } else {
                    match Self::insert_in_node(
                        &children[position],
                        key,
                        value,
                        hash,
                        depth + 1,
                        overwrite,
                    ) {
                        Insertion::Done { node, added } => {
                            let mut new_children = children.to_vec();
                            new_children[position] = node;
                            Insertion::Done {
                                node: Node::Branch {
                                    bitmap: *bitmap,
                                    children: Arc::from(new_children),
                                },
                                added,
                            }
                        }
                        Insertion::Duplicate => Insertion::Duplicate,
                    }
                }
            }
            Node::Collision {
                hash: collision_hash,
                entries,
            } => {
                if *collision_hash == hash {
                    Self::insert_in_collision(entries, key, value, hash, overwrite)
                } else {
                    Insertion::Done {
                        node: Self::join_nodes(
                            node.clone(),
                            *collision_hash,
                            Node::Leaf { hash, key, value },
                            hash,
                            depth,
                        ),
                        added: true,
                    }
                }
            }
        }
    }

    /// Insertion into a collision node whose hash matches the new key's.
    fn insert_in_collision(
        entries: &Arc<[(K, V)]>,
        key: K,
        value: V,
        hash: u64,
        overwrite: bool,
    ) -> Insertion<K, V> {
        match entries.iter().position(|(entry_key, _)| *entry_key == key) {
            Some(position) => {
                if overwrite {
                    let mut new_entries = entries.to_vec();
                    new_entries[position] = (key, value);
                    Insertion::Done {
                        node: Node::Collision {
                            hash,
                            entries: Arc::from(new_entries),
                        },
                        added: false,
                    }
                } else {
                    Insertion::Duplicate
                }
            }
            None => {
                let mut new_entries = entries.to_vec();
                new_entries.push((key, value));
                Insertion::Done {
                    node: Node::Collision {
                        hash,
                        entries: Arc::from(new_entries),
                    },
                    added: true,
                }
            }
        }
    }

    /// Builds the branch structure separating two nodes with different
    /// hashes, descending while their hash fragments still coincide.
    fn join_nodes(
        left: Node<K, V>,
        left_hash: u64,
        right: Node<K, V>,
        right_hash: u64,
        depth: usize,
    ) -> Node<K, V> {
        let left_fragment = hash_fragment(left_hash, depth);
        let right_fragment = hash_fragment(right_hash, depth);

        if left_fragment == right_fragment {
            let child = Self::join_nodes(left, left_hash, right, right_hash, depth + 1);
            Node::Branch {
                bitmap: 1u32 << left_fragment,
                children: Arc::from(vec![child]),
            }
        } else {
            let bitmap = (1u32 << left_fragment) | (1u32 << right_fragment);
            let children = if left_fragment < right_fragment {
                vec![left, right]
            } else {
                vec![right, left]
            };
            Node::Branch {
                bitmap,
                children: Arc::from(children),
            }
        }
    }

    /// Removes a key, returning a new map without it.
    ///
    /// If the key is absent the result is an unchanged clone of the
    /// receiver.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    /// let removed = map.remove("a");
    ///
    /// assert_eq!(map.len(), 2);     // Original unchanged
    /// assert_eq!(removed.len(), 1); // New version
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = compute_hash(key);
        match Self::remove_from_node(&self.root, key, hash, 0) {
            Some(new_root) => Self {
                root: Arc::new(new_root),
                length: self.length - 1,
            },
            None => self.clone(),
        }
    }

    /// Recursive removal. Returns `Some(replacement)` when the key was
    /// found and removed, `None` when nothing changed. Single-entry
    /// branches collapse on the way back up so the trie never keeps
    /// needless interior nodes.
    fn remove_from_node<Q>(
        node: &Node<K, V>,
        key: &Q,
        hash: u64,
        depth: usize,
    ) -> Option<Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match node {
            Node::Empty => None,
            Node::Leaf {
                hash: leaf_hash,
                key: leaf_key,
                ..
            } => (*leaf_hash == hash && leaf_key.borrow() == key).then_some(Node::Empty),
            Node::Branch { bitmap, children } => {
                let bit = 1u32 << hash_fragment(hash, depth);
                if bitmap & bit == 0 {
                    return None;
                }
                let position = (bitmap & (bit - 1)).count_ones() as usize;
                let replacement =
                    Self::remove_from_node(&children[position], key, hash, depth + 1)?;

                let mut new_children = children.to_vec();
                if matches!(replacement, Node::Empty) {
                    new_children.remove(position);
                    Some(Self::collapse_branch(bitmap & !bit, new_children))
                } else {
                    new_children[position] = replacement;
                    Some(Self::collapse_branch(*bitmap, new_children))
                }
            }
            Node::Collision {
                hash: collision_hash,
                entries,
            } => {
                if *collision_hash != hash {
                    return None;
                }
                let position = entries
                    .iter()
                    .position(|(entry_key, _)| entry_key.borrow() == key)?;

                let mut new_entries = entries.to_vec();
                new_entries.remove(position);

                if new_entries.len() == 1 {
                    let (remaining_key, remaining_value) = new_entries.swap_remove(0);
                    Some(Node::Leaf {
                        hash: *collision_hash,
                        key: remaining_key,
                        value: remaining_value,
                    })
                } else {
                    Some(Node::Collision {
                        hash: *collision_hash,
                        entries: Arc::from(new_entries),
                    })
                }
            }
        }
    }

    /// Rebuilds a branch after removal, lifting a lone leaf or collision
    /// child into its parent's slot. A lone branch child must stay: its
    /// placement depends on a deeper hash fragment.
    fn collapse_branch(bitmap: u32, mut children: Vec<Node<K, V>>) -> Node<K, V> {
        match children.len() {
            0 => Node::Empty,
            1 if matches!(children[0], Node::Leaf { .. } | Node::Collision { .. }) => {
                children.swap_remove(0)
            }
            _ => Node::Branch {
                bitmap,
                children: Arc::from(children),
            },
        }
    }

    /// Applies a function to the value for a key, returning the updated
    /// map, or `None` if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("count".to_string(), 10);
    /// let updated = map.update("count", |value| value + 1);
    ///
    /// assert_eq!(updated.unwrap().get("count"), Some(&11));
    /// ```
    #[must_use]
    pub fn update<Q, F>(&self, key: &Q, function: F) -> Option<Self>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> V,
    {
        let (stored_key, value) = self.get_entry(key)?;
        let new_value = function(value);
        Some(self.insert(stored_key.clone(), new_value))
    }

    /// Returns an iterator over key/value pairs.
    ///
    /// Iteration order follows the trie layout: stable for a given map
    /// value but otherwise unspecified.
    #[must_use]
    pub fn iter(&self) -> PersistentHashMapIterator<'_, K, V> {
        let mut entries = Vec::with_capacity(self.length);
        Self::collect_entries(&self.root, &mut entries);
        PersistentHashMapIterator {
            entries,
            current_index: 0,
        }
    }

    /// Collects every entry reachable from `node`, depth first.
    fn collect_entries<'a>(node: &'a Node<K, V>, entries: &mut Vec<(&'a K, &'a V)>) {
        match node {
            Node::Empty => {}
            Node::Leaf { key, value, .. } => entries.push((key, value)),
            Node::Branch { children, .. } => {
                for child in children.iter() {
                    Self::collect_entries(child, entries);
                }
            }
            Node::Collision {
                entries: collision_entries,
                ..
            } => {
                for (key, value) in collision_entries.iter() {
                    entries.push((key, value));
                }
            }
        }
    }

    /// Returns an iterator over keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// A borrowing iterator over the entries of a [`PersistentHashMap`].
pub struct PersistentHashMapIterator<'a, K, V> {
    entries: Vec<(&'a K, &'a V)>,
    current_index: usize,
}

impl<'a, K, V> Iterator for PersistentHashMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.entries.len() {
            None
        } else {
            let entry = self.entries[self.current_index];
            self.current_index += 1;
            Some(entry)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.entries.len().saturating_sub(self.current_index);
        (remaining, Some(remaining))
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIterator<'_, K, V> {
    fn len(&self) -> usize {
        self.entries.len().saturating_sub(self.current_index)
    }
}

/// An owning iterator over the entries of a [`PersistentHashMap`].
pub struct PersistentHashMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for PersistentHashMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIntoIterator<K, V> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for PersistentHashMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> FromIterator<(K, V)> for PersistentHashMap<K, V> {
    /// Collects pairs with last-wins semantics on repeated keys. Use
    /// [`PersistentHashMap::from_entries`] to reject duplicates instead.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map = map.insert(key, value);
        }
        map
    }
}

impl<K: Clone + Hash + Eq, V: Clone> IntoIterator for PersistentHashMap<K, V> {
    type Item = (K, V);
    type IntoIter = PersistentHashMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let entries: Vec<(K, V)> = self
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        PersistentHashMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K: Clone + Hash + Eq, V: Clone> IntoIterator for &'a PersistentHashMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentHashMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, Q> ops::Index<&Q> for PersistentHashMap<K, V>
where
    K: Clone + Hash + Eq + Borrow<Q>,
    V: Clone,
    Q: Hash + Eq + ?Sized,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is absent, per the indexing contract. Use
    /// [`PersistentHashMap::lookup`] for the error-returning form.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("{}", CollectionError::KeyNotFound),
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone + PartialEq> PartialEq for PersistentHashMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Clone + Hash + Eq, V: Clone + Eq> Eq for PersistentHashMap<K, V> {}

impl<K: Clone + Hash + Eq + fmt::Debug, V: Clone + fmt::Debug> fmt::Debug
    for PersistentHashMap<K, V>
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Key whose hash is fixed by construction, for forcing collisions.
    #[derive(Clone, Debug, PartialEq, Eq)]
    struct CollidingKey {
        name: &'static str,
        bucket: u64,
    }

    impl Hash for CollidingKey {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.bucket.hash(state);
        }
    }

    #[rstest]
    fn test_new_creates_empty() {
        let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }

    #[rstest]
    fn test_insert_and_get() {
        let map = PersistentHashMap::new()
            .insert("one".to_string(), 1)
            .insert("two".to_string(), 2);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("one"), Some(&1));
        assert_eq!(map.get("two"), Some(&2));
        assert_eq!(map.get("three"), None);
    }

    #[rstest]
    fn test_insert_overwrites_without_touching_receiver() {
        let first = PersistentHashMap::new().insert("key".to_string(), 1);
        let second = first.insert("key".to_string(), 2);

        assert_eq!(first.get("key"), Some(&1));
        assert_eq!(second.get("key"), Some(&2));
        assert_eq!(second.len(), 1);
    }

    #[rstest]
    fn test_try_insert_rejects_duplicate() {
        let map = PersistentHashMap::singleton("key".to_string(), 1);

        let extended = map.try_insert("other".to_string(), 2).unwrap();
        assert_eq!(extended.len(), 2);

        assert_eq!(
            map.try_insert("key".to_string(), 99),
            Err(CollectionError::DuplicateKey)
        );
        assert_eq!(map.get("key"), Some(&1));
    }

    #[rstest]
    fn test_from_entries_rejects_duplicates() {
        let unique = PersistentHashMap::from_entries([(1, "a"), (2, "b")]).unwrap();
        assert_eq!(unique.len(), 2);

        assert_eq!(
            PersistentHashMap::from_entries([(1, "a"), (1, "b")]),
            Err(CollectionError::DuplicateKey)
        );
    }

    #[rstest]
    fn test_lookup_reports_missing_key() {
        let map = PersistentHashMap::singleton(1, "one");
        assert_eq!(map.lookup(&1), Ok(&"one"));
        assert_eq!(map.lookup(&2), Err(CollectionError::KeyNotFound));
    }

    #[rstest]
    #[should_panic(expected = "key not found")]
    fn test_index_panics_on_missing_key() {
        let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
        let _ = map[&"absent".to_string()];
    }

    #[rstest]
    fn test_remove() {
        let map = PersistentHashMap::new()
            .insert("a".to_string(), 1)
            .insert("b".to_string(), 2);
        let removed = map.remove("a");

        assert_eq!(map.len(), 2);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed.get("a"), None);
        assert_eq!(removed.get("b"), Some(&2));
    }

    #[rstest]
    fn test_remove_absent_key_is_noop() {
        let map = PersistentHashMap::singleton(1, "one");
        let unchanged = map.remove(&2);
        assert_eq!(unchanged, map);
    }

    #[rstest]
    fn test_update_existing_key() {
        let map = PersistentHashMap::new().insert("count".to_string(), 10);
        let updated = map.update("count", |value| value + 1).unwrap();

        assert_eq!(map.get("count"), Some(&10));
        assert_eq!(updated.get("count"), Some(&11));
    }

    #[rstest]
    fn test_update_missing_key_returns_none() {
        let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
        assert!(map.update("absent", |value| value + 1).is_none());
    }

    #[rstest]
    fn test_colliding_hashes_share_a_collision_node() {
        let first = CollidingKey {
            name: "first",
            bucket: 7,
        };
        let second = CollidingKey {
            name: "second",
            bucket: 7,
        };

        let map = PersistentHashMap::new()
            .insert(first.clone(), 1)
            .insert(second.clone(), 2);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&first), Some(&1));
        assert_eq!(map.get(&second), Some(&2));

        let shrunk = map.remove(&first);
        assert_eq!(shrunk.get(&first), None);
        assert_eq!(shrunk.get(&second), Some(&2));
    }

    #[rstest]
    fn test_collision_try_insert_rejects_duplicate() {
        let key = CollidingKey {
            name: "only",
            bucket: 3,
        };
        let twin = CollidingKey {
            name: "twin",
            bucket: 3,
        };
        let map = PersistentHashMap::new()
            .insert(key.clone(), 1)
            .insert(twin, 2);

        assert_eq!(map.try_insert(key, 9), Err(CollectionError::DuplicateKey));
    }

    #[rstest]
    fn test_deep_trie_round_trip() {
        let map: PersistentHashMap<i32, i32> = (0..1_000).map(|n| (n, n * 2)).collect();

        assert_eq!(map.len(), 1_000);
        for n in 0..1_000 {
            assert_eq!(map.get(&n), Some(&(n * 2)));
        }
    }

    #[rstest]
    fn test_remove_everything_leaves_empty_map() {
        let full: PersistentHashMap<i32, i32> = (0..100).map(|n| (n, n)).collect();
        let mut map = full.clone();
        for n in 0..100 {
            map = map.remove(&n);
        }

        assert!(map.is_empty());
        assert_eq!(full.len(), 100);
    }

    #[rstest]
    fn test_eq_ignores_insertion_order() {
        let forward: PersistentHashMap<i32, i32> = (0..50).map(|n| (n, n)).collect();
        let backward: PersistentHashMap<i32, i32> = (0..50).rev().map(|n| (n, n)).collect();
        assert_eq!(forward, backward);
    }

    #[rstest]
    fn test_iter_yields_every_entry_once() {
        let map: PersistentHashMap<i32, i32> = (0..64).map(|n| (n, n)).collect();
        let mut keys: Vec<i32> = map.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..64).collect::<Vec<_>>());
    }
}
