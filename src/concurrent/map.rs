//! Shared hash map with atomic compound operations.
//!
//! [`ConcurrentHashMap`] serializes every mutating operation internally,
//! so any number of threads may hold references to one instance and call
//! [`try_add`], [`try_remove`], [`try_update`], [`get_or_add`] and
//! [`add_or_update`] concurrently. Each compound operation is atomic:
//! its read-check-write sequence runs under one lock acquisition, and
//! concurrent operations on the same key always produce a result
//! consistent with some serial order.
//!
//! # Design
//!
//! The map is sharded: keys are distributed over an array of
//! `parking_lot::RwLock<HashMap>` buckets by their hash, so operations
//! on different keys mostly contend on different locks. The shard count
//! and per-shard capacity come from [`ConcurrentMapOptions`] and are
//! advisory sizing hints; they never change observable semantics.
//!
//! The synchronization wrapper is deliberately the *only* surface — no
//! unsynchronized accessor to the backing storage exists, so the per-key
//! atomicity guarantees cannot be bypassed.
//!
//! Absence and presence are ordinary outcomes here, signaled through
//! `bool`/`Option` returns, never through errors. The only fallible
//! entry point is configuration: see [`ConcurrentHashMap::with_options`].
//!
//! # Examples
//!
//! ```rust
//! use conifer::concurrent::ConcurrentHashMap;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let map = Arc::new(ConcurrentHashMap::new());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|_| {
//!         let map = Arc::clone(&map);
//!         thread::spawn(move || {
//!             map.add_or_update("count".to_string(), 1, |_, value| value + 1)
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(map.get("count"), Some(4));
//! ```
//!
//! [`try_add`]: ConcurrentHashMap::try_add
//! [`try_remove`]: ConcurrentHashMap::try_remove
//! [`try_update`]: ConcurrentHashMap::try_update
//! [`get_or_add`]: ConcurrentHashMap::get_or_add
//! [`add_or_update`]: ConcurrentHashMap::add_or_update

use std::borrow::Borrow;
use std::collections::HashMap;
use std::collections::hash_map::{Entry, RandomState};
use std::fmt;
use std::hash::{BuildHasher, Hash};

use parking_lot::RwLock;

use crate::error::CollectionError;

// =============================================================================
// Configuration
// =============================================================================

/// Sizing hints for a [`ConcurrentHashMap`].
///
/// Both fields are advisory: they tune memory layout and lock
/// granularity and never change what any operation returns. This single
/// structure replaces a pile of constructor overloads that would differ
/// only in which hints they accept.
///
/// # Examples
///
/// ```rust
/// use conifer::concurrent::{ConcurrentHashMap, ConcurrentMapOptions};
///
/// let options = ConcurrentMapOptions {
///     capacity: 1024,
///     shard_count: Some(16),
/// };
/// let map: ConcurrentHashMap<String, i32> =
///     ConcurrentHashMap::with_options(options).unwrap();
/// assert!(map.is_empty());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConcurrentMapOptions {
    /// Expected total number of entries; pre-sizes the shards.
    pub capacity: usize,
    /// Number of independently locked shards. `None` derives the count
    /// from the machine's parallelism. An explicit count must be a
    /// power of two, because shard selection masks hash bits.
    pub shard_count: Option<usize>,
}

/// Default shard count: enough locks that threads rarely collide, kept
/// a power of two for mask-based selection.
fn default_shard_count() -> usize {
    (num_cpus::get() * 4).next_power_of_two()
}

// =============================================================================
// ConcurrentHashMap
// =============================================================================

/// A shared key/value mapping with atomic compound operations.
///
/// All operations take `&self`; share the map by putting it in an `Arc`
/// and cloning the handle. The map is `Send + Sync` when `K`, `V` and
/// `S` are `Send + Sync`.
///
/// Key identity is decided by `Hash` + `Eq` under the map's hasher `S`
/// (default [`RandomState`]); supplying a custom `BuildHasher` is how a
/// caller substitutes its own notion of key equality's hash.
///
/// # Atomicity
///
/// Every compound operation acquires exactly one shard's write lock for
/// its whole read-check-write sequence, giving serializability per key:
/// two concurrent [`try_add`](Self::try_add) calls for the same absent
/// key cannot both succeed, and exactly one of several concurrent
/// [`try_remove`](Self::try_remove) callers observes the value. Reads
/// take the shard's read lock and never see a partially applied write.
///
/// # Examples
///
/// ```rust
/// use conifer::concurrent::ConcurrentHashMap;
///
/// let map = ConcurrentHashMap::new();
/// assert!(map.try_add("key".to_string(), 1));
/// assert!(!map.try_add("key".to_string(), 2));
/// assert_eq!(map.get("key"), Some(1));
/// ```
pub struct ConcurrentHashMap<K, V, S = RandomState> {
    shards: Box<[RwLock<HashMap<K, V, S>>]>,
    hasher: S,
}

impl<K, V> ConcurrentHashMap<K, V, RandomState> {
    /// Creates a new empty map with default sizing.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sizing(ConcurrentMapOptions::default(), RandomState::new(), None)
    }

    /// Creates a new empty map from sizing hints.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::InvalidArgument`] if an explicit
    /// `shard_count` is not a power of two.
    pub fn with_options(options: ConcurrentMapOptions) -> Result<Self, CollectionError> {
        Self::with_options_and_hasher(options, RandomState::new())
    }
}

impl<K, V, S: BuildHasher + Clone> ConcurrentHashMap<K, V, S> {
    /// Creates a new empty map that hashes keys with `hasher`.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_sizing(ConcurrentMapOptions::default(), hasher, None)
    }

    /// Creates a new empty map from sizing hints and a hasher.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::InvalidArgument`] if an explicit
    /// `shard_count` is not a power of two.
    pub fn with_options_and_hasher(
        options: ConcurrentMapOptions,
        hasher: S,
    ) -> Result<Self, CollectionError> {
        let shard_count = match options.shard_count {
            Some(count) if !count.is_power_of_two() => {
                return Err(CollectionError::InvalidArgument(
                    "shard count must be a power of two",
                ));
            }
            other => other,
        };
        Ok(Self::with_sizing(options, hasher, shard_count))
    }

    /// Builds the shard array. `shard_count`, when given, has been
    /// validated as a power of two.
    fn with_sizing(options: ConcurrentMapOptions, hasher: S, shard_count: Option<usize>) -> Self {
        let shard_count = shard_count.unwrap_or_else(default_shard_count);
        let per_shard_capacity = options.capacity.div_ceil(shard_count);

        let shards = (0..shard_count)
            .map(|_| {
                RwLock::new(HashMap::with_capacity_and_hasher(
                    per_shard_capacity,
                    hasher.clone(),
                ))
            })
            .collect();

        Self { shards, hasher }
    }

    /// Returns the number of shards the map was built with.
    #[must_use]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Picks the shard responsible for `key`.
    fn shard_for<Q>(&self, key: &Q) -> &RwLock<HashMap<K, V, S>>
    where
        Q: Hash + ?Sized,
    {
        // Shard count is a power of two, so masking the hash is a
        // uniform selection.
        let hash = self.hasher.hash_one(key) as usize;
        &self.shards[hash & (self.shards.len() - 1)]
    }
}

impl<K: Hash + Eq, V, S: BuildHasher + Clone> ConcurrentHashMap<K, V, S> {
    /// Inserts the pair iff `key` is absent. Returns `true` on insert,
    /// `false` (and no change) when the key is already present.
    ///
    /// Atomic: of any number of concurrent `try_add` calls for the same
    /// absent key, exactly one returns `true`, and the map's value for
    /// the key is that caller's.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::concurrent::ConcurrentHashMap;
    ///
    /// let map = ConcurrentHashMap::new();
    /// assert!(map.try_add(1, "first"));
    /// assert!(!map.try_add(1, "second"));
    /// ```
    pub fn try_add(&self, key: K, value: V) -> bool {
        let mut shard = self.shard_for(&key).write();
        match shard.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(value);
                true
            }
        }
    }

    /// Removes `key` and returns its value, or `None` if absent.
    ///
    /// Atomic remove-and-return: of any number of concurrent
    /// `try_remove` calls for the same key, exactly one observes
    /// `Some`.
    pub fn try_remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard_for(key).write().remove(key)
    }

    /// Replaces the value for `key` with `new_value` iff the key is
    /// present *and* its current value equals `expected` — a
    /// compare-and-swap. Returns `false` otherwise, including when the
    /// key is absent.
    ///
    /// This is the conditional-write primitive optimistic updates build
    /// on: read a value, compute, then `try_update` with the value read
    /// as `expected`; a `false` result means a concurrent writer got
    /// there first and the caller should re-read.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::concurrent::ConcurrentHashMap;
    ///
    /// let map = ConcurrentHashMap::new();
    /// map.try_add("key".to_string(), 1);
    ///
    /// assert!(map.try_update("key", 2, &1));
    /// assert!(!map.try_update("key", 3, &1)); // Value is 2 now
    /// assert!(!map.try_update("gone", 3, &1)); // Absent key
    /// ```
    pub fn try_update<Q>(&self, key: &Q, new_value: V, expected: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        let mut shard = self.shard_for(key).write();
        match shard.get_mut(key) {
            Some(current) if current == expected => {
                *current = new_value;
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if the map currently contains `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard_for(key).read().contains_key(key)
    }
}

impl<K: Hash + Eq, V: Clone, S: BuildHasher + Clone> ConcurrentHashMap<K, V, S> {
    /// Returns a clone of the value for `key`, or `None` if absent.
    ///
    /// Values are cloned out rather than borrowed so no lock is held
    /// after the call returns.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard_for(key).read().get(key).cloned()
    }

    /// Returns the current value for `key`, inserting `value` first if
    /// the key is absent. Every caller gets the value that actually
    /// ended up in the map.
    #[must_use]
    pub fn get_or_add(&self, key: K, value: V) -> V {
        if let Some(existing) = self.shard_for(&key).read().get(&key) {
            return existing.clone();
        }
        let mut shard = self.shard_for(&key).write();
        shard.entry(key).or_insert(value).clone()
    }

    /// Returns the current value for `key`, computing and inserting one
    /// with `factory` if the key is absent.
    ///
    /// The factory runs *outside* the shard lock, so under contention it
    /// may be invoked by more than one caller. Only one invocation's
    /// result is ever inserted, and every caller returns that one
    /// visible value — callers must not rely on side effects of the
    /// factory beyond its return value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::concurrent::ConcurrentHashMap;
    ///
    /// let map = ConcurrentHashMap::new();
    /// let first = map.get_or_add_with("key".to_string(), |_| 41);
    /// let second = map.get_or_add_with("key".to_string(), |_| 99);
    ///
    /// assert_eq!(first, 41);
    /// assert_eq!(second, 41); // Factory result discarded; key was present
    /// ```
    #[must_use]
    pub fn get_or_add_with<F>(&self, key: K, factory: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        if let Some(existing) = self.shard_for(&key).read().get(&key) {
            return existing.clone();
        }
        let computed = factory(&key);
        let mut shard = self.shard_for(&key).write();
        shard.entry(key).or_insert(computed).clone()
    }

    /// Inserts `value` if `key` is absent, otherwise replaces the
    /// current value with `update(&key, &current)`. Returns the value
    /// that was stored.
    ///
    /// The whole operation runs under the shard's write lock, so
    /// concurrent `add_or_update` calls on one key serialize: each
    /// update sees the previous caller's result. `update` may be
    /// invoked more than once across retries of a contended caller, so
    /// it must be free of side effects beyond its return value. It must
    /// not touch this map, or it will deadlock on the shard lock.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::concurrent::ConcurrentHashMap;
    ///
    /// let map = ConcurrentHashMap::new();
    /// assert_eq!(map.add_or_update("count".to_string(), 1, |_, value| value + 1), 1);
    /// assert_eq!(map.add_or_update("count".to_string(), 1, |_, value| value + 1), 2);
    /// ```
    pub fn add_or_update<F>(&self, key: K, value: V, update: F) -> V
    where
        F: FnOnce(&K, &V) -> V,
    {
        let mut shard = self.shard_for(&key).write();
        match shard.entry(key) {
            Entry::Occupied(mut occupied) => {
                let updated = update(occupied.key(), occupied.get());
                occupied.insert(updated.clone());
                updated
            }
            Entry::Vacant(vacant) => vacant.insert(value).clone(),
        }
    }

    /// Returns a snapshot of the entries.
    ///
    /// Each shard is read under its lock, so no entry is ever observed
    /// mid-write; shards are visited one after another, so the snapshot
    /// is per-shard consistent rather than a single global instant.
    #[must_use]
    pub fn entries(&self) -> Vec<(K, V)>
    where
        K: Clone,
    {
        let mut collected = Vec::new();
        for shard in &self.shards {
            let guard = shard.read();
            collected.extend(guard.iter().map(|(key, value)| (key.clone(), value.clone())));
        }
        collected
    }
}

impl<K, V, S> ConcurrentHashMap<K, V, S> {
    /// Removes all entries, shard by shard.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.write().clear();
        }
    }

    /// Returns the total number of entries at the instant each shard is
    /// visited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    /// Returns `true` if no shard held any entry when visited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.read().is_empty())
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for ConcurrentHashMap<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> fmt::Debug for ConcurrentHashMap<K, V, S>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: Clone + fmt::Debug,
    S: BuildHasher + Clone,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.entries()).finish()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher + Clone + Default> FromIterator<(K, V)>
    for ConcurrentHashMap<K, V, S>
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = Self::with_hasher(S::default());
        for (key, value) in iter {
            let mut shard = map.shard_for(&key).write();
            shard.insert(key, value);
        }
        map
    }
}

// =============================================================================
// Tests
// =============================================================================
