//! # conifer
//!
//! A small collections substrate providing containers a host toolchain
//! needs but its target runtime lacks natively:
//!
//! - **[`Queue`]**: an unsynchronized FIFO sequence
//! - **[`PersistentHashMap`]** / **[`PersistentHashSet`]**: immutable
//!   containers whose mutators return new instances, sharing structure
//!   with the originals (HAMT-based, O(log32 N) point operations)
//! - **[`ConcurrentStack`]** / **[`ConcurrentHashMap`]**: shared-access
//!   containers that serialize mutation internally, so any number of
//!   threads may hold references and operate on the same instance
//!
//! Each container is independently instantiable with no global
//! initialization and no teardown. The persistent types are safe to read
//! from any number of threads because mutators never touch the receiver;
//! the concurrent types are safe to *mutate* from any number of threads
//! because every compound operation runs under an internal lock.
//!
//! ## Example
//!
//! ```rust
//! use conifer::prelude::*;
//!
//! let map = PersistentHashMap::new().insert("one".to_string(), 1);
//! let updated = map.insert("one".to_string(), 100);
//!
//! assert_eq!(map.get("one"), Some(&1));       // Original unchanged
//! assert_eq!(updated.get("one"), Some(&100)); // New version
//! ```
//!
//! [`Queue`]: queue::Queue
//! [`PersistentHashMap`]: persistent::PersistentHashMap
//! [`PersistentHashSet`]: persistent::PersistentHashSet
//! [`ConcurrentStack`]: concurrent::ConcurrentStack
//! [`ConcurrentHashMap`]: concurrent::ConcurrentHashMap

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types.
///
/// # Usage
///
/// ```rust
/// use conifer::prelude::*;
/// ```
pub mod prelude {
    pub use crate::concurrent::*;
    pub use crate::error::CollectionError;
    pub use crate::persistent::*;
    pub use crate::queue::Queue;
}

pub mod concurrent;
pub mod error;
pub mod persistent;
pub mod queue;
