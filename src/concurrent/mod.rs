//! Shared-access containers.
//!
//! These types are shared by construction: every operation takes
//! `&self`, so any number of threads may hold references (typically
//! through an `Arc`) to one instance and operate on the same evolving
//! state. The container, not its callers, is responsible for
//! synchronization — every mutating operation runs to completion under
//! an internal `parking_lot` lock before the caller proceeds, and reads
//! never observe a partially applied write.
//!
//! - [`ConcurrentStack`]: append-and-drain bag (push, atomic range
//!   push, snapshot, clear; no pop)
//! - [`ConcurrentHashMap`]: key/value mapping whose compound operations
//!   (`try_add`, `try_remove`, `try_update`, `get_or_add`,
//!   `add_or_update`) are each atomic, giving serializability per key
//!
//! There are no internal threads and no suspension points: all
//! operations run synchronously on the calling thread and complete in
//! bounded time.
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
//! let handles: Vec<_> = (0..8)
//!     .map(|index| {
//!         let map = Arc::clone(&map);
//!         thread::spawn(move || map.try_add(index, index * 10))
//!     })
//!     .collect();
//! for handle in handles {
//!     assert!(handle.join().unwrap());
//! }
//!
//! assert_eq!(map.len(), 8);
//! ```

mod map;
mod stack;

pub use map::ConcurrentHashMap;
pub use map::ConcurrentMapOptions;
pub use stack::ConcurrentStack;
