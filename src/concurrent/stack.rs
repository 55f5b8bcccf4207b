//! Shared append-and-drain container.
//!
//! [`ConcurrentStack`] is an accumulate-and-drain structure: producers
//! push from any thread, and a consumer reads the whole contents with
//! [`to_vec`](ConcurrentStack::to_vec) or takes them atomically with
//! [`drain`](ConcurrentStack::drain). There is deliberately no pop.
//!
//! All operations take `&self`; share the container by putting it in an
//! `Arc` and cloning the handle.
//!
//! # Examples
//!
//! ```rust
//! use conifer::concurrent::ConcurrentStack;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let stack = Arc::new(ConcurrentStack::new());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|index| {
//!         let stack = Arc::clone(&stack);
//!         thread::spawn(move || stack.push(index))
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(stack.len(), 4);
//! ```

use std::fmt;

use parking_lot::Mutex;

/// A shared container that accumulates elements in append order.
///
/// Internally a `parking_lot::Mutex` around a growable vector: every
/// mutating operation acquires the lock, so concurrent callers are
/// serialized and each call is atomic as a unit. The container is `Send
/// + Sync` whenever `T: Send`.
///
/// Unlike a true stack there is no pop; callers snapshot with
/// [`to_vec`](Self::to_vec) and reset with [`clear`](Self::clear), or do
/// both atomically with [`drain`](Self::drain).
pub struct ConcurrentStack<T> {
    entries: Mutex<Vec<T>>,
}

impl<T> Default for ConcurrentStack<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConcurrentStack<T> {
    /// Creates a new empty stack.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Creates a stack with space reserved for `capacity` elements.
    ///
    /// The capacity is a sizing hint; it does not bound the stack.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Appends one element.
    pub fn push(&self, item: T) {
        self.entries.lock().push(item);
    }

    /// Appends every element of `items` as one atomic unit.
    ///
    /// The whole range is inserted under a single lock acquisition, so
    /// another caller's elements never land between two elements of the
    /// same `push_range` call. The relative order of two concurrent
    /// `push_range` calls is unspecified.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::concurrent::ConcurrentStack;
    ///
    /// let stack = ConcurrentStack::new();
    /// stack.push_range([1, 2, 3]);
    /// assert_eq!(stack.to_vec(), vec![1, 2, 3]);
    /// ```
    pub fn push_range<I: IntoIterator<Item = T>>(&self, items: I) {
        self.entries.lock().extend(items);
    }

    /// Removes all elements.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Returns the number of elements at the instant of the call.
    ///
    /// The count may be stale by the time the caller inspects it if
    /// other threads keep pushing.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if the stack held no elements at the instant of
    /// the call.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Removes and returns all elements as one atomic operation.
    ///
    /// Equivalent to [`to_vec`](Self::to_vec) followed by
    /// [`clear`](Self::clear) with no window for another thread's push
    /// to be lost between the two.
    #[must_use]
    pub fn drain(&self) -> Vec<T> {
        std::mem::take(&mut *self.entries.lock())
    }
}

impl<T: Clone> ConcurrentStack<T> {
    /// Returns a point-in-time snapshot of the contents in append order.
    ///
    /// The snapshot is stable: pushes that race with the call either
    /// appear entirely or not at all, and later mutation of the stack
    /// never changes a snapshot already returned.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.lock().clone()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> FromIterator<T> for ConcurrentStack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            entries: Mutex::new(iter.into_iter().collect()),
        }
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for ConcurrentStack<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.to_vec()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
