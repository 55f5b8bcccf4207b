//! Unsynchronized FIFO queue.
//!
//! This module provides [`Queue`], a first-in first-out sequence for
//! single-owner use. There is no internal locking: concurrent
//! `enqueue`/`dequeue` from multiple threads requires external
//! synchronization. For a shared container, see
//! [`ConcurrentStack`](crate::concurrent::ConcurrentStack).
//!
//! # Examples
//!
//! ```rust
//! use conifer::queue::Queue;
//!
//! let mut queue = Queue::new();
//! queue.enqueue(1);
//! queue.enqueue(2);
//!
//! assert_eq!(queue.dequeue(), Ok(1));
//! assert_eq!(queue.dequeue(), Ok(2));
//! assert!(queue.dequeue().is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;

use crate::error::CollectionError;

/// A first-in first-out queue.
///
/// Elements are dequeued in exactly the order they were enqueued.
/// [`dequeue`](Self::dequeue) on an empty queue fails with
/// [`CollectionError::EmptyContainer`] rather than blocking or
/// returning a sentinel.
///
/// # Time Complexity
///
/// | Operation | Complexity     |
/// |-----------|----------------|
/// | `enqueue` | O(1) amortized |
/// | `dequeue` | O(1) amortized |
/// | `peek`    | O(1)           |
/// | `clear`   | O(n)           |
/// | `len`     | O(1)           |
#[derive(Clone)]
pub struct Queue<T> {
    entries: VecDeque<T>,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Queue<T> {
    /// Creates a new empty queue.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::queue::Queue;
    ///
    /// let queue: Queue<i32> = Queue::new();
    /// assert!(queue.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Returns the number of elements currently in the queue.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the queue contains no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an element at the tail of the queue.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// queue.enqueue("first");
    /// assert_eq!(queue.len(), 1);
    /// ```
    #[inline]
    pub fn enqueue(&mut self, item: T) {
        self.entries.push_back(item);
    }

    /// Removes and returns the element at the head of the queue.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::EmptyContainer`] if the queue holds no
    /// elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::error::CollectionError;
    /// use conifer::queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// queue.enqueue(42);
    ///
    /// assert_eq!(queue.dequeue(), Ok(42));
    /// assert_eq!(queue.dequeue(), Err(CollectionError::EmptyContainer));
    /// ```
    pub fn dequeue(&mut self) -> Result<T, CollectionError> {
        self.entries
            .pop_front()
            .ok_or(CollectionError::EmptyContainer)
    }

    /// Returns a reference to the element at the head without removing it,
    /// or `None` if the queue is empty.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Removes all elements.
    ///
    /// A subsequent [`dequeue`](Self::dequeue) fails with
    /// [`CollectionError::EmptyContainer`].
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns an iterator over the current contents in enqueue order.
    ///
    /// The iterator is a snapshot of the queue at the moment of the call:
    /// it is finite, restartable via a fresh `iter()` call, and yields
    /// head-to-tail regardless of how the elements arrived.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conifer::queue::Queue;
    ///
    /// let queue: Queue<i32> = (1..=3).collect();
    /// let snapshot: Vec<&i32> = queue.iter().collect();
    /// assert_eq!(snapshot, vec![&1, &2, &3]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> QueueIterator<'_, T> {
        QueueIterator {
            entries: self.entries.iter().collect(),
            current_index: 0,
        }
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the elements of a [`Queue`], head first.
pub struct QueueIterator<'a, T> {
    entries: Vec<&'a T>,
    current_index: usize,
}

impl<'a, T> Iterator for QueueIterator<'a, T> {
    type Item = &'a T;

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

impl<T> ExactSizeIterator for QueueIterator<'_, T> {
    fn len(&self) -> usize {
        self.entries.len().saturating_sub(self.current_index)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for Queue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl<T> IntoIterator for Queue<T> {
    type Item = T;
    type IntoIter = std::collections::vec_deque::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Queue<T> {
    type Item = &'a T;
    type IntoIter = QueueIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for Queue<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.entries.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for Queue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<T: Eq> Eq for Queue<T> {}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_new_creates_empty() {
        let queue: Queue<i32> = Queue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[rstest]
    fn test_fifo_order() {
        let mut queue = Queue::new();
        queue.enqueue(1);
        queue.enqueue(2);
        queue.enqueue(3);

        assert_eq!(queue.dequeue(), Ok(1));
        assert_eq!(queue.dequeue(), Ok(2));
        assert_eq!(queue.dequeue(), Ok(3));
    }

    #[rstest]
    fn test_dequeue_empty_fails() {
        let mut queue: Queue<i32> = Queue::new();
        assert_eq!(queue.dequeue(), Err(CollectionError::EmptyContainer));
    }

    #[rstest]
    fn test_dequeue_after_clear_fails() {
        let mut queue = Queue::new();
        queue.enqueue(1);
        queue.clear();
        assert_eq!(queue.dequeue(), Err(CollectionError::EmptyContainer));
    }

    #[rstest]
    fn test_peek_does_not_remove() {
        let mut queue = Queue::new();
        queue.enqueue(7);
        assert_eq!(queue.peek(), Some(&7));
        assert_eq!(queue.len(), 1);
    }

    #[rstest]
    fn test_iter_is_snapshot_in_enqueue_order() {
        let queue: Queue<i32> = (0..5).collect();
        let first: Vec<&i32> = queue.iter().collect();
        let second: Vec<&i32> = queue.iter().collect();
        assert_eq!(first, vec![&0, &1, &2, &3, &4]);
        assert_eq!(first, second);
    }

    #[rstest]
    fn test_extend_appends_at_tail() {
        let mut queue: Queue<i32> = (0..2).collect();
        queue.extend(2..4);
        let collected: Vec<i32> = queue.into_iter().collect();
        assert_eq!(collected, vec![0, 1, 2, 3]);
    }
}
