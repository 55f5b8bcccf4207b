//! Error taxonomy shared by the containers.
//!
//! Only genuinely failed operations surface a [`CollectionError`]; the
//! `try_*` family and boolean queries signal ordinary absence or presence
//! through their return values and never error. All four kinds are
//! unrecoverable at the point of call: retrying a [`DuplicateKey`] or
//! [`EmptyContainer`] condition without changing the caller's logic would
//! loop indefinitely, so no container retries internally and no error is
//! swallowed.
//!
//! [`DuplicateKey`]: CollectionError::DuplicateKey
//! [`EmptyContainer`]: CollectionError::EmptyContainer

use std::fmt;

/// An error produced by a container operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionError {
    /// An element was requested from a container that has none
    /// (e.g. [`Queue::dequeue`](crate::queue::Queue::dequeue) on an empty
    /// or freshly cleared queue).
    EmptyContainer,
    /// An indexed lookup named a key the map does not contain.
    KeyNotFound,
    /// A key was added to a map that already contains it, either through
    /// [`try_insert`](crate::persistent::PersistentHashMap::try_insert) or
    /// during duplicate-rejecting construction.
    DuplicateKey,
    /// A required input was malformed. The payload names the constraint
    /// that was violated.
    InvalidArgument(&'static str),
}

impl fmt::Display for CollectionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyContainer => write!(formatter, "container is empty"),
            Self::KeyNotFound => write!(formatter, "key not found"),
            Self::DuplicateKey => write!(formatter, "key is already present"),
            Self::InvalidArgument(reason) => {
                write!(formatter, "invalid argument: {reason}")
            }
        }
    }
}

impl std::error::Error for CollectionError {}
