//! Property-based tests for ConcurrentHashMap.
//!
//! Applies random operation sequences to the sharded map and to a plain
//! `std::collections::HashMap` model; applied serially the two must
//! agree at every step.

use conifer::concurrent::ConcurrentHashMap;
use proptest::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Operation model
// =============================================================================

#[derive(Clone, Debug)]
enum Operation {
    TryAdd(u8, i32),
    TryRemove(u8),
    TryUpdate(u8, i32, i32),
    GetOrAdd(u8, i32),
    AddOrUpdate(u8, i32),
}

fn arbitrary_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        (any::<u8>(), any::<i32>()).prop_map(|(key, value)| Operation::TryAdd(key, value)),
        any::<u8>().prop_map(Operation::TryRemove),
        (any::<u8>(), any::<i32>(), any::<i32>())
            .prop_map(|(key, new, expected)| Operation::TryUpdate(key, new, expected)),
        (any::<u8>(), any::<i32>()).prop_map(|(key, value)| Operation::GetOrAdd(key, value)),
        (any::<u8>(), any::<i32>()).prop_map(|(key, value)| Operation::AddOrUpdate(key, value)),
    ]
}

fn arbitrary_operations() -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(arbitrary_operation(), 0..100)
}

/// Applies one operation to the model, returning what the sharded map
/// should have returned.
fn apply_to_model(model: &mut HashMap<u8, i32>, operation: &Operation) -> Option<i32> {
    match operation {
        Operation::TryAdd(key, value) => {
            if model.contains_key(key) {
                None
            } else {
                model.insert(*key, *value);
                Some(*value)
            }
        }
        Operation::TryRemove(key) => model.remove(key),
        Operation::TryUpdate(key, new, expected) => match model.get_mut(key) {
            Some(current) if current == expected => {
                *current = *new;
                Some(*new)
            }
            _ => None,
        },
        Operation::GetOrAdd(key, value) => Some(*model.entry(*key).or_insert(*value)),
        Operation::AddOrUpdate(key, value) => {
            let stored = model
                .entry(*key)
                .and_modify(|current| *current += 1)
                .or_insert(*value);
            Some(*stored)
        }
    }
}

fn apply_to_map(map: &ConcurrentHashMap<u8, i32>, operation: &Operation) -> Option<i32> {
    match operation {
        Operation::TryAdd(key, value) => map.try_add(*key, *value).then_some(*value),
        Operation::TryRemove(key) => map.try_remove(key),
        Operation::TryUpdate(key, new, expected) => {
            map.try_update(key, *new, expected).then_some(*new)
        }
        Operation::GetOrAdd(key, value) => Some(map.get_or_add(*key, *value)),
        Operation::AddOrUpdate(key, value) => {
            Some(map.add_or_update(*key, *value, |_, current| current + 1))
        }
    }
}

// =============================================================================
// Serial-equivalence law
// =============================================================================

proptest! {
    #[test]
    fn prop_serial_operations_agree_with_model(operations in arbitrary_operations()) {
        let map: ConcurrentHashMap<u8, i32> = ConcurrentHashMap::new();
        let mut model: HashMap<u8, i32> = HashMap::new();

        for operation in &operations {
            let expected = apply_to_model(&mut model, operation);
            let actual = apply_to_map(&map, operation);
            prop_assert_eq!(actual, expected);
        }

        // Final states agree entirely.
        prop_assert_eq!(map.len(), model.len());
        for (key, value) in &model {
            prop_assert_eq!(map.get(key), Some(*value));
        }
    }
}

// =============================================================================
// Result-channel law: absence/presence is never an error
// =============================================================================

proptest! {
    #[test]
    fn prop_absence_and_presence_signal_through_returns(key in any::<u8>(), value in any::<i32>()) {
        let map: ConcurrentHashMap<u8, i32> = ConcurrentHashMap::new();

        // All outcomes below are ordinary values, not panics or errors.
        prop_assert!(map.try_remove(&key).is_none());
        prop_assert!(!map.try_update(&key, value, &value));
        prop_assert!(map.try_add(key, value));
        prop_assert!(!map.try_add(key, value));
        prop_assert_eq!(map.try_remove(&key), Some(value));
    }
}
