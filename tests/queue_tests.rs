//! Unit tests for Queue.

use conifer::error::CollectionError;
use conifer::queue::Queue;
use rstest::rstest;

// =============================================================================
// FIFO ordering
// =============================================================================

#[rstest]
#[case(vec![])]
#[case(vec![1])]
#[case(vec![1, 2, 3])]
#[case((0..100).collect())]
fn test_dequeue_order_equals_enqueue_order(#[case] values: Vec<i32>) {
    let mut queue = Queue::new();
    for value in &values {
        queue.enqueue(*value);
    }

    let mut dequeued = Vec::new();
    while let Ok(value) = queue.dequeue() {
        dequeued.push(value);
    }

    assert_eq!(dequeued, values);
}

#[rstest]
fn test_interleaved_enqueue_dequeue_stays_fifo() {
    let mut queue = Queue::new();
    queue.enqueue(1);
    queue.enqueue(2);
    assert_eq!(queue.dequeue(), Ok(1));

    queue.enqueue(3);
    assert_eq!(queue.dequeue(), Ok(2));
    assert_eq!(queue.dequeue(), Ok(3));
}

// =============================================================================
// Empty-queue failures
// =============================================================================

#[rstest]
fn test_dequeue_on_fresh_queue_fails() {
    let mut queue: Queue<i32> = Queue::new();
    assert_eq!(queue.dequeue(), Err(CollectionError::EmptyContainer));
}

#[rstest]
fn test_dequeue_on_cleared_queue_fails() {
    let mut queue: Queue<i32> = (0..10).collect();
    queue.clear();
    assert_eq!(queue.dequeue(), Err(CollectionError::EmptyContainer));
}

#[rstest]
fn test_dequeue_on_drained_queue_fails() {
    let mut queue = Queue::new();
    queue.enqueue(1);
    assert_eq!(queue.dequeue(), Ok(1));
    assert_eq!(queue.dequeue(), Err(CollectionError::EmptyContainer));
}

// =============================================================================
// Snapshot iteration
// =============================================================================

#[rstest]
fn test_iteration_is_finite_and_restartable() {
    let queue: Queue<i32> = (0..5).collect();

    let first_pass: Vec<&i32> = queue.iter().collect();
    let second_pass: Vec<&i32> = queue.iter().collect();

    assert_eq!(first_pass.len(), 5);
    assert_eq!(first_pass, second_pass);
}

#[rstest]
fn test_iteration_follows_enqueue_order() {
    let mut queue = Queue::new();
    for word in ["a", "b", "c"] {
        queue.enqueue(word);
    }

    let collected: Vec<&&str> = queue.iter().collect();
    assert_eq!(collected, vec![&"a", &"b", &"c"]);
}
