//! Bounded Queue Tests.

use tpsim_core::prefetch::queue::BoundedQueue;

#[test]
fn fifo_order_and_capacity() {
    let mut q = BoundedQueue::new(2);
    assert!(q.ready());
    assert!(q.push(1).is_ok());
    assert!(q.push(2).is_ok());
    assert!(!q.ready());
    assert_eq!(q.free_slots(), 0);

    assert_eq!(q.push(3), Err(3), "full queue hands the item back");
    assert_eq!(q.peek(), Some(&1));
    assert_eq!(q.pop(), Some(1));
    assert_eq!(q.pop(), Some(2));
    assert_eq!(q.pop(), None);
    assert!(q.is_empty());
}

/// A zero capacity request still yields a usable one-entry queue.
#[test]
fn zero_capacity_is_raised_to_one() {
    let mut q = BoundedQueue::new(0);
    assert_eq!(q.capacity(), 1);
    assert!(q.push('a').is_ok());
    assert!(q.push('b').is_err());
}

#[test]
fn clear_and_iter() {
    let mut q = BoundedQueue::new(4);
    for i in 0..3 {
        assert!(q.push(i).is_ok());
    }
    assert_eq!(q.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(q.len(), 3);
    q.clear();
    assert!(q.is_empty());
    assert_eq!(q.free_slots(), 4);
}
