//! Bounded FIFO queue with ready/occupancy signalling.
//!
//! Every buffer between engine units is one of these. A push into a full queue does not
//! block: it hands the item back and the producer retries on a later tick.

use std::collections::VecDeque;

/// Fixed-capacity FIFO.
#[derive(Debug, Clone)]
pub struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue holding at most `capacity` items (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of queued items.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if a push this tick would be accepted.
    #[inline]
    pub fn ready(&self) -> bool {
        self.items.len() < self.capacity
    }

    /// Returns the number of free slots.
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.capacity - self.items.len()
    }

    /// Appends an item, or returns it if the queue is full.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.ready() {
            self.items.push_back(item);
            Ok(())
        } else {
            Err(item)
        }
    }

    /// Removes and returns the oldest item.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Returns the oldest item without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Drops every queued item.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
