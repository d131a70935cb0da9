//! Fixed-capacity histories for alerts and the net log.

use std::collections::VecDeque;

pub const ALERT_HISTORY_SIZE: usize = 200;
pub const NET_LOG_SIZE: usize = 300;

/// Fixed-capacity FIFO that evicts the oldest entries on overflow
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    capacity: usize,
    items: VecDeque<T>,
}

impl<T: Clone> BoundedHistory<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Extend the tail, dropping from the head until `len() <= capacity`
    pub fn append<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        for item in items {
            Self::push_value(&mut self.items, item, self.capacity);
        }
    }

    fn push_value(queue: &mut VecDeque<T>, value: T, capacity: usize) {
        if capacity == 0 {
            return;
        }
        if queue.len() >= capacity {
            queue.pop_front();
        }
        queue.push_back(value);
    }

    /// Detached copy, oldest first
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    /// Copy of `[offset, offset + limit)` clamped to the stored range
    pub fn slice(&self, offset: usize, limit: usize) -> Vec<T> {
        self.items.iter().skip(offset).take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
