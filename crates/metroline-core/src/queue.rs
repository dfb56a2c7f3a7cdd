//! A priority queue with a selectable dequeue order.
//!
//! [`PriorityQueue`] wraps [`BinaryHeap`] and serves items either
//! lowest-priority-first or highest-priority-first. Items with equal
//! priority are served in insertion order, so callers get the same result
//! for the same input regardless of heap internals.
//!
//! Floating-point priorities are supported through
//! [`ordered_float::OrderedFloat`].

use std::{cmp::Ordering, collections::BinaryHeap};

pub use ordered_float::OrderedFloat;

/// Which end of the priority range is dequeued first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueOrder {
    /// Smallest priority first.
    MinFirst,
    /// Largest priority first.
    MaxFirst,
}

#[derive(Debug)]
struct Entry<T, P> {
    priority: P,
    seq: u64,
    order: QueueOrder,
    item: T,
}

impl<T, P: Ord> PartialEq for Entry<T, P> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T, P: Ord> Eq for Entry<T, P> {}

impl<T, P: Ord> PartialOrd for Entry<T, P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, P: Ord> Ord for Entry<T, P> {
    // BinaryHeap pops the greatest entry; earlier insertions win ties.
    fn cmp(&self, other: &Self) -> Ordering {
        let by_priority = match self.order {
            QueueOrder::MaxFirst => self.priority.cmp(&other.priority),
            QueueOrder::MinFirst => other.priority.cmp(&self.priority),
        };
        by_priority.then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A priority queue serving items in [`QueueOrder`].
///
/// # Examples
///
/// ```
/// # use metroline_core::queue::{OrderedFloat, PriorityQueue};
/// let mut queue = PriorityQueue::min_first();
/// queue.enqueue("far", OrderedFloat(9.5));
/// queue.enqueue("near", OrderedFloat(0.5));
/// queue.enqueue("mid", OrderedFloat(3.0));
///
/// assert_eq!(queue.dequeue(), Some("near"));
/// assert_eq!(queue.dequeue(), Some("mid"));
/// assert_eq!(queue.size(), 1);
/// ```
#[derive(Debug)]
pub struct PriorityQueue<T, P> {
    heap: BinaryHeap<Entry<T, P>>,
    order: QueueOrder,
    next_seq: u64,
}

impl<T, P: Ord> PriorityQueue<T, P> {
    /// Creates an empty queue with the given dequeue order.
    pub fn new(order: QueueOrder) -> Self {
        Self {
            heap: BinaryHeap::new(),
            order,
            next_seq: 0,
        }
    }

    /// Creates an empty queue serving the smallest priority first.
    pub fn min_first() -> Self {
        Self::new(QueueOrder::MinFirst)
    }

    /// Creates an empty queue serving the largest priority first.
    pub fn max_first() -> Self {
        Self::new(QueueOrder::MaxFirst)
    }

    /// Adds an item with the given priority.
    pub fn enqueue(&mut self, item: T, priority: P) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            priority,
            seq,
            order: self.order,
            item,
        });
    }

    /// Removes and returns the next item, or `None` if the queue is empty.
    pub fn dequeue(&mut self) -> Option<T> {
        self.heap.pop().map(|entry| entry.item)
    }

    /// Returns the next item and its priority without removing it.
    pub fn peek(&self) -> Option<(&T, &P)> {
        self.heap.peek().map(|entry| (&entry.item, &entry.priority))
    }

    /// Number of queued items.
    pub fn size(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn order(&self) -> QueueOrder {
        self.order
    }
}

impl<T, P: Ord> Iterator for PriorityQueue<T, P> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.dequeue()
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    /// Draining a min-first queue yields priorities in non-decreasing order.
    fn check_min_queue_drains_sorted(priorities: Vec<f64>) -> Result<(), TestCaseError> {
        let mut queue = PriorityQueue::min_first();
        for (idx, p) in priorities.iter().enumerate() {
            queue.enqueue(idx, OrderedFloat(*p));
        }

        let drained: Vec<f64> = queue.map(|idx| priorities[idx]).collect();
        prop_assert_eq!(drained.len(), priorities.len());
        prop_assert!(drained.windows(2).all(|w| w[0] <= w[1]));
        Ok(())
    }

    proptest! {
        #[test]
        fn min_queue_drains_sorted(priorities in prop::collection::vec(-1.0e3f64..1.0e3, 0..50)) {
            check_min_queue_drains_sorted(priorities)?;
        }
    }
}
