//! The per-worker double-ended queue of a [`WorkStealingPool`].
//!
//! [`WorkStealingPool`]: struct.WorkStealingPool.html

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A coarsely locked deque. Its owner pushes and pops at the back; thieves take from the
/// front, so they get the oldest items, which tend to be the largest subproblems.
#[derive(Debug)]
pub struct WorkQueue<I> {
    items: Mutex<VecDeque<I>>,
}

impl<I> WorkQueue<I> {
    /// Creates an empty queue.
    pub fn new() -> WorkQueue<I> {
        WorkQueue {
            items: Mutex::new(VecDeque::new()),
        }
    }

    // Every operation leaves the deque consistent, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, VecDeque<I>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an item at the owner's end.
    pub fn push(&self, item: I) {
        self.lock().push_back(item);
    }

    /// Removes the most recently pushed item.
    pub fn pop(&self) -> Option<I> {
        self.lock().pop_back()
    }

    /// Removes the oldest item.
    pub fn steal(&self) -> Option<I> {
        self.lock().pop_front()
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no item is queued.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops all queued items.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<I> Default for WorkQueue<I> {
    fn default() -> WorkQueue<I> {
        WorkQueue::new()
    }
}
