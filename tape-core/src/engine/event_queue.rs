//! Time-ordered event store
//!
//! Min-priority queue keyed by effective arrival time. Entries at the same
//! timestamp pop in insertion order via a monotonically increasing sequence
//! number; consumers must not rely on any finer ordering between sources.
//! Only the dispatch thread mutates it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::{Event, Timestamp};

struct Scheduled {
    ts: Timestamp,
    seq: u64,
    event: Event,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.ts == other.ts && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the earliest out first.
        (other.ts, other.seq).cmp(&(self.ts, self.seq))
    }
}

/// The scheduler's ordered event store
#[derive(Default)]
pub struct EventQueue {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        let ts = event.effective_ts();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled { ts, seq, event });
    }

    /// Remove and return the earliest event
    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|s| s.event)
    }

    /// Effective timestamp of the earliest event, if any
    pub fn peek_ts(&self) -> Option<Timestamp> {
        self.heap.peek().map(|s| s.ts)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
