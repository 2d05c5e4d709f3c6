//! Shutdown-aware blocking FIFO queue
//!
//! Backs both the per-strategy mailboxes (bounded, single producer) and the
//! order-request queue (unbounded, multi producer). Interior is a
//! `parking_lot` mutex with one condvar per waiting role. Closing wakes all
//! waiters; items already queued still drain in FIFO order, after which pops
//! report `Closed`. A push against a closed queue is a silent no-op.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Outcome of a non-blocking or deadline-bounded pop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryPop<T> {
    Item(T),
    /// Nothing available (queue may still receive items)
    Empty,
    /// Closed and fully drained
    Closed,
}

impl<T> TryPop<T> {
    pub fn into_item(self) -> Option<T> {
        match self {
            TryPop::Item(item) => Some(item),
            _ => None,
        }
    }
}

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Blocking FIFO queue with optional capacity bound
pub struct BlockingQueue<T> {
    inner: Mutex<Inner<T>>,
    /// Signalled when an item arrives or the queue closes
    consumer: Condvar,
    /// Signalled when space frees up or the queue closes (bounded only)
    producer: Condvar,
    capacity: Option<usize>,
}

impl<T> BlockingQueue<T> {
    /// Unbounded queue
    pub fn unbounded() -> Self {
        Self::with_capacity(None)
    }

    /// Bounded queue; producers block while `len() == capacity`
    pub fn bounded(capacity: usize) -> Self {
        Self::with_capacity(Some(capacity))
    }

    fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                closed: false,
            }),
            consumer: Condvar::new(),
            producer: Condvar::new(),
            capacity,
        }
    }

    /// Enqueue an item. Blocks while a bounded queue is full, unless the
    /// queue is (or becomes) closed, in which case the item is dropped.
    pub fn push(&self, item: T) {
        let mut inner = self.inner.lock();
        if let Some(cap) = self.capacity {
            while inner.items.len() >= cap && !inner.closed {
                self.producer.wait(&mut inner);
            }
        }
        if inner.closed {
            return;
        }
        inner.items.push_back(item);
        drop(inner);
        self.consumer.notify_one();
    }

    /// Blocking pop. Returns `None` only once the queue is closed and every
    /// queued item has been drained.
    pub fn wait_pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        while inner.items.is_empty() && !inner.closed {
            self.consumer.wait(&mut inner);
        }
        let item = inner.items.pop_front();
        drop(inner);
        if item.is_some() {
            self.producer.notify_one();
        }
        item
    }

    /// Non-blocking pop
    pub fn try_pop(&self) -> TryPop<T> {
        let mut inner = self.inner.lock();
        match inner.items.pop_front() {
            Some(item) => {
                drop(inner);
                self.producer.notify_one();
                TryPop::Item(item)
            }
            None if inner.closed => TryPop::Closed,
            None => TryPop::Empty,
        }
    }

    /// Pop with a deadline. `Empty` means the timeout expired with the queue
    /// still open and empty; the queue itself is untouched.
    pub fn timed_pop(&self, timeout: Duration) -> TryPop<T> {
        let mut inner = self.inner.lock();
        if inner.items.is_empty() && !inner.closed {
            let result = self.consumer.wait_for(&mut inner, timeout);
            if result.timed_out() && inner.items.is_empty() && !inner.closed {
                return TryPop::Empty;
            }
        }
        match inner.items.pop_front() {
            Some(item) => {
                drop(inner);
                self.producer.notify_one();
                TryPop::Item(item)
            }
            None if inner.closed => TryPop::Closed,
            None => TryPop::Empty,
        }
    }

    /// Close the queue, waking every blocked producer and consumer
    pub fn close(&self) {
        {
            let mut inner = self.inner.lock();
            inner.closed = true;
        }
        self.consumer.notify_all();
        self.producer.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }
}
