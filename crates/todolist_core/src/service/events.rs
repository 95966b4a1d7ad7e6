//! One-shot UI event queue.
//!
//! # Responsibility
//! - Buffer navigation/snackbar events until the screen consumes them.
//!
//! # Invariants
//! - Each event is delivered at most once, in push order.
//! - Events pushed while the consumer is inactive stay queued.
//! - A full queue rejects new events; queued events are never dropped.
//! - Producers check [`EventQueue::ensure_room`] before committing the store
//!   write an event reports, so a rejected event never follows a write.

use log::warn;
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default buffer bound, matching a buffered coroutine channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Returned when an event is pushed into a full queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventQueueFull {
    pub capacity: usize,
}

impl Display for EventQueueFull {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "event queue is full (capacity {})", self.capacity)
    }
}

impl Error for EventQueueFull {}

/// Bounded FIFO of one-shot events.
#[derive(Debug)]
pub struct EventQueue<E> {
    pending: VecDeque<E>,
    capacity: usize,
    active: bool,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

impl<E> EventQueue<E> {
    /// Creates an active queue holding at most `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity.min(DEFAULT_EVENT_CAPACITY)),
            capacity,
            active: true,
        }
    }

    /// Fails when one more event would not fit.
    pub fn ensure_room(&self) -> Result<(), EventQueueFull> {
        if self.pending.len() >= self.capacity {
            warn!(
                "event=ui_event_push module=events status=error error_code=queue_full capacity={}",
                self.capacity
            );
            return Err(EventQueueFull {
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    pub fn push(&mut self, event: E) -> Result<(), EventQueueFull> {
        self.ensure_room()?;
        self.pending.push_back(event);
        Ok(())
    }

    /// Pops the oldest event, or `None` while the consumer is inactive.
    pub fn poll(&mut self) -> Option<E> {
        if !self.active {
            return None;
        }
        self.pending.pop_front()
    }

    /// Pops every deliverable event in order.
    pub fn drain(&mut self) -> Vec<E> {
        if !self.active {
            return Vec::new();
        }
        self.pending.drain(..).collect()
    }

    /// Marks the consuming screen as started/stopped.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
