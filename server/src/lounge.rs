//! The matchmaking lounge: a FIFO queue of connections awaiting pairing
//!
//! Connections enter at login and leave either from the front, in pairs,
//! when the pairing tick drains the queue, or anywhere in the queue when
//! they disconnect while waiting. Removal on disconnect keeps the tick from
//! ever pairing a live player against a stale slot.

use crate::registry::ConnectionId;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct Lounge {
    queue: VecDeque<ConnectionId>,
}

impl Lounge {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Appends a connection to the back of the queue.
    pub fn enqueue(&mut self, id: ConnectionId) {
        self.queue.push_back(id);
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.queue.contains(&id)
    }

    /// Removes every occurrence of the connection. Returns true if the
    /// connection was queued.
    pub fn remove(&mut self, id: ConnectionId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|queued| *queued != id);
        self.queue.len() != before
    }

    /// Dequeues the two most-senior entries, or None if fewer than two are
    /// waiting. The caller loops on this to drain `floor(len/2)` pairs per
    /// tick; an odd leftover stays queued for the next tick.
    pub fn take_pair(&mut self) -> Option<(ConnectionId, ConnectionId)> {
        if self.queue.len() < 2 {
            return None;
        }
        let first = self.queue.pop_front()?;
        let second = self.queue.pop_front()?;
        Some((first, second))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
