//! Guard against applying a stale lookup result.
//!
//! Policy is last-started wins: every lookup takes a [`Ticket`] before it
//! starts, and only the most recently issued ticket is current when its
//! result arrives. In-flight requests are not cancelled.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct LatestOnly {
    latest: Arc<AtomicU64>,
}

impl LatestOnly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a lookup that is about to start. Every ticket
    /// issued earlier becomes stale.
    pub fn start(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Hand `value` back only if `ticket` is still current.
    pub fn accept<T>(&self, ticket: &Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(ticket = ticket.0, "discarding stale lookup result");
            None
        }
    }
}
