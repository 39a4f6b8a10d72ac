//! Most-recent-request-wins tickets for asynchronous work.
//!
//! Every request takes a [`Ticket`] from a [`GenerationCounter`]. Issuing a
//! new ticket, or invalidating the counter, makes all older tickets stale;
//! a completion carrying a stale ticket is dropped.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Proof of which generation a request was issued in.
#[must_use = "a ticket is needed to complete the request it was issued for"]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ticket(u64);

impl Ticket {
    /// The generation number this ticket belongs to.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Monotonic generation counter.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    current: u64,
}

impl GenerationCounter {
    /// Create a counter at generation 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation and return its ticket.
    pub fn issue(&mut self) -> Ticket {
        self.invalidate();
        Ticket(self.current)
    }

    /// Start a new generation without issuing a ticket.
    pub fn invalidate(&mut self) {
        self.current = self.current.wrapping_add(1);
    }

    /// Whether `ticket` belongs to the current generation.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }

    /// The current generation number.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.current
    }
}
