use tracing::trace;

/// Generation of a scheduled redraw. Later requests get larger generations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RedrawTicket(pub u64);

/// Deferred redraw requests where the most recent one wins.
///
/// Key properties:
/// - Every `schedule` supersedes all earlier pending requests.
/// - `take_latest` hands out only the newest request; older ones are dropped
///   and counted as superseded.
/// - A ticket taken earlier can be checked with `is_current` before its
///   result is committed, so a slow task started before a newer request
///   discards itself.
#[derive(Debug)]
pub struct RedrawQueue<T> {
    next_generation: u64,
    pending: Vec<(RedrawTicket, T)>,
    superseded: u64,
}

impl<T> Default for RedrawQueue<T> {
    fn default() -> Self {
        Self {
            next_generation: 0,
            pending: Vec::new(),
            superseded: 0,
        }
    }
}

impl<T> RedrawQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, payload: T) -> RedrawTicket {
        let ticket = RedrawTicket(self.next_generation);
        self.next_generation = self.next_generation.wrapping_add(1);
        self.pending.push((ticket, payload));
        trace!(generation = ticket.0, pending = self.pending.len(), "redraw scheduled");
        ticket
    }

    /// Ticket of the most recent request, pending or not.
    pub fn latest(&self) -> Option<RedrawTicket> {
        self.next_generation.checked_sub(1).map(RedrawTicket)
    }

    pub fn is_current(&self, ticket: RedrawTicket) -> bool {
        self.latest() == Some(ticket)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Requests dropped because a newer one arrived.
    pub fn superseded(&self) -> u64 {
        self.superseded
    }

    /// Removes every pending request and returns only the newest.
    pub fn take_latest(&mut self) -> Option<(RedrawTicket, T)> {
        let latest = self.pending.pop()?;
        let dropped = self.pending.len();
        if dropped > 0 {
            self.superseded += dropped as u64;
            trace!(dropped, generation = latest.0 .0, "stale redraws superseded");
            self.pending.clear();
        }
        Some(latest)
    }

    /// Drops everything pending without running it.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.superseded += n as u64;
        self.pending.clear();
        n
    }
}
