//! Single-value slot guarded by a ticket counter.
//!
//! Every request that will eventually write the slot takes a ticket first.
//! Issuing a ticket invalidates all earlier ones, so only the most recent
//! request can commit; late completions of older requests are dropped.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct Slot<T> {
    latest: u64,
    value: T,
}

impl<T> Slot<T> {
    pub fn new(value: T) -> Self {
        Self { latest: 0, value }
    }

    /// Issue a ticket; every previously issued ticket stops being current.
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }

    /// Replace the value if `ticket` is still the latest one issued.
    /// Returns whether the value was written.
    pub fn commit(&mut self, ticket: Ticket, value: T) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.value = value;
        true
    }

    /// Replace the value unconditionally.
    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    pub fn get(&self) -> &T {
        &self.value
    }
}
