//! Outcome of applying one queued notification.

/// What happened to a notification taken from the inbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Delivery {
    /// The notification updated the store.
    Applied,
    /// The notification was the observable replaying a result that had
    /// already been published.
    Swallowed,
    /// The notification belonged to a released subscription, a superseded
    /// mutation or a destroyed instance.
    Stale,
}

/// Counters of one flush.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub applied: usize,
    pub swallowed: usize,
    pub stale: usize,
    /// Notifications left in the inbox.
    pub pending: usize,
}

impl FlushStats {
    /// Records one delivery.
    pub fn record(&mut self, delivery: Delivery) {
        match delivery {
            Delivery::Applied => self.applied += 1,
            Delivery::Swallowed => self.swallowed += 1,
            Delivery::Stale => self.stale += 1,
        }
    }

    /// Returns the number of notifications taken from the inbox.
    pub fn processed(&self) -> usize {
        self.applied + self.swallowed + self.stale
    }
}
