//! Subscription handles and listener management.
//!
//! A [`Subscription`] is the cancellable handle an observable hands back from
//! `subscribe`. Cancelling it (explicitly or by dropping it) detaches the
//! subscriber; nothing is delivered through it afterwards.
//!
//! [`SubscriptionManager`] keeps a set of listener callbacks keyed by
//! [`SubscriptionId`], for producers that fan out to several listeners.

use hashbrown::HashMap;
use std::fmt;

/// Unique identifier for a subscription.
pub type SubscriptionId = u64;

/// A cancellable subscription to an observable.
///
/// Dropping the handle cancels the subscription.
pub struct Subscription {
    /// Unique identifier
    id: SubscriptionId,
    /// Detaches the subscriber from its source; taken on cancel
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Creates a subscription that runs `cancel` once when cancelled.
    pub fn new<F>(id: SubscriptionId, cancel: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Returns the subscription ID.
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns whether this subscription has not been cancelled yet.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Cancels the subscription. Cancelling twice is a no-op.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            tracing::trace!(subscription = self.id, "subscription cancelled");
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Callback type for listener notifications.
pub type Listener<T> = Box<dyn Fn(&T)>;

/// Manages listener callbacks for a producer of `T` values.
pub struct SubscriptionManager<T> {
    /// Active listeners
    listeners: HashMap<SubscriptionId, Listener<T>>,
    /// Next subscription ID to assign
    next_id: SubscriptionId,
}

impl<T> Default for SubscriptionManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SubscriptionManager<T> {
    /// Creates a new subscription manager.
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 1,
        }
    }

    /// Adds a listener.
    ///
    /// Returns the subscription ID that can be used to unsubscribe.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.insert(id, Box::new(callback));
        id
    }

    /// Removes a listener by ID.
    ///
    /// Returns true if the listener was found and removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Notifies all listeners.
    pub fn notify_all(&self, value: &T) {
        for listener in self.listeners.values() {
            listener(value);
        }
    }

    /// Returns the number of listeners.
    #[inline]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if there are no listeners.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
