//! Weft Reactive - Subscriptions and client capabilities for Weft.
//!
//! This crate defines how Weft talks to the GraphQL client and how results
//! flow back into the binding layer.
//!
//! # Core Concepts
//!
//! - `Client`, `ObservableQuery`: What Weft needs from a GraphQL client
//! - `Subscription`: Cancellable handle returned by `subscribe` (cancel-on-drop)
//! - `Inbox`, `Emitter`: Queue of notifications tagged with instance key and
//!   operation id, drained on the application's event loop
//! - `SubscriptionManager`: Fan-out of listener callbacks
//!
//! # Example
//!
//! ```rust
//! use weft_reactive::{Inbox, Notification};
//! use weft_core::InstanceKey;
//!
//! let inbox = Inbox::new();
//! let key = InstanceKey::allocate("q");
//! let emitter = inbox.emitter(key.clone(), 1);
//!
//! // Observables call the emitter from their callbacks...
//! emitter.next();
//!
//! // ...and the owner applies the queued notifications later.
//! let envelope = inbox.pop().unwrap();
//! assert_eq!(envelope.key, key);
//! assert_eq!(envelope.notification, Notification::Next);
//! ```

pub mod client;
pub mod inbox;
pub mod subscription;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use client::{Client, ObservableQuery};
pub use inbox::{Emitter, Envelope, Inbox, Notification, OperationId};
pub use subscription::{Listener, Subscription, SubscriptionId, SubscriptionManager};
