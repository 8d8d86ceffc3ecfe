//! Notification inbox.
//!
//! Observables and the client report results through an [`Emitter`]. An
//! emitter never touches component state directly: it only queues an
//! [`Envelope`] tagged with the instance key and the operation id that was
//! current when the emitter was handed out. The owner of the [`Inbox`] drains
//! it on its own event-loop turn and decides, per envelope, whether it is
//! still current.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};
use weft_core::{ClientError, InstanceKey, OperationResult};

/// Identifies one subscription or in-flight mutation of an instance.
pub type OperationId = u64;

/// What an observable or the client reported.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// The observable has a new current result.
    Next,
    /// The observable's stream failed.
    Error(ClientError),
    /// A mutation finished.
    Completed(OperationResult),
    /// A mutation was rejected.
    Failed(ClientError),
}

/// A queued notification.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub key: InstanceKey,
    pub op_id: OperationId,
    pub notification: Notification,
}

type Queue = RefCell<VecDeque<Envelope>>;

/// Single-threaded queue of pending notifications.
#[derive(Clone, Default)]
pub struct Inbox {
    queue: Rc<Queue>,
}

impl Inbox {
    /// Creates an empty inbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an emitter that tags notifications with `key` and `op_id`.
    ///
    /// The emitter holds a weak reference; once the inbox is gone, emitting
    /// does nothing.
    pub fn emitter(&self, key: InstanceKey, op_id: OperationId) -> Emitter {
        Emitter {
            key,
            op_id,
            queue: Rc::downgrade(&self.queue),
        }
    }

    /// Takes the oldest pending notification.
    pub fn pop(&self) -> Option<Envelope> {
        self.queue.borrow_mut().pop_front()
    }

    /// Returns the number of pending notifications.
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Drops every pending notification addressed to `key`.
    ///
    /// Returns the number of notifications dropped.
    pub fn purge(&self, key: &InstanceKey) -> usize {
        let mut queue = self.queue.borrow_mut();
        let before = queue.len();
        queue.retain(|envelope| &envelope.key != key);
        before - queue.len()
    }
}

impl fmt::Debug for Inbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inbox").field("pending", &self.len()).finish()
    }
}

/// The sending side of an [`Inbox`], bound to one operation.
#[derive(Clone)]
pub struct Emitter {
    key: InstanceKey,
    op_id: OperationId,
    queue: Weak<Queue>,
}

impl Emitter {
    /// Returns the instance key this emitter reports for.
    #[inline]
    pub fn key(&self) -> &InstanceKey {
        &self.key
    }

    /// Returns the operation id this emitter reports for.
    #[inline]
    pub fn op_id(&self) -> OperationId {
        self.op_id
    }

    /// Returns true while the inbox still exists.
    pub fn is_connected(&self) -> bool {
        self.queue.strong_count() > 0
    }

    /// Reports that the observable has a new current result.
    pub fn next(&self) {
        self.emit(Notification::Next);
    }

    /// Reports a stream error.
    pub fn error(&self, error: ClientError) {
        self.emit(Notification::Error(error));
    }

    /// Reports a finished mutation.
    pub fn completed(&self, result: OperationResult) {
        self.emit(Notification::Completed(result));
    }

    /// Reports a rejected mutation.
    pub fn failed(&self, error: ClientError) {
        self.emit(Notification::Failed(error));
    }

    fn emit(&self, notification: Notification) {
        let Some(queue) = self.queue.upgrade() else {
            tracing::trace!(key = %self.key, op_id = self.op_id, "inbox dropped, notification discarded");
            return;
        };
        queue.borrow_mut().push_back(Envelope {
            key: self.key.clone(),
            op_id: self.op_id,
            notification,
        });
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("key", &self.key)
            .field("op_id", &self.op_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::json;

    fn key(raw: &str) -> InstanceKey {
        InstanceKey::new(raw).unwrap()
    }

    #[test]
    fn test_emitter_queues_in_order() {
        let inbox = Inbox::new();
        let emitter = inbox.emitter(key("q1"), 3);

        emitter.next();
        emitter.error(ClientError::network("down"));

        assert_eq!(inbox.len(), 2);
        let first = inbox.pop().unwrap();
        assert_eq!(first.key, key("q1"));
        assert_eq!(first.op_id, 3);
        assert_eq!(first.notification, Notification::Next);
        assert!(matches!(inbox.pop().unwrap().notification, Notification::Error(_)));
        assert!(inbox.pop().is_none());
    }

    #[test]
    fn test_emitter_after_inbox_dropped() {
        let inbox = Inbox::new();
        let emitter = inbox.emitter(key("m1"), 1);
        assert!(emitter.is_connected());

        drop(inbox);
        assert!(!emitter.is_connected());
        emitter.completed(OperationResult::ready(json!({"ok": true})));
    }

    #[test]
    fn test_purge() {
        let inbox = Inbox::new();
        inbox.emitter(key("q1"), 1).next();
        inbox.emitter(key("q2"), 1).next();
        inbox.emitter(key("q1"), 2).next();

        assert_eq!(inbox.purge(&key("q1")), 2);
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox.pop().unwrap().key, key("q2"));
    }
}
