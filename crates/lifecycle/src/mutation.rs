//! Mutation lifecycle management.
//!
//! A mutation component has no observable: each `execute` hands a request
//! to the client and the outcome comes back through the inbox. Only the
//! outcome of the most recent `execute` is applied.

use crate::delivery::Delivery;
use hashbrown::HashMap;
use std::fmt;
use std::rc::Rc;
use weft_core::{
    ClientError, Document, Error, InstanceKey, MutationOptions, MutationRequest, MutationUpdater,
    OperationResult, Result, Value,
};
use weft_reactive::{Inbox, OperationId};
use weft_store::{MutationPatch, Store};

/// Called with the result data of a completed mutation.
pub type CompletedHandler = Rc<dyn Fn(&Value)>;

/// Called with the error of a failed mutation.
pub type ErrorHandler = Rc<dyn Fn(&ClientError)>;

/// The props of a mutation component.
#[derive(Clone)]
pub struct MutationProps {
    pub key: InstanceKey,
    pub mutation: Document,
    /// Defaults for every `execute`; per-call options override them.
    pub options: MutationOptions,
    /// Do not publish results or call `on_completed`.
    pub ignore_results: bool,
    pub on_completed: Option<CompletedHandler>,
    pub on_error: Option<ErrorHandler>,
    pub update: Option<MutationUpdater>,
}

impl MutationProps {
    /// Creates props for `mutation` under `key`.
    pub fn new(key: InstanceKey, mutation: Document) -> Self {
        Self {
            key,
            mutation,
            options: MutationOptions::default(),
            ignore_results: false,
            on_completed: None,
            on_error: None,
            update: None,
        }
    }

    pub fn with_options(mut self, options: MutationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn ignore_results(mut self, ignore: bool) -> Self {
        self.ignore_results = ignore;
        self
    }

    pub fn on_completed<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value) + 'static,
    {
        self.on_completed = Some(Rc::new(handler));
        self
    }

    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ClientError) + 'static,
    {
        self.on_error = Some(Rc::new(handler));
        self
    }

    pub fn with_update<F>(mut self, update: F) -> Self
    where
        F: Fn(&Value) + 'static,
    {
        self.update = Some(Rc::new(update));
        self
    }
}

impl fmt::Debug for MutationProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationProps")
            .field("key", &self.key)
            .field("mutation", &self.mutation)
            .field("options", &self.options)
            .field("ignore_results", &self.ignore_results)
            .field("on_completed", &self.on_completed.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("update", &self.update.is_some())
            .finish()
    }
}

struct MutationEntry {
    props: MutationProps,
    /// Id of the most recent `execute`; 0 before the first one.
    op_id: OperationId,
}

/// Tracks every mounted mutation by instance key.
#[derive(Default)]
pub struct MutationManager {
    entries: HashMap<InstanceKey, MutationEntry>,
    next_op_id: OperationId,
}

impl MutationManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the module of `props.key`.
    ///
    /// When the key already exists only its props are refreshed, so the
    /// latest handlers are used; returns `Ok(false)` in that case.
    pub fn init(&mut self, store: &mut Store, props: MutationProps) -> Result<bool> {
        if let Some(entry) = self.entries.get_mut(&props.key) {
            entry.props = props;
            return Ok(false);
        }
        store.client()?;
        let key = props.key.clone();
        store.init_mutation(&key);
        self.entries.insert(key.clone(), MutationEntry { props, op_id: 0 });
        tracing::debug!(key = %key, "mutation initialized");
        Ok(true)
    }

    /// Runs the mutation with per-call `options`.
    ///
    /// Returns the id of the new operation. A request the client rejects
    /// synchronously is handled like an asynchronous failure.
    pub fn execute(
        &mut self,
        store: &mut Store,
        inbox: &Inbox,
        key: &InstanceKey,
        options: &MutationOptions,
    ) -> Result<OperationId> {
        let client = store.client()?;
        self.next_op_id += 1;
        let op_id = self.next_op_id;
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| Error::unknown_instance(key.as_str()))?;

        let loading = store.mutation(key).map(|m| m.loading).unwrap_or(false);
        if !loading && !entry.props.ignore_results {
            store.patch_mutation(key, MutationPatch::started());
        }
        entry.op_id = op_id;

        let request = MutationRequest::build(
            &entry.props.mutation,
            &entry.props.options,
            options,
            entry.props.update.clone(),
        );
        tracing::debug!(key = %key, op_id, "mutation started");
        match client.mutate(request, inbox.emitter(key.clone(), op_id)) {
            Ok(()) => Ok(op_id),
            Err(error) => {
                self.deliver_failed(store, key, op_id, error)?;
                Ok(op_id)
            }
        }
    }

    /// Applies a completed mutation.
    pub fn deliver_completed(
        &mut self,
        store: &mut Store,
        key: &InstanceKey,
        op_id: OperationId,
        result: OperationResult,
    ) -> Result<Delivery> {
        let Some(entry) = self.current_entry(key, op_id) else {
            return Ok(Delivery::Stale);
        };
        if entry.props.ignore_results {
            return Ok(Delivery::Applied);
        }
        let on_completed = entry.props.on_completed.clone();
        let data = result.data.clone();
        store.patch_mutation(key, MutationPatch::completed(result.data, result.errors));
        tracing::debug!(key = %key, op_id, "mutation completed");

        if let Some(handler) = on_completed {
            handler(data.as_ref().unwrap_or(&Value::Null));
        }
        Ok(Delivery::Applied)
    }

    /// Applies a failed mutation.
    ///
    /// The error is published with the module. Without an `on_error`
    /// handler it is also returned to the caller.
    pub fn deliver_failed(
        &mut self,
        store: &mut Store,
        key: &InstanceKey,
        op_id: OperationId,
        error: ClientError,
    ) -> Result<Delivery> {
        let Some(entry) = self.current_entry(key, op_id) else {
            return Ok(Delivery::Stale);
        };
        let ignore_results = entry.props.ignore_results;
        let on_error = entry.props.on_error.clone();
        if !ignore_results {
            store.patch_mutation(key, MutationPatch::failed(error.clone()));
        }

        match on_error {
            Some(handler) => {
                handler(&error);
                Ok(Delivery::Applied)
            }
            None => {
                tracing::warn!(key = %key, op_id, %error, "unhandled mutation error");
                Err(Error::unhandled_mutation(key.as_str(), error))
            }
        }
    }

    /// Forgets the entry and removes its store module.
    ///
    /// Returns false if there was no entry. Outcomes of mutations still in
    /// flight are ignored.
    pub fn destroy(&mut self, store: &mut Store, inbox: &Inbox, key: &InstanceKey) -> bool {
        if self.entries.remove(key).is_none() {
            return false;
        }
        let dropped = inbox.purge(key);
        store.remove_mutation(key);
        tracing::debug!(key = %key, dropped, "mutation destroyed");
        true
    }

    /// Returns the props of `key`.
    pub fn props(&self, key: &InstanceKey) -> Option<&MutationProps> {
        self.entries.get(key).map(|e| &e.props)
    }

    /// Returns true if `key` has an entry.
    pub fn contains(&self, key: &InstanceKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn current_entry(&self, key: &InstanceKey, op_id: OperationId) -> Option<&MutationEntry> {
        self.entries.get(key).filter(|entry| entry.op_id == op_id)
    }
}
