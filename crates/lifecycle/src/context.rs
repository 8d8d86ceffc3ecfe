//! The binding context owned by the embedding application.

use crate::delivery::{Delivery, FlushStats};
use crate::mutation::{MutationManager, MutationProps};
use crate::query::{QueryManager, QueryProps};
use std::fmt;
use std::rc::Rc;
use weft_core::{
    ContextConfig, FetchMoreOptions, InstanceKey, MutationOptions, Result, UpdateQueryFn,
    Variables,
};
use weft_reactive::{Client, Envelope, Inbox, Notification, OperationId};
use weft_store::{MutationState, QuerySnapshot, Store};

/// Everything Weft keeps between renders.
///
/// A context owns the store, the inbox observables report into and one
/// manager per operation kind. Lifecycle calls only enqueue work with the
/// client; results reach the store when the application calls
/// [`Context::flush`] on its event loop.
pub struct Context {
    config: ContextConfig,
    store: Store,
    inbox: Inbox,
    queries: QueryManager,
    mutations: MutationManager,
}

impl Default for Context {
    fn default() -> Self {
        Self::with_config(ContextConfig::default())
    }
}

impl Context {
    /// Creates a context after validating `config`.
    pub fn new(config: ContextConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: ContextConfig) -> Self {
        Self {
            queries: QueryManager::new(config.clone()),
            mutations: MutationManager::new(),
            store: Store::new(),
            inbox: Inbox::new(),
            config,
        }
    }

    /// Installs `client` and returns the context.
    pub fn with_client(mut self, client: Rc<dyn Client>) -> Self {
        self.store.set_client(client);
        self
    }

    /// Installs or replaces the client.
    pub fn set_client(&mut self, client: Rc<dyn Client>) {
        self.store.set_client(client);
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn inbox(&self) -> &Inbox {
        &self.inbox
    }

    pub fn queries(&self) -> &QueryManager {
        &self.queries
    }

    pub fn mutations(&self) -> &MutationManager {
        &self.mutations
    }

    /// Allocates a fresh query key, scoped by `user_key` when given.
    pub fn allocate_query_key(&self, user_key: Option<&str>) -> InstanceKey {
        InstanceKey::allocate(&self.config.query_prefix).scoped(user_key)
    }

    /// Allocates a fresh mutation key, scoped by `user_key` when given.
    pub fn allocate_mutation_key(&self, user_key: Option<&str>) -> InstanceKey {
        InstanceKey::allocate(&self.config.mutation_prefix).scoped(user_key)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// See [`QueryManager::init`].
    pub fn init_query(&mut self, props: QueryProps) -> Result<bool> {
        self.queries.init(&mut self.store, &self.inbox, props)
    }

    /// See [`QueryManager::did_mount`].
    pub fn did_mount(&mut self, key: &InstanceKey) -> Result<()> {
        self.queries.did_mount(&self.inbox, key)
    }

    /// See [`QueryManager::will_receive_props`].
    ///
    /// Changed props republish the query so the store reflects what the
    /// observable reports after the change.
    pub fn will_receive_props(&mut self, props: QueryProps) -> Result<bool> {
        let key = props.key.clone();
        let changed = self.queries.will_receive_props(&self.inbox, props)?;
        if changed {
            self.queries.publish(&mut self.store, &key)?;
        }
        Ok(changed)
    }

    /// See [`QueryManager::update`].
    pub fn update_variables(
        &mut self,
        key: &InstanceKey,
        new: Variables,
        old: &Variables,
    ) -> Result<bool> {
        let changed = self.queries.update(key, new, old)?;
        if changed {
            self.queries.publish(&mut self.store, key)?;
        }
        Ok(changed)
    }

    /// See [`QueryManager::destroy`].
    pub fn destroy_query(&mut self, key: &InstanceKey) -> bool {
        self.queries.destroy(&mut self.store, &self.inbox, key)
    }

    pub fn refetch(&mut self, key: &InstanceKey, variables: Option<Variables>) -> Result<()> {
        self.queries.refetch(key, variables)?;
        self.queries.publish(&mut self.store, key)
    }

    pub fn fetch_more(&mut self, key: &InstanceKey, options: FetchMoreOptions) -> Result<()> {
        self.queries.fetch_more(key, options)?;
        self.queries.publish(&mut self.store, key)
    }

    pub fn update_query(&mut self, key: &InstanceKey, map: UpdateQueryFn) -> Result<()> {
        self.queries.update_query(key, map)?;
        self.queries.publish(&mut self.store, key)
    }

    pub fn start_polling(&mut self, key: &InstanceKey, interval_ms: u64) -> Result<()> {
        self.queries.start_polling(key, interval_ms)
    }

    pub fn stop_polling(&mut self, key: &InstanceKey) -> Result<()> {
        self.queries.stop_polling(key)
    }

    /// Returns the published snapshot of `key`.
    pub fn query_snapshot(&self, key: &InstanceKey) -> Option<&QuerySnapshot> {
        self.store.query(key)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// See [`MutationManager::init`].
    pub fn init_mutation(&mut self, props: MutationProps) -> Result<bool> {
        self.mutations.init(&mut self.store, props)
    }

    /// See [`MutationManager::execute`].
    pub fn execute(&mut self, key: &InstanceKey, options: &MutationOptions) -> Result<OperationId> {
        self.mutations
            .execute(&mut self.store, &self.inbox, key, options)
    }

    /// See [`MutationManager::destroy`].
    pub fn destroy_mutation(&mut self, key: &InstanceKey) -> bool {
        self.mutations.destroy(&mut self.store, &self.inbox, key)
    }

    /// Returns the published state of the mutation `key`.
    pub fn mutation_state(&self, key: &InstanceKey) -> Option<&MutationState> {
        self.store.mutation(key)
    }

    // ========================================================================
    // Inbox
    // ========================================================================

    /// Applies queued notifications to the store.
    ///
    /// At most `config.flush_batch` notifications are taken per call when a
    /// batch limit is configured. An unhandled error stops the flush; the
    /// notifications behind it stay queued for the next call.
    pub fn flush(&mut self) -> Result<FlushStats> {
        let limit = self.config.flush_batch.unwrap_or(usize::MAX);
        let mut stats = FlushStats::default();

        while stats.processed() < limit {
            let Some(envelope) = self.inbox.pop() else {
                break;
            };
            let delivery = self.dispatch(envelope)?;
            stats.record(delivery);
        }

        stats.pending = self.inbox.len();
        if stats.processed() > 0 {
            tracing::trace!(
                applied = stats.applied,
                swallowed = stats.swallowed,
                stale = stats.stale,
                pending = stats.pending,
                "inbox flushed"
            );
        }
        Ok(stats)
    }

    /// Flushes until the inbox is empty.
    ///
    /// Returns the combined counters of every pass.
    pub fn flush_all(&mut self) -> Result<FlushStats> {
        let mut total = FlushStats::default();
        loop {
            let stats = self.flush()?;
            total.applied += stats.applied;
            total.swallowed += stats.swallowed;
            total.stale += stats.stale;
            total.pending = stats.pending;
            if stats.pending == 0 || stats.processed() == 0 {
                return Ok(total);
            }
        }
    }

    fn dispatch(&mut self, envelope: Envelope) -> Result<Delivery> {
        let Envelope {
            key,
            op_id,
            notification,
        } = envelope;
        tracing::trace!(key = %key, op_id, ?notification, "notification");

        match notification {
            Notification::Next => self.queries.deliver_next(&mut self.store, &key, op_id),
            Notification::Error(error) => {
                self.queries
                    .deliver_error(&mut self.store, &self.inbox, &key, op_id, error)
            }
            Notification::Completed(result) => {
                self.mutations
                    .deliver_completed(&mut self.store, &key, op_id, result)
            }
            Notification::Failed(error) => {
                self.mutations
                    .deliver_failed(&mut self.store, &key, op_id, error)
            }
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("inbox", &self.inbox)
            .field("queries", &self.queries.len())
            .field("mutations", &self.mutations.len())
            .finish()
    }
}
