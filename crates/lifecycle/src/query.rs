//! Query lifecycle management.
//!
//! A [`QueryManager`] owns one [`QueryEntry`] per mounted query component:
//! the observable handle, the props of the last render, the data kept for
//! stale-while-revalidate display and the active subscription, if any.
//!
//! Lifecycle:
//!
//! ```text
//! init ──► did_mount ──► will_receive_props* ──► destroy
//!   │                          │
//!   └── subscribe              ├── set_variables   (only variables changed)
//!                              ├── set_options     (other options changed)
//!                              └── resubscribe     (document changed)
//! ```
//!
//! At most one subscription is active per instance key: a new one is only
//! created when the entry holds none, and releasing drops the handle.

use crate::delivery::Delivery;
use crate::projection::{previous_data_for, project};
use hashbrown::HashMap;
use weft_core::util::shallow_equal;
use weft_core::{
    ClientError, ContextConfig, Document, Error, ErrorPolicy, FetchMoreOptions, FetchPolicy,
    InstanceKey, NetworkStatus, Result, UpdateQueryFn, Value, Variables, WatchQueryOptions,
};
use weft_reactive::{Inbox, ObservableQuery, OperationId, Subscription};
use weft_store::{QuerySnapshot, Store};

/// The data-relevant props of a query component.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryProps {
    pub key: InstanceKey,
    pub query: Document,
    pub variables: Variables,
    pub fetch_policy: Option<FetchPolicy>,
    pub error_policy: Option<ErrorPolicy>,
    /// Poll interval in milliseconds.
    pub poll_interval: Option<u64>,
    pub notify_on_network_status_change: bool,
    pub skip: bool,
}

impl QueryProps {
    /// Creates props for `query` under `key`.
    pub fn new(key: InstanceKey, query: Document) -> Self {
        Self {
            key,
            query,
            variables: Variables::new(),
            fetch_policy: None,
            error_policy: None,
            poll_interval: None,
            notify_on_network_status_change: false,
            skip: false,
        }
    }

    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_fetch_policy(mut self, policy: FetchPolicy) -> Self {
        self.fetch_policy = Some(policy);
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = Some(policy);
        self
    }

    pub fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval = Some(interval_ms);
        self
    }

    pub fn notify_on_network_status_change(mut self, notify: bool) -> Self {
        self.notify_on_network_status_change = notify;
        self
    }

    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    /// Builds the client options, filling unset policies from `config`.
    pub fn watch_options(&self, config: &ContextConfig) -> WatchQueryOptions {
        WatchQueryOptions {
            query: self.query.clone(),
            variables: self.variables.clone(),
            fetch_policy: self.fetch_policy.or(config.default_fetch_policy),
            error_policy: self.error_policy.or(config.default_error_policy),
            poll_interval: self.poll_interval,
            notify_on_network_status_change: self.notify_on_network_status_change,
        }
    }
}

/// Per-instance record of a mounted query.
pub struct QueryEntry {
    observable: Box<dyn ObservableQuery>,
    props: QueryProps,
    previous_data: Option<Value>,
    subscription: Option<Subscription>,
    has_mounted: bool,
    op_id: OperationId,
    /// Set when the subscription started on an already settled result; the
    /// observable replays that result once and the replay is dropped.
    skip_replay: bool,
}

impl QueryEntry {
    fn snapshot(&self) -> QuerySnapshot {
        let last = self.observable.last_result();
        project(
            &self.observable.current_result(),
            self.previous_data.as_ref(),
            last.as_ref(),
            self.observable.variables(),
        )
    }

    fn release(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }

    /// Returns the props of the last render.
    pub fn props(&self) -> &QueryProps {
        &self.props
    }

    /// Returns true once the component was mounted.
    pub fn has_mounted(&self) -> bool {
        self.has_mounted
    }

    /// Returns true while a subscription is active.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Returns the id of the current subscription.
    pub fn op_id(&self) -> OperationId {
        self.op_id
    }
}

/// Tracks every mounted query by instance key.
pub struct QueryManager {
    entries: HashMap<InstanceKey, QueryEntry>,
    config: ContextConfig,
    next_op_id: OperationId,
}

impl QueryManager {
    /// Creates a manager applying the defaults of `config`.
    pub fn new(config: ContextConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            next_op_id: 0,
        }
    }

    /// Creates the observable for `props.key` and, unless skipped,
    /// subscribes to it.
    ///
    /// Returns `Ok(false)` without doing anything if the key already has an
    /// observable.
    pub fn init(&mut self, store: &mut Store, inbox: &Inbox, props: QueryProps) -> Result<bool> {
        if self.entries.contains_key(&props.key) {
            tracing::trace!(key = %props.key, "query already initialized");
            return Ok(false);
        }
        let client = store.client()?;
        let observable = client.watch_query(props.watch_options(&self.config))?;
        let key = props.key.clone();
        let skip = props.skip;

        tracing::debug!(key = %key, skip, "query initialized");
        self.entries.insert(
            key.clone(),
            QueryEntry {
                observable,
                props,
                previous_data: None,
                subscription: None,
                has_mounted: false,
                op_id: 0,
                skip_replay: false,
            },
        );
        self.publish(store, &key)?;
        if !skip {
            self.start_subscription(inbox, &key)?;
        }
        Ok(true)
    }

    /// Marks the component mounted and subscribes unless skipped.
    pub fn did_mount(&mut self, inbox: &Inbox, key: &InstanceKey) -> Result<()> {
        let entry = self.entry_mut(key)?;
        entry.has_mounted = true;
        if entry.props.skip {
            return Ok(());
        }
        self.start_subscription(inbox, key)
    }

    /// Reconciles the entry with the props of a new render.
    ///
    /// Returns `Ok(false)` when the props are unchanged.
    pub fn will_receive_props(&mut self, inbox: &Inbox, next: QueryProps) -> Result<bool> {
        let key = next.key.clone();
        let config = &self.config;
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or_else(|| Error::unknown_instance(key.as_str()))?;

        if next.skip && !entry.props.skip {
            tracing::debug!(key = %key, "query skipped");
            entry.release();
            entry.props = next;
            return Ok(true);
        }
        if entry.props == next {
            return Ok(false);
        }

        let prev_options = entry.props.watch_options(config);
        let next_options = next.watch_options(config);
        if entry.props.query != next.query {
            tracing::debug!(key = %key, "query document changed");
            entry.release();
        }
        if prev_options.differs_only_in_variables(&next_options) {
            entry.observable.set_variables(next.variables.clone())?;
        } else if prev_options != next_options {
            entry.observable.set_options(next_options)?;
        }

        let skip = next.skip;
        entry.props = next;
        if !skip {
            self.start_subscription(inbox, &key)?;
        }
        Ok(true)
    }

    /// Forwards a variables change to the observable.
    ///
    /// Returns `Ok(false)` when `new` equals `old`; nothing is sent and the
    /// subscription is left alone.
    pub fn update(&mut self, key: &InstanceKey, new: Variables, old: &Variables) -> Result<bool> {
        let entry = self.entry_mut(key)?;
        if shallow_equal(&new, old) {
            return Ok(false);
        }
        entry.observable.set_variables(new.clone())?;
        entry.props.variables = new;
        Ok(true)
    }

    /// Unsubscribes and forgets the entry, removing its store module.
    ///
    /// Returns false if there was no entry. No notification queued for the
    /// key is applied afterwards.
    pub fn destroy(&mut self, store: &mut Store, inbox: &Inbox, key: &InstanceKey) -> bool {
        let Some(mut entry) = self.entries.remove(key) else {
            return false;
        };
        entry.release();
        let dropped = inbox.purge(key);
        store.remove_query(key);
        tracing::debug!(key = %key, dropped, "query destroyed");
        true
    }

    /// Refetches, optionally with new variables.
    pub fn refetch(&mut self, key: &InstanceKey, variables: Option<Variables>) -> Result<()> {
        self.entry_mut(key)?.observable.refetch(variables)?;
        Ok(())
    }

    /// Loads more data into the query.
    pub fn fetch_more(&mut self, key: &InstanceKey, options: FetchMoreOptions) -> Result<()> {
        self.entry_mut(key)?.observable.fetch_more(options)?;
        Ok(())
    }

    /// Rewrites the query's cached data.
    pub fn update_query(&mut self, key: &InstanceKey, map: UpdateQueryFn) -> Result<()> {
        self.entry_mut(key)?.observable.update_query(map);
        Ok(())
    }

    /// Starts polling.
    pub fn start_polling(&mut self, key: &InstanceKey, interval_ms: u64) -> Result<()> {
        self.entry_mut(key)?.observable.start_polling(interval_ms);
        Ok(())
    }

    /// Stops polling.
    pub fn stop_polling(&mut self, key: &InstanceKey) -> Result<()> {
        self.entry_mut(key)?.observable.stop_polling();
        Ok(())
    }

    /// Subscribes to the observable unless a subscription is active.
    pub fn start_subscription(&mut self, inbox: &Inbox, key: &InstanceKey) -> Result<()> {
        if self.entry(key)?.is_subscribed() {
            return Ok(());
        }
        self.next_op_id += 1;
        let op_id = self.next_op_id;
        let entry = self.entry_mut(key)?;

        let current = entry.snapshot();
        entry.previous_data = previous_data_for(&current, entry.previous_data.take());
        entry.skip_replay = current.network_status == NetworkStatus::Ready;
        entry.op_id = op_id;
        let subscription = entry.observable.subscribe(inbox.emitter(key.clone(), op_id));
        tracing::debug!(key = %key, op_id, subscription = subscription.id(), "query subscribed");
        entry.subscription = Some(subscription);
        Ok(())
    }

    /// Subscribes again after the stream failed.
    ///
    /// The observable's last result and error are cleared while subscribing,
    /// so an error it already delivered does not end the new subscription,
    /// and restored afterwards.
    pub fn resubscribe(&mut self, inbox: &Inbox, key: &InstanceKey) -> Result<()> {
        let entry = self.entry_mut(key)?;
        entry.release();
        let last_error = entry.observable.last_error();
        let last_result = entry.observable.last_result();
        entry.observable.reset_last_results();

        self.start_subscription(inbox, key)?;

        self.entry_mut(key)?
            .observable
            .restore_last_results(last_result, last_error);
        Ok(())
    }

    /// Applies a `next` notification.
    pub fn deliver_next(&mut self, store: &mut Store, key: &InstanceKey, op_id: OperationId) -> Result<Delivery> {
        let Some(entry) = self.current_entry(key, op_id) else {
            return Ok(Delivery::Stale);
        };
        if std::mem::take(&mut entry.skip_replay) {
            tracing::trace!(key = %key, op_id, "replayed result dropped");
            return Ok(Delivery::Swallowed);
        }
        self.publish(store, key)?;
        Ok(Delivery::Applied)
    }

    /// Applies an `error` notification.
    ///
    /// The query is resubscribed. GraphQL errors are published with the
    /// snapshot; any other error is returned to the caller.
    pub fn deliver_error(
        &mut self,
        store: &mut Store,
        inbox: &Inbox,
        key: &InstanceKey,
        op_id: OperationId,
        error: ClientError,
    ) -> Result<Delivery> {
        if self.current_entry(key, op_id).is_none() {
            return Ok(Delivery::Stale);
        }
        self.resubscribe(inbox, key)?;
        if !error.is_graphql() {
            tracing::warn!(key = %key, %error, "query failed without a GraphQL error");
            return Err(Error::unhandled_query(key.as_str(), error));
        }
        self.publish(store, key)?;
        Ok(Delivery::Applied)
    }

    /// Projects the current result of `key` into the store.
    pub fn publish(&self, store: &mut Store, key: &InstanceKey) -> Result<()> {
        let entry = self.entry(key)?;
        store.set_query(key, entry.snapshot());
        Ok(())
    }

    /// Projects the current result of `key` without publishing it.
    pub fn snapshot(&self, key: &InstanceKey) -> Result<QuerySnapshot> {
        Ok(self.entry(key)?.snapshot())
    }

    /// Returns the entry of `key`.
    pub fn get(&self, key: &InstanceKey) -> Option<&QueryEntry> {
        self.entries.get(key)
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

    /// Returns the number of active subscriptions across all entries.
    pub fn active_subscriptions(&self) -> usize {
        self.entries.values().filter(|e| e.is_subscribed()).count()
    }

    fn current_entry(&mut self, key: &InstanceKey, op_id: OperationId) -> Option<&mut QueryEntry> {
        self.entries
            .get_mut(key)
            .filter(|entry| entry.is_subscribed() && entry.op_id == op_id)
    }

    fn entry(&self, key: &InstanceKey) -> Result<&QueryEntry> {
        self.entries
            .get(key)
            .ok_or_else(|| Error::unknown_instance(key.as_str()))
    }

    fn entry_mut(&mut self, key: &InstanceKey) -> Result<&mut QueryEntry> {
        self.entries
            .get_mut(key)
            .ok_or_else(|| Error::unknown_instance(key.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::json;

    fn props() -> QueryProps {
        QueryProps::new(InstanceKey::new("q1").unwrap(), Document::new("{ a }"))
    }

    #[test]
    fn test_watch_options_fill_defaults() {
        let config = ContextConfig::default()
            .with_default_fetch_policy(FetchPolicy::CacheAndNetwork)
            .with_default_error_policy(ErrorPolicy::All);
        let options = props()
            .with_error_policy(ErrorPolicy::Ignore)
            .with_poll_interval(250)
            .watch_options(&config);
        assert_eq!(options.fetch_policy, Some(FetchPolicy::CacheAndNetwork));
        assert_eq!(options.error_policy, Some(ErrorPolicy::Ignore));
        assert_eq!(options.poll_interval, Some(250));
    }

    #[test]
    fn test_props_equality_covers_skip_and_variables() {
        let vars = json!({"id": 1}).as_object().cloned().unwrap();
        assert_eq!(props(), props());
        assert_ne!(props(), props().skip(true));
        assert_ne!(props(), props().with_variables(vars));
        assert_ne!(props(), props().notify_on_network_status_change(true));
    }

    #[test]
    fn test_update_unknown_key_with_equal_variables() {
        let mut manager = QueryManager::new(ContextConfig::default());
        let vars = json!({"id": 1}).as_object().cloned().unwrap();
        let err = manager.update(&props().key, vars.clone(), &vars).unwrap_err();
        assert!(matches!(err, Error::UnknownInstance { .. }));
    }
}
