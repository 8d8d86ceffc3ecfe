//! The global state tree.

use crate::module::{ModuleMap, MutationPatch, MutationState, QuerySnapshot};
use std::fmt;
use std::rc::Rc;
use weft_core::{Error, InstanceKey, Result};
use weft_reactive::{Client, SubscriptionId, SubscriptionManager};

/// Which module map a change touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Query,
    Mutation,
}

/// What happened to a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Set,
    Removed,
}

/// A change notification delivered to store listeners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreEvent {
    pub module: ModuleKind,
    pub key: InstanceKey,
    pub change: ChangeKind,
    pub revision: u64,
}

/// The part of the UI framework's state tree owned by Weft.
///
/// Holds the GraphQL client and the published state of every query and
/// mutation instance. Every change bumps the revision and notifies the
/// listeners, which is how the framework learns it must re-render.
pub struct Store {
    client: Option<Rc<dyn Client>>,
    queries: ModuleMap<QuerySnapshot>,
    mutations: ModuleMap<MutationState>,
    revision: u64,
    listeners: SubscriptionManager<StoreEvent>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Creates an empty store without a client.
    pub fn new() -> Self {
        Self {
            client: None,
            queries: ModuleMap::new(),
            mutations: ModuleMap::new(),
            revision: 0,
            listeners: SubscriptionManager::new(),
        }
    }

    /// Creates an empty store holding `client`.
    pub fn with_client(client: Rc<dyn Client>) -> Self {
        let mut store = Self::new();
        store.client = Some(client);
        store
    }

    /// Installs the GraphQL client.
    pub fn set_client(&mut self, client: Rc<dyn Client>) {
        self.client = Some(client);
    }

    /// Returns the GraphQL client.
    pub fn client(&self) -> Result<Rc<dyn Client>> {
        self.client.clone().ok_or(Error::MissingClient)
    }

    /// Returns true if a client is installed.
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Returns the revision, bumped on every change.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the snapshot of a query instance.
    pub fn query(&self, key: &InstanceKey) -> Option<&QuerySnapshot> {
        self.queries.get(key)
    }

    /// Returns the state of a mutation instance.
    pub fn mutation(&self, key: &InstanceKey) -> Option<&MutationState> {
        self.mutations.get(key)
    }

    /// Returns the query module map.
    pub fn queries(&self) -> &ModuleMap<QuerySnapshot> {
        &self.queries
    }

    /// Returns the mutation module map.
    pub fn mutations(&self) -> &ModuleMap<MutationState> {
        &self.mutations
    }

    /// Publishes the snapshot of a query instance.
    pub fn set_query(&mut self, key: &InstanceKey, snapshot: QuerySnapshot) {
        self.queries.insert(key.clone(), snapshot);
        self.changed(ModuleKind::Query, key, ChangeKind::Set);
    }

    /// Removes a query instance. Returns its last snapshot.
    pub fn remove_query(&mut self, key: &InstanceKey) -> Option<QuerySnapshot> {
        let removed = self.queries.remove(key);
        if removed.is_some() {
            self.changed(ModuleKind::Query, key, ChangeKind::Removed);
        }
        removed
    }

    /// Creates the state of a mutation instance, keeping an existing one.
    pub fn init_mutation(&mut self, key: &InstanceKey) {
        if !self.mutations.contains(key) {
            self.mutations.insert(key.clone(), MutationState::default());
            self.changed(ModuleKind::Mutation, key, ChangeKind::Set);
        }
    }

    /// Merges `patch` into the state of a mutation instance.
    pub fn patch_mutation(&mut self, key: &InstanceKey, patch: MutationPatch) {
        self.mutations.update(key, |state| patch.apply(state));
        self.changed(ModuleKind::Mutation, key, ChangeKind::Set);
    }

    /// Removes a mutation instance. Returns its last state.
    pub fn remove_mutation(&mut self, key: &InstanceKey) -> Option<MutationState> {
        let removed = self.mutations.remove(key);
        if removed.is_some() {
            self.changed(ModuleKind::Mutation, key, ChangeKind::Removed);
        }
        removed
    }

    /// Registers a change listener.
    pub fn on_change<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Removes a change listener.
    pub fn off_change(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn changed(&mut self, module: ModuleKind, key: &InstanceKey, change: ChangeKind) {
        self.revision += 1;
        tracing::trace!(key = %key, ?module, ?change, revision = self.revision, "store changed");
        if !self.listeners.is_empty() {
            self.listeners.notify_all(&StoreEvent {
                module,
                key: key.clone(),
                change,
                revision: self.revision,
            });
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("has_client", &self.has_client())
            .field("queries", &self.queries.len())
            .field("mutations", &self.mutations.len())
            .field("revision", &self.revision)
            .finish()
    }
}
