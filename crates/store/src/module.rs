//! Per-instance module state.

use hashbrown::HashMap;
use serde::Serialize;
use weft_core::{ClientError, GraphQlError, InstanceKey, NetworkStatus, Value, Variables};

/// The published state of one query instance.
///
/// This is the projection of the observable's result that render callbacks
/// see; it is replaced wholesale on every republish.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QuerySnapshot {
    pub data: Option<Value>,
    pub error: Option<ClientError>,
    pub loading: bool,
    pub network_status: NetworkStatus,
    pub variables: Variables,
}

impl QuerySnapshot {
    /// Returns the GraphQL errors of the snapshot, if any.
    pub fn errors(&self) -> &[GraphQlError] {
        self.error
            .as_ref()
            .map(|e| e.graphql_errors.as_slice())
            .unwrap_or(&[])
    }
}

/// The published state of one mutation instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MutationState {
    pub called: bool,
    pub loading: bool,
    pub data: Option<Value>,
    pub errors: Vec<GraphQlError>,
    pub error: Option<ClientError>,
}

/// A partial update of a [`MutationState`]. Unset fields are kept.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MutationPatch {
    pub called: Option<bool>,
    pub loading: Option<bool>,
    pub data: Option<Option<Value>>,
    pub errors: Option<Vec<GraphQlError>>,
    pub error: Option<Option<ClientError>>,
}

impl MutationPatch {
    /// The patch published when a mutation starts.
    pub fn started() -> Self {
        Self {
            called: Some(true),
            loading: Some(true),
            data: Some(None),
            error: Some(None),
            errors: None,
        }
    }

    /// The patch published when a mutation completes.
    pub fn completed(data: Option<Value>, errors: Vec<GraphQlError>) -> Self {
        Self {
            loading: Some(false),
            data: Some(data),
            errors: Some(errors),
            ..Self::default()
        }
    }

    /// The patch published when a mutation fails.
    pub fn failed(error: ClientError) -> Self {
        Self {
            loading: Some(false),
            errors: Some(error.graphql_errors.clone()),
            error: Some(Some(error)),
            ..Self::default()
        }
    }

    /// Applies the patch.
    pub fn apply(self, state: &mut MutationState) {
        if let Some(called) = self.called {
            state.called = called;
        }
        if let Some(loading) = self.loading {
            state.loading = loading;
        }
        if let Some(data) = self.data {
            state.data = data;
        }
        if let Some(errors) = self.errors {
            state.errors = errors;
        }
        if let Some(error) = self.error {
            state.error = error;
        }
    }
}

/// Module states keyed by instance key.
#[derive(Clone, Debug)]
pub struct ModuleMap<T> {
    modules: HashMap<InstanceKey, T>,
}

impl<T> Default for ModuleMap<T> {
    fn default() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }
}

impl<T: Default> ModuleMap<T> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the state of `key`.
    pub fn insert(&mut self, key: InstanceKey, state: T) {
        self.modules.insert(key, state);
    }

    /// Updates the state of `key` in place, starting from the default state
    /// if there is none yet.
    pub fn update<F>(&mut self, key: &InstanceKey, f: F)
    where
        F: FnOnce(&mut T),
    {
        f(self.modules.entry(key.clone()).or_default());
    }

    /// Returns the state of `key`.
    pub fn get(&self, key: &InstanceKey) -> Option<&T> {
        self.modules.get(key)
    }

    /// Removes the state of `key`.
    pub fn remove(&mut self, key: &InstanceKey) -> Option<T> {
        self.modules.remove(key)
    }

    /// Returns true if `key` has a state.
    pub fn contains(&self, key: &InstanceKey) -> bool {
        self.modules.contains_key(key)
    }

    /// Returns the number of modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if there are no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Iterates over the instance keys.
    pub fn keys(&self) -> impl Iterator<Item = &InstanceKey> {
        self.modules.keys()
    }
}
