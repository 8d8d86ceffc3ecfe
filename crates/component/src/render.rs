//! Render props.
//!
//! What a component hands its render callback: the published state of the
//! instance plus a control handle. Controls only hold the instance key and
//! act through the context passed in by the event handler that uses them.

use serde::Serialize;
use std::rc::Rc;
use weft_core::{
    ClientError, FetchMoreOptions, GraphQlError, InstanceKey, MutationOptions, NetworkStatus,
    Result, UpdateQueryArgs, Value, Variables,
};
use weft_lifecycle::Context;
use weft_reactive::OperationId;
use weft_store::{MutationState, QuerySnapshot};

/// Operations a query's render callback can trigger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryControls {
    key: InstanceKey,
}

impl QueryControls {
    pub fn new(key: InstanceKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> &InstanceKey {
        &self.key
    }

    pub fn refetch(&self, ctx: &mut Context, variables: Option<Variables>) -> Result<()> {
        ctx.refetch(&self.key, variables)
    }

    pub fn fetch_more(&self, ctx: &mut Context, options: FetchMoreOptions) -> Result<()> {
        ctx.fetch_more(&self.key, options)
    }

    pub fn update_query<F>(&self, ctx: &mut Context, map: F) -> Result<()>
    where
        F: Fn(&Value, &UpdateQueryArgs) -> Value + 'static,
    {
        ctx.update_query(&self.key, Rc::new(map))
    }

    pub fn start_polling(&self, ctx: &mut Context, interval_ms: u64) -> Result<()> {
        ctx.start_polling(&self.key, interval_ms)
    }

    pub fn stop_polling(&self, ctx: &mut Context) -> Result<()> {
        ctx.stop_polling(&self.key)
    }
}

/// What a query's render callback sees.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryRenderProps {
    pub data: Option<Value>,
    pub errors: Vec<GraphQlError>,
    pub error: Option<ClientError>,
    pub loading: bool,
    pub network_status: NetworkStatus,
    pub variables: Variables,
    #[serde(skip)]
    pub controls: QueryControls,
}

impl QueryRenderProps {
    /// Builds render props from a query snapshot.
    pub fn new(key: InstanceKey, snapshot: QuerySnapshot) -> Self {
        Self {
            errors: snapshot.errors().to_vec(),
            data: snapshot.data,
            error: snapshot.error,
            loading: snapshot.loading,
            network_status: snapshot.network_status,
            variables: snapshot.variables,
            controls: QueryControls::new(key),
        }
    }

    /// Shorthand for `controls.refetch`.
    pub fn refetch(&self, ctx: &mut Context, variables: Option<Variables>) -> Result<()> {
        self.controls.refetch(ctx, variables)
    }

    /// Shorthand for `controls.fetch_more`.
    pub fn fetch_more(&self, ctx: &mut Context, options: FetchMoreOptions) -> Result<()> {
        self.controls.fetch_more(ctx, options)
    }
}

/// Runs a mutation from its render callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationControls {
    key: InstanceKey,
}

impl MutationControls {
    pub fn new(key: InstanceKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> &InstanceKey {
        &self.key
    }

    /// Runs the mutation; `options` override the component's props.
    pub fn execute(&self, ctx: &mut Context, options: &MutationOptions) -> Result<OperationId> {
        ctx.execute(&self.key, options)
    }
}

/// What a mutation's render callback sees.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MutationRenderProps {
    pub called: bool,
    pub loading: bool,
    pub data: Option<Value>,
    pub errors: Vec<GraphQlError>,
    pub error: Option<ClientError>,
    #[serde(skip)]
    pub controls: MutationControls,
}

impl MutationRenderProps {
    /// Builds render props from a published mutation state.
    pub fn new(key: InstanceKey, state: MutationState) -> Self {
        Self {
            called: state.called,
            loading: state.loading,
            data: state.data,
            errors: state.errors,
            error: state.error,
            controls: MutationControls::new(key),
        }
    }

    /// Shorthand for `controls.execute`.
    pub fn execute(&self, ctx: &mut Context, options: &MutationOptions) -> Result<OperationId> {
        self.controls.execute(ctx, options)
    }
}
