//! Component constructors.
//!
//! `query(document)` and `mutation(document)` are called once per component
//! definition. Each allocates a base key; every use of the component gets
//! that key, or `<base>[<key>]` when it passes a `key` attribute, so several
//! uses of one definition stay apart.
//!
//! Attributes arrive as a JSON object the way a framework passes them.
//! Null attributes are ignored.

use crate::component::{Mutation, Query};
use crate::render::{MutationRenderProps, QueryRenderProps};
use crate::vnode::{Child, View};
use serde::Deserialize;
use weft_core::util::{compact, omit};
use weft_core::{
    Document, ErrorPolicy, FetchPolicy, InstanceKey, Map, MutationOptions, RefetchQuery, Result,
    Value, Variables, DEFAULT_MUTATION_PREFIX, DEFAULT_QUERY_PREFIX,
};
use weft_lifecycle::{Context, MutationProps, QueryProps};

const KEY_ATTRIBUTE: &str = "key";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QueryAttributes {
    variables: Variables,
    fetch_policy: Option<FetchPolicy>,
    error_policy: Option<ErrorPolicy>,
    poll_interval: Option<u64>,
    notify_on_network_status_change: bool,
    skip: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MutationAttributes {
    variables: Option<Variables>,
    optimistic_response: Option<Value>,
    refetch_queries: Option<Vec<String>>,
    ignore_results: bool,
}

/// Splits `attributes` into the user key and the remaining attributes.
fn split_attributes(attributes: &Map<String, Value>) -> (Option<String>, Value) {
    let attributes = compact(attributes);
    let user_key = attributes.get(KEY_ATTRIBUTE).map(|key| match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    });
    (user_key, Value::Object(omit(&attributes, &[KEY_ATTRIBUTE])))
}

/// A query component definition.
#[derive(Clone, Debug)]
pub struct QueryComponent {
    document: Document,
    base: InstanceKey,
}

/// Defines a query component for `document`.
pub fn query(document: Document) -> QueryComponent {
    QueryComponent {
        document,
        base: InstanceKey::allocate(DEFAULT_QUERY_PREFIX),
    }
}

impl QueryComponent {
    /// Defines a query component whose keys use the context's prefix.
    pub fn in_context(ctx: &Context, document: Document) -> Self {
        Self {
            document,
            base: ctx.allocate_query_key(None),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn base_key(&self) -> &InstanceKey {
        &self.base
    }

    /// Returns the instance key of one use.
    pub fn key(&self, user_key: Option<&str>) -> InstanceKey {
        self.base.scoped(user_key)
    }

    /// Returns default props for one use.
    pub fn props(&self, user_key: Option<&str>) -> QueryProps {
        QueryProps::new(self.key(user_key), self.document.clone())
    }

    /// Builds props from framework attributes.
    ///
    /// Recognized attributes: `key`, `variables`, `fetch_policy`,
    /// `error_policy`, `poll_interval`, `notify_on_network_status_change`
    /// and `skip`. Others are ignored.
    pub fn props_from_attributes(&self, attributes: &Map<String, Value>) -> Result<QueryProps> {
        let (user_key, rest) = split_attributes(attributes);
        let parsed: QueryAttributes = serde_json::from_value(rest)?;
        Ok(QueryProps {
            variables: parsed.variables,
            fetch_policy: parsed.fetch_policy,
            error_policy: parsed.error_policy,
            poll_interval: parsed.poll_interval,
            notify_on_network_status_change: parsed.notify_on_network_status_change,
            skip: parsed.skip,
            ..self.props(user_key.as_deref())
        })
    }

    /// Creates one use of the component.
    pub fn view<F>(&self, attributes: &Map<String, Value>, render: F) -> Result<Query>
    where
        F: Fn(&QueryRenderProps, &[Child]) -> View + 'static,
    {
        Ok(Query::new(self.props_from_attributes(attributes)?, render))
    }
}

/// A mutation component definition.
#[derive(Clone, Debug)]
pub struct MutationComponent {
    document: Document,
    base: InstanceKey,
}

/// Defines a mutation component for `document`.
pub fn mutation(document: Document) -> MutationComponent {
    MutationComponent {
        document,
        base: InstanceKey::allocate(DEFAULT_MUTATION_PREFIX),
    }
}

impl MutationComponent {
    /// Defines a mutation component whose keys use the context's prefix.
    pub fn in_context(ctx: &Context, document: Document) -> Self {
        Self {
            document,
            base: ctx.allocate_mutation_key(None),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn base_key(&self) -> &InstanceKey {
        &self.base
    }

    /// Returns the instance key of one use.
    pub fn key(&self, user_key: Option<&str>) -> InstanceKey {
        self.base.scoped(user_key)
    }

    /// Returns default props for one use.
    pub fn props(&self, user_key: Option<&str>) -> MutationProps {
        MutationProps::new(self.key(user_key), self.document.clone())
    }

    /// Builds props from framework attributes.
    ///
    /// Recognized attributes: `key`, `variables`, `optimistic_response`,
    /// `refetch_queries` (operation names) and `ignore_results`. Handlers
    /// are set on the returned props.
    pub fn props_from_attributes(&self, attributes: &Map<String, Value>) -> Result<MutationProps> {
        let (user_key, rest) = split_attributes(attributes);
        let parsed: MutationAttributes = serde_json::from_value(rest)?;
        let options = MutationOptions {
            variables: parsed.variables,
            optimistic_response: parsed.optimistic_response,
            refetch_queries: parsed
                .refetch_queries
                .map(|names| names.into_iter().map(RefetchQuery::Named).collect()),
        };
        Ok(self
            .props(user_key.as_deref())
            .with_options(options)
            .ignore_results(parsed.ignore_results))
    }

    /// Creates one use of the component.
    pub fn view<F>(&self, attributes: &Map<String, Value>, render: F) -> Result<Mutation>
    where
        F: Fn(&MutationRenderProps, &[Child]) -> View + 'static,
    {
        Ok(Mutation::new(self.props_from_attributes(attributes)?, render))
    }
}
