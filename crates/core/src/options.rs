//! Options handed to the GraphQL client.

use crate::types::{Document, ErrorPolicy, FetchPolicy, Variables};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Maps the previous query data to new data, as used by `update_query`.
pub type UpdateQueryFn = Rc<dyn Fn(&Value, &UpdateQueryArgs) -> Value>;

/// Called by the client with the result data of a mutation once it has
/// been written to the client's cache.
pub type MutationUpdater = Rc<dyn Fn(&Value)>;

/// Extra arguments for an `update_query` mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateQueryArgs {
    /// The result of a `fetch_more` request, when the mapping merges one in.
    pub fetch_more_result: Option<Value>,
    /// The variables the query ran with.
    pub variables: Variables,
}

/// Options used to create and reconfigure an observable query.
///
/// Unset options are left to the client's defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct WatchQueryOptions {
    pub query: Document,
    pub variables: Variables,
    pub fetch_policy: Option<FetchPolicy>,
    pub error_policy: Option<ErrorPolicy>,
    /// Poll interval in milliseconds.
    pub poll_interval: Option<u64>,
    pub notify_on_network_status_change: bool,
}

impl WatchQueryOptions {
    /// Creates options for `query` with no variables.
    pub fn new(query: Document) -> Self {
        Self {
            query,
            variables: Variables::new(),
            fetch_policy: None,
            error_policy: None,
            poll_interval: None,
            notify_on_network_status_change: false,
        }
    }

    /// Returns true if only the variables differ from `other`.
    pub fn differs_only_in_variables(&self, other: &WatchQueryOptions) -> bool {
        self.variables != other.variables
            && self.query == other.query
            && self.fetch_policy == other.fetch_policy
            && self.error_policy == other.error_policy
            && self.poll_interval == other.poll_interval
            && self.notify_on_network_status_change == other.notify_on_network_status_change
    }
}

/// A query to refetch once a mutation completes.
#[derive(Clone, Debug, PartialEq)]
pub enum RefetchQuery {
    /// An active query, by operation name.
    Named(String),
    /// An explicit query with its variables.
    Query { query: Document, variables: Variables },
}

/// Per-call mutation options. Set fields override the component's props.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MutationOptions {
    pub variables: Option<Variables>,
    pub optimistic_response: Option<Value>,
    pub refetch_queries: Option<Vec<RefetchQuery>>,
}

impl MutationOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the variables.
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Sets the optimistic response.
    pub fn with_optimistic_response(mut self, response: Value) -> Self {
        self.optimistic_response = Some(response);
        self
    }

    /// Sets the queries to refetch.
    pub fn with_refetch_queries(mut self, queries: Vec<RefetchQuery>) -> Self {
        self.refetch_queries = Some(queries);
        self
    }

    /// Layers `overrides` on top of `self`.
    pub fn merged(&self, overrides: &MutationOptions) -> MutationOptions {
        MutationOptions {
            variables: overrides.variables.clone().or_else(|| self.variables.clone()),
            optimistic_response: overrides
                .optimistic_response
                .clone()
                .or_else(|| self.optimistic_response.clone()),
            refetch_queries: overrides
                .refetch_queries
                .clone()
                .or_else(|| self.refetch_queries.clone()),
        }
    }
}

/// The complete mutation request handed to the client.
#[derive(Clone)]
pub struct MutationRequest {
    pub mutation: Document,
    pub variables: Variables,
    pub optimistic_response: Option<Value>,
    pub refetch_queries: Vec<RefetchQuery>,
    pub update: Option<MutationUpdater>,
}

impl MutationRequest {
    /// Builds a request from the document, the component-level options and
    /// the options of one call.
    pub fn build(
        mutation: &Document,
        defaults: &MutationOptions,
        call: &MutationOptions,
        update: Option<MutationUpdater>,
    ) -> Self {
        let options = defaults.merged(call);
        Self {
            mutation: mutation.clone(),
            variables: options.variables.unwrap_or_default(),
            optimistic_response: options.optimistic_response,
            refetch_queries: options.refetch_queries.unwrap_or_default(),
            update,
        }
    }
}

impl fmt::Debug for MutationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationRequest")
            .field("mutation", &self.mutation)
            .field("variables", &self.variables)
            .field("optimistic_response", &self.optimistic_response)
            .field("refetch_queries", &self.refetch_queries)
            .field("update", &self.update.is_some())
            .finish()
    }
}

/// Options for loading another page into an existing query.
#[derive(Clone)]
pub struct FetchMoreOptions {
    /// A different query to run; defaults to the observed query.
    pub query: Option<Document>,
    /// Variables merged over the query's current variables.
    pub variables: Variables,
    /// Merges the fetched page into the previous data.
    pub update_query: UpdateQueryFn,
}

impl FetchMoreOptions {
    /// Creates fetch-more options for the observed query.
    pub fn new<F>(variables: Variables, update_query: F) -> Self
    where
        F: Fn(&Value, &UpdateQueryArgs) -> Value + 'static,
    {
        Self {
            query: None,
            variables,
            update_query: Rc::new(update_query),
        }
    }

    /// Runs a different query for the next page.
    pub fn with_query(mut self, query: Document) -> Self {
        self.query = Some(query);
        self
    }
}

impl fmt::Debug for FetchMoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchMoreOptions")
            .field("query", &self.query)
            .field("variables", &self.variables)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: Value) -> Variables {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_differs_only_in_variables() {
        let doc = Document::new("query Pokemon($id: ID!) { pokemon(id: $id) { name } }");
        let mut a = WatchQueryOptions::new(doc.clone());
        a.variables = vars(json!({"id": 1}));
        let mut b = a.clone();
        b.variables = vars(json!({"id": 2}));
        assert!(a.differs_only_in_variables(&b));

        b.fetch_policy = Some(FetchPolicy::NetworkOnly);
        assert!(!a.differs_only_in_variables(&b));

        // identical options do not differ at all
        assert!(!a.differs_only_in_variables(&a.clone()));
    }

    #[test]
    fn test_mutation_options_merged() {
        let defaults = MutationOptions::new()
            .with_variables(vars(json!({"id": 1})))
            .with_refetch_queries(vec![RefetchQuery::Named("Todos".into())]);
        let call = MutationOptions::new().with_variables(vars(json!({"id": 2})));

        let merged = defaults.merged(&call);
        assert_eq!(merged.variables, Some(vars(json!({"id": 2}))));
        assert_eq!(merged.refetch_queries, defaults.refetch_queries);
        assert!(merged.optimistic_response.is_none());
    }

    #[test]
    fn test_mutation_request_build() {
        let doc = Document::new("mutation { like }");
        let call = MutationOptions::new().with_optimistic_response(json!({"like": true}));
        let request = MutationRequest::build(&doc, &MutationOptions::new(), &call, None);
        assert_eq!(request.mutation, doc);
        assert!(request.variables.is_empty());
        assert!(request.refetch_queries.is_empty());
        assert_eq!(request.optimistic_response, Some(json!({"like": true})));
    }

    #[test]
    fn test_fetch_more_update_query() {
        let opts = FetchMoreOptions::new(vars(json!({"offset": 10})), |prev, args| {
            let mut items = prev["items"].as_array().cloned().unwrap_or_default();
            if let Some(more) = &args.fetch_more_result {
                items.extend(more["items"].as_array().cloned().unwrap_or_default());
            }
            json!({ "items": items })
        });
        let args = UpdateQueryArgs {
            fetch_more_result: Some(json!({"items": [3]})),
            variables: Variables::new(),
        };
        let merged = (opts.update_query)(&json!({"items": [1, 2]}), &args);
        assert_eq!(merged, json!({"items": [1, 2, 3]}));
    }
}
