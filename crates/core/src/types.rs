//! GraphQL operation and result types shared by every Weft crate.
//!
//! These mirror what a GraphQL client reports: the operation document, its
//! variables, the raw result of an observable operation and the structured
//! error a client produces.

use core::fmt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Variables of a GraphQL operation.
pub type Variables = Map<String, Value>;

/// A parsed GraphQL operation document.
///
/// The document is opaque to Weft; two documents are the same operation when
/// their source and operation name match.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Document {
    source: String,
    operation_name: Option<String>,
}

impl Document {
    /// Creates a document from its source text.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            operation_name: None,
        }
    }

    /// Sets the operation name.
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Returns the source text.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the operation name, if any.
    #[inline]
    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }
}

/// A location inside a GraphQL document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

/// A single GraphQL error as returned by a server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<SourceLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQlError {
    /// Creates an error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
            extensions: None,
        }
    }

    /// Adds a source location.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.locations.push(SourceLocation { line, column });
        self
    }

    /// Sets the response path.
    pub fn with_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }
}

/// The structured error reported by a GraphQL client.
///
/// Holds either the GraphQL errors of a response, a network failure, or both.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientError {
    #[serde(default)]
    pub graphql_errors: Vec<GraphQlError>,
    #[serde(default)]
    pub network_error: Option<String>,
}

impl ClientError {
    /// Creates an error from GraphQL errors.
    pub fn graphql(errors: Vec<GraphQlError>) -> Self {
        Self {
            graphql_errors: errors,
            network_error: None,
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            graphql_errors: Vec::new(),
            network_error: Some(message.into()),
        }
    }

    /// Returns true if the error carries GraphQL errors.
    ///
    /// Only GraphQL errors are safe to render; anything else is a transport
    /// failure that callers must handle themselves.
    #[inline]
    pub fn is_graphql(&self) -> bool {
        !self.graphql_errors.is_empty()
    }

    /// Builds a human readable message, one line per underlying error.
    pub fn message(&self) -> String {
        let mut lines: Vec<String> = self
            .graphql_errors
            .iter()
            .map(|e| format!("GraphQL error: {}", e.message))
            .collect();
        if let Some(network) = &self.network_error {
            lines.push(format!("Network error: {}", network));
        }
        lines.join("\n")
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ClientError {}

/// The network status of an observable operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NetworkStatus {
    Loading = 1,
    SetVariables = 2,
    FetchMore = 3,
    Refetch = 4,
    Poll = 6,
    Ready = 7,
    Error = 8,
}

impl NetworkStatus {
    /// Returns true while a request is in flight.
    #[inline]
    pub fn is_in_flight(&self) -> bool {
        (*self as u8) < 7
    }
}

impl Default for NetworkStatus {
    fn default() -> Self {
        NetworkStatus::Loading
    }
}

/// The raw result reported by an observable operation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
    #[serde(default)]
    pub error: Option<ClientError>,
    pub loading: bool,
    pub network_status: NetworkStatus,
}

impl OperationResult {
    /// A result that is still loading and has no data.
    pub fn loading() -> Self {
        Self {
            data: None,
            errors: Vec::new(),
            error: None,
            loading: true,
            network_status: NetworkStatus::Loading,
        }
    }

    /// A completed result.
    pub fn ready(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
            error: None,
            loading: false,
            network_status: NetworkStatus::Ready,
        }
    }

    /// A failed result.
    pub fn failed(error: ClientError) -> Self {
        Self {
            data: None,
            errors: Vec::new(),
            error: Some(error),
            loading: false,
            network_status: NetworkStatus::Error,
        }
    }

    /// Sets the network status, keeping `loading` consistent with it.
    pub fn with_network_status(mut self, status: NetworkStatus) -> Self {
        self.network_status = status;
        self.loading = status.is_in_flight();
        self
    }

    /// Sets partial data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attaches GraphQL errors reported alongside the data.
    pub fn with_errors(mut self, errors: Vec<GraphQlError>) -> Self {
        self.errors = errors;
        self
    }

    /// Folds the GraphQL `errors` list and the `error` field into one error.
    pub fn combined_error(&self) -> Option<ClientError> {
        if !self.errors.is_empty() {
            return Some(ClientError::graphql(self.errors.clone()));
        }
        self.error.clone()
    }
}

/// How a client should use its cache for a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    CacheFirst,
    CacheAndNetwork,
    NetworkOnly,
    CacheOnly,
    NoCache,
    Standby,
}

/// How a client should treat GraphQL errors in a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    None,
    Ignore,
    All,
}
