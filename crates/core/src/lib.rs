//! Weft Core - Shared types for Weft GraphQL component bindings.
//!
//! This crate provides the foundational types used by every other Weft crate:
//!
//! - `InstanceKey`: Process-unique key of one mounted query/mutation component
//! - `Document`, `Variables`: A GraphQL operation and its variables
//! - `OperationResult`: The raw result an observable operation reports
//! - `ClientError`, `GraphQlError`: Structured client errors
//! - `WatchQueryOptions`, `MutationOptions`, `FetchMoreOptions`: Client options
//! - `ContextConfig`: Settings of a binding context
//! - `Error`: Error types for lifecycle operations
//!
//! # Example
//!
//! ```rust
//! use weft_core::{json, InstanceKey, NetworkStatus, OperationResult};
//!
//! let base = InstanceKey::allocate("q");
//! let key = base.with_user_key("pikachu");
//! assert_eq!(key.user_key(), Some("pikachu"));
//!
//! let result = OperationResult::ready(json!({ "pokemon": { "name": "Pikachu" } }));
//! assert_eq!(result.network_status, NetworkStatus::Ready);
//! assert!(!result.loading);
//! ```

mod config;
mod error;
mod key;
mod options;
mod types;
pub mod util;

pub use config::{ContextConfig, DEFAULT_MUTATION_PREFIX, DEFAULT_QUERY_PREFIX};
pub use error::{Error, Result};
pub use key::{next_instance_id, InstanceKey};
pub use options::{
    FetchMoreOptions, MutationOptions, MutationRequest, MutationUpdater, RefetchQuery,
    UpdateQueryArgs, UpdateQueryFn, WatchQueryOptions,
};
pub use types::{
    ClientError, Document, ErrorPolicy, FetchPolicy, GraphQlError, NetworkStatus,
    OperationResult, SourceLocation, Variables,
};

// Re-exported so downstream crates build variables and data with the same
// JSON types.
pub use serde_json::{json, Map, Value};
