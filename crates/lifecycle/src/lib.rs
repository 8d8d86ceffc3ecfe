//! Weft Lifecycle - Query and mutation lifecycles for Weft.
//!
//! This crate ties a component instance to a GraphQL operation: it asks the
//! client for an observable when the component is created, reconciles it
//! with new props on every render, republishes each result into the store
//! and releases everything when the component goes away.
//!
//! - `Context`: Store, inbox and managers; entry point for the embedding application
//! - `QueryManager`, `QueryProps`: Per-instance observable queries
//! - `MutationManager`, `MutationProps`: Per-instance mutations
//! - `project`: Turns a raw result into the snapshot a render callback sees
//!
//! Results never reach the store from inside a client callback. They are
//! queued in the context's inbox and applied by [`Context::flush`]; a
//! notification whose subscription was released or whose instance was
//! destroyed is dropped there.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use weft_core::{json, Document, OperationResult};
//! use weft_lifecycle::{Context, QueryProps};
//! use weft_reactive::testing::MockClient;
//!
//! let client = MockClient::new();
//! let mut ctx = Context::default().with_client(Rc::new(client.clone()));
//!
//! let key = ctx.allocate_query_key(None);
//! ctx.init_query(QueryProps::new(key.clone(), Document::new("{ ping }"))).unwrap();
//! assert!(ctx.query_snapshot(&key).unwrap().loading);
//!
//! // The client answers...
//! client.last_observable().unwrap().emit(OperationResult::ready(json!({"ping": "pong"})));
//!
//! // ...and the application applies it on its next turn.
//! ctx.flush().unwrap();
//! assert_eq!(ctx.query_snapshot(&key).unwrap().data, Some(json!({"ping": "pong"})));
//!
//! ctx.destroy_query(&key);
//! assert!(ctx.query_snapshot(&key).is_none());
//! ```

mod context;
mod delivery;
mod mutation;
mod projection;
mod query;

pub use context::Context;
pub use delivery::{Delivery, FlushStats};
pub use mutation::{CompletedHandler, ErrorHandler, MutationManager, MutationProps};
pub use projection::{previous_data_for, project};
pub use query::{QueryEntry, QueryManager, QueryProps};
