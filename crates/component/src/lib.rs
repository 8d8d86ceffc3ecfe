//! Weft Component - Query and Mutation components for functional UI frameworks.
//!
//! This crate merges the Weft lifecycle into a framework's component model:
//! components render to virtual nodes whose lifecycle hooks drive the
//! [`Context`](weft_lifecycle::Context).
//!
//! - `query`, `mutation`: Component definitions with their own base key
//! - `Query`, `Mutation`: One use of a definition, bound to a render callback
//! - `QueryRenderProps`, `MutationRenderProps`: What render callbacks see
//! - `VNode`, `Attributes`, `View`, `resolve_node`: Minimal node model
//! - `LifecycleHooks`, `add_lifecycle_handlers`: Hook composition
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use weft_component::{query, HookKind, VNode};
//! use weft_core::{json, Document, Map, OperationResult};
//! use weft_lifecycle::Context;
//! use weft_reactive::testing::MockClient;
//!
//! let client = MockClient::new();
//! let mut ctx = Context::default().with_client(Rc::new(client.clone()));
//!
//! let greeting = query(Document::new("{ greeting }"));
//! let view = greeting
//!     .view(&Map::new(), |props, _| {
//!         let text = props.data.as_ref().map(|d| d["greeting"].to_string());
//!         VNode::new("h1").with_text(text.unwrap_or_default()).into()
//!     })
//!     .unwrap();
//!
//! // The first render registers the query; the framework renders again.
//! assert!(view.render(&mut ctx, &[]).unwrap().is_none());
//! let node = view.render(&mut ctx, &[]).unwrap().unwrap();
//! node.attributes.hooks.run(HookKind::Create, &mut ctx, 1).unwrap();
//!
//! client.last_observable().unwrap().emit(OperationResult::ready(json!({"greeting": "hi"})));
//! ctx.flush().unwrap();
//! assert!(view.render(&mut ctx, &[]).unwrap().is_some());
//! ```

mod component;
mod factory;
mod hooks;
mod render;
mod vnode;

pub use component::{Mutation, MutationRender, Query, QueryRender};
pub use factory::{mutation, query, MutationComponent, QueryComponent};
pub use hooks::{add_lifecycle_handlers, compose, ElementId, Hook, HookKind, LifecycleHooks};
pub use render::{MutationControls, MutationRenderProps, QueryControls, QueryRenderProps};
pub use vnode::{resolve_node, Attributes, Child, VNode, View};
