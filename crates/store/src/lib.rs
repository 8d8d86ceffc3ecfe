//! Weft Store - Central keyed state tree for Weft.
//!
//! The store is the slice of the UI framework's global state that Weft
//! writes to. It maps instance keys to the published state of each query and
//! mutation component and holds the shared GraphQL client.
//!
//! - `Store`: Client handle, module maps, revision counter and change listeners
//! - `QuerySnapshot`: What a query's render callback sees
//! - `MutationState`, `MutationPatch`: A mutation's state and partial updates
//! - `ModuleMap`: Generic per-instance map
//!
//! # Example
//!
//! ```rust
//! use weft_core::InstanceKey;
//! use weft_store::{MutationPatch, Store};
//!
//! let mut store = Store::new();
//! let key = InstanceKey::allocate("m");
//!
//! store.init_mutation(&key);
//! store.patch_mutation(&key, MutationPatch::started());
//!
//! let state = store.mutation(&key).unwrap();
//! assert!(state.called && state.loading);
//! assert!(store.client().is_err());
//! ```

mod module;
mod store;

pub use module::{ModuleMap, MutationPatch, MutationState, QuerySnapshot};
pub use store::{ChangeKind, ModuleKind, Store, StoreEvent};
