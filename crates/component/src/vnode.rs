//! Virtual nodes.
//!
//! The minimal node model the components need from a UI framework: a tag,
//! attributes carrying the key and lifecycle hooks, and children. A render
//! callback may return a node directly or a lazy view that needs the context
//! to produce one.

use crate::hooks::LifecycleHooks;
use std::fmt;
use weft_core::{Map, Result, Value};
use weft_lifecycle::Context;

/// The attributes of a node.
#[derive(Clone, Default)]
pub struct Attributes {
    /// Identity of the node among its siblings.
    pub key: Option<String>,
    pub hooks: LifecycleHooks,
    /// Every other attribute.
    pub props: Map<String, Value>,
}

impl Attributes {
    /// Creates empty attributes.
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attributes")
            .field("key", &self.key)
            .field("hooks", &self.hooks)
            .field("props", &self.props)
            .finish()
    }
}

/// A child of a node.
#[derive(Clone, Debug)]
pub enum Child {
    Node(VNode),
    Text(String),
}

/// A virtual node.
#[derive(Clone, Debug)]
pub struct VNode {
    pub tag: String,
    pub attributes: Attributes,
    pub children: Vec<Child>,
}

impl VNode {
    /// Creates a node with no attributes and no children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Attributes::default(),
            children: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.attributes.key = Some(key.into());
        self
    }

    pub fn with_prop(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.props.insert(name.into(), value);
        self
    }

    pub fn with_hooks(mut self, hooks: LifecycleHooks) -> Self {
        self.attributes.hooks = hooks;
        self
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        self.children.push(Child::Node(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Child::Text(text.into()));
        self
    }

    /// Returns the node's key.
    pub fn key(&self) -> Option<&str> {
        self.attributes.key.as_deref()
    }
}

type LazyView = Box<dyn FnOnce(&mut Context) -> Result<View>>;

/// What a render callback returns.
pub enum View {
    /// Nothing is rendered.
    Empty,
    Node(VNode),
    /// A view computed from the context when resolved.
    Lazy(LazyView),
}

impl View {
    /// Wraps a context-dependent view.
    pub fn lazy<F>(f: F) -> Self
    where
        F: FnOnce(&mut Context) -> Result<View> + 'static,
    {
        View::Lazy(Box::new(f))
    }
}

impl From<VNode> for View {
    fn from(node: VNode) -> Self {
        View::Node(node)
    }
}

impl From<Option<VNode>> for View {
    fn from(node: Option<VNode>) -> Self {
        node.map(View::Node).unwrap_or(View::Empty)
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Empty => f.write_str("Empty"),
            View::Node(node) => f.debug_tuple("Node").field(node).finish(),
            View::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// Evaluates lazy views until a node, or nothing, comes out.
pub fn resolve_node(view: View, ctx: &mut Context) -> Result<Option<VNode>> {
    let mut view = view;
    loop {
        match view {
            View::Empty => return Ok(None),
            View::Node(node) => return Ok(Some(node)),
            View::Lazy(f) => view = f(ctx)?,
        }
    }
}
