//! Query and Mutation components.
//!
//! A component is rendered once per framework render. The first render only
//! registers the instance and renders nothing; the store update that follows
//! makes the framework render again, and from then on the component renders
//! through its callback with lifecycle hooks wired to the context.

use crate::hooks::{add_lifecycle_handlers, ElementId, LifecycleHooks};
use crate::render::{MutationRenderProps, QueryRenderProps};
use crate::vnode::{resolve_node, Child, VNode, View};
use std::fmt;
use std::rc::Rc;
use weft_core::Result;
use weft_lifecycle::{Context, MutationProps, QueryProps};

/// Render callback of a query component.
pub type QueryRender = Rc<dyn Fn(&QueryRenderProps, &[Child]) -> View>;

/// Render callback of a mutation component.
pub type MutationRender = Rc<dyn Fn(&MutationRenderProps, &[Child]) -> View>;

/// A query bound to a render callback.
#[derive(Clone)]
pub struct Query {
    props: QueryProps,
    render: QueryRender,
}

impl Query {
    pub fn new<F>(props: QueryProps, render: F) -> Self
    where
        F: Fn(&QueryRenderProps, &[Child]) -> View + 'static,
    {
        Self {
            props,
            render: Rc::new(render),
        }
    }

    pub fn props(&self) -> &QueryProps {
        &self.props
    }

    /// Renders the component.
    ///
    /// The callback sees the observable's current result, projected on
    /// every render. The node gets the instance key unless the callback set one, an
    /// `oncreate` hook that mounts the query and an `onremove` hook that
    /// destroys it.
    pub fn render(&self, ctx: &mut Context, children: &[Child]) -> Result<Option<VNode>> {
        let key = self.props.key.clone();
        let Some(entry) = ctx.queries().get(&key) else {
            ctx.init_query(self.props.clone())?;
            return Ok(None);
        };
        if entry.has_mounted() {
            ctx.will_receive_props(self.props.clone())?;
        }

        let props = QueryRenderProps::new(key.clone(), ctx.queries().snapshot(&key)?);
        let Some(mut node) = resolve_node((self.render)(&props, children), ctx)? else {
            return Ok(None);
        };

        let mut attributes = std::mem::take(&mut node.attributes);
        if attributes.key.is_none() {
            attributes.key = Some(key.to_string());
        }
        let mount_key = key.clone();
        let hooks = LifecycleHooks::new()
            .oncreate(move |ctx: &mut Context, _: ElementId| ctx.did_mount(&mount_key))
            .onremove(move |ctx: &mut Context, _: ElementId| {
                ctx.destroy_query(&key);
                Ok(())
            });
        node.attributes = add_lifecycle_handlers(attributes, hooks);
        tracing::trace!(key = %self.props.key, tag = %node.tag, "query rendered");
        Ok(Some(node))
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query").field("props", &self.props).finish()
    }
}

/// A mutation bound to a render callback.
#[derive(Clone)]
pub struct Mutation {
    props: MutationProps,
    render: MutationRender,
}

impl Mutation {
    pub fn new<F>(props: MutationProps, render: F) -> Self
    where
        F: Fn(&MutationRenderProps, &[Child]) -> View + 'static,
    {
        Self {
            props,
            render: Rc::new(render),
        }
    }

    pub fn props(&self) -> &MutationProps {
        &self.props
    }

    /// Renders the component.
    ///
    /// Every render refreshes the instance's props so executions use the
    /// latest handlers. The node always carries the instance key and an
    /// `ondestroy` hook that destroys the instance.
    pub fn render(&self, ctx: &mut Context, children: &[Child]) -> Result<Option<VNode>> {
        let key = self.props.key.clone();
        let first = !ctx.mutations().contains(&key);
        ctx.init_mutation(self.props.clone())?;
        if first {
            return Ok(None);
        }

        let state = ctx.mutation_state(&key).cloned().unwrap_or_default();
        let props = MutationRenderProps::new(key.clone(), state);
        let Some(mut node) = resolve_node((self.render)(&props, children), ctx)? else {
            return Ok(None);
        };

        let mut attributes = std::mem::take(&mut node.attributes);
        attributes.key = Some(key.to_string());
        let hooks = LifecycleHooks::new().ondestroy(move |ctx: &mut Context, _: ElementId| {
            ctx.destroy_mutation(&key);
            Ok(())
        });
        node.attributes = add_lifecycle_handlers(attributes, hooks);
        tracing::trace!(key = %self.props.key, tag = %node.tag, "mutation rendered");
        Ok(Some(node))
    }
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutation").field("props", &self.props).finish()
    }
}
