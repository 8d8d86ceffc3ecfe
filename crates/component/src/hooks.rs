//! Lifecycle hooks attached to virtual nodes.
//!
//! The rendering engine calls these when the element a node describes is
//! created, updated, removed or destroyed. Components add their own hooks
//! to whatever the render callback already attached; the component's hook
//! runs first.

use crate::vnode::Attributes;
use std::fmt;
use std::rc::Rc;
use weft_core::Result;
use weft_lifecycle::Context;

/// Identifies a rendered element.
pub type ElementId = u64;

/// A lifecycle hook.
pub type Hook = Rc<dyn Fn(&mut Context, ElementId) -> Result<()>>;

/// The lifecycle events of an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookKind {
    Create,
    Update,
    Remove,
    Destroy,
}

impl HookKind {
    pub const ALL: [HookKind; 4] = [
        HookKind::Create,
        HookKind::Update,
        HookKind::Remove,
        HookKind::Destroy,
    ];
}

/// The hooks of one node.
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    pub oncreate: Option<Hook>,
    pub onupdate: Option<Hook>,
    pub onremove: Option<Hook>,
    pub ondestroy: Option<Hook>,
}

impl LifecycleHooks {
    /// Creates an empty set of hooks.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn oncreate<F>(self, hook: F) -> Self
    where
        F: Fn(&mut Context, ElementId) -> Result<()> + 'static,
    {
        self.with(HookKind::Create, Rc::new(hook))
    }

    pub fn onupdate<F>(self, hook: F) -> Self
    where
        F: Fn(&mut Context, ElementId) -> Result<()> + 'static,
    {
        self.with(HookKind::Update, Rc::new(hook))
    }

    pub fn onremove<F>(self, hook: F) -> Self
    where
        F: Fn(&mut Context, ElementId) -> Result<()> + 'static,
    {
        self.with(HookKind::Remove, Rc::new(hook))
    }

    pub fn ondestroy<F>(self, hook: F) -> Self
    where
        F: Fn(&mut Context, ElementId) -> Result<()> + 'static,
    {
        self.with(HookKind::Destroy, Rc::new(hook))
    }

    /// Sets the hook of `kind`, replacing any previous one.
    pub fn with(mut self, kind: HookKind, hook: Hook) -> Self {
        *self.slot_mut(kind) = Some(hook);
        self
    }

    /// Returns the hook of `kind`.
    pub fn get(&self, kind: HookKind) -> Option<&Hook> {
        match kind {
            HookKind::Create => self.oncreate.as_ref(),
            HookKind::Update => self.onupdate.as_ref(),
            HookKind::Remove => self.onremove.as_ref(),
            HookKind::Destroy => self.ondestroy.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: HookKind) -> &mut Option<Hook> {
        match kind {
            HookKind::Create => &mut self.oncreate,
            HookKind::Update => &mut self.onupdate,
            HookKind::Remove => &mut self.onremove,
            HookKind::Destroy => &mut self.ondestroy,
        }
    }

    /// Returns true if no hook is set.
    pub fn is_empty(&self) -> bool {
        HookKind::ALL.iter().all(|kind| self.get(*kind).is_none())
    }

    /// Runs the hook of `kind`. Returns `Ok(false)` if there is none.
    pub fn run(&self, kind: HookKind, ctx: &mut Context, element: ElementId) -> Result<bool> {
        match self.get(kind) {
            Some(hook) => {
                hook(ctx, element)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set: Vec<HookKind> = HookKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.get(*kind).is_some())
            .collect();
        f.debug_tuple("LifecycleHooks").field(&set).finish()
    }
}

/// Chains two hooks: `new` runs first, then `original`.
pub fn compose(original: Option<Hook>, new: Hook) -> Hook {
    match original {
        None => new,
        Some(original) => Rc::new(move |ctx: &mut Context, element: ElementId| {
            new(ctx, element)?;
            original(ctx, element)
        }),
    }
}

/// Adds `hooks` in front of the hooks already in `attributes`.
pub fn add_lifecycle_handlers(mut attributes: Attributes, hooks: LifecycleHooks) -> Attributes {
    for kind in HookKind::ALL {
        if let Some(hook) = hooks.get(kind).cloned() {
            let slot = attributes.hooks.slot_mut(kind);
            *slot = Some(compose(slot.take(), hook));
        }
    }
    attributes
}
