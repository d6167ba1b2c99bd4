//! Per-root configuration and instrumentation hooks.

use core::any::Any;
use core::fmt;
use std::rc::Rc;

use crate::vnode::VNode;

/// Instrumentation callbacks observed by a root.
///
/// `before_render` and `after_render` receive the class component instance
/// being rendered; downcast it to the concrete component type.
#[derive(Clone, Default)]
pub struct RenderHooks {
    create_vnode: Option<Rc<dyn Fn(&VNode)>>,
    before_render: Option<Rc<dyn Fn(&dyn Any)>>,
    after_render: Option<Rc<dyn Fn(&dyn Any)>>,
    render_complete: Option<Rc<dyn Fn()>>,
}

impl RenderHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe every virtual node as it reaches mount, patch or hydration.
    pub fn on_create_vnode(mut self, hook: impl Fn(&VNode) + 'static) -> Self {
        self.create_vnode = Some(Rc::new(hook));
        self
    }

    pub fn on_before_render(mut self, hook: impl Fn(&dyn Any) + 'static) -> Self {
        self.before_render = Some(Rc::new(hook));
        self
    }

    pub fn on_after_render(mut self, hook: impl Fn(&dyn Any) + 'static) -> Self {
        self.after_render = Some(Rc::new(hook));
        self
    }

    /// Runs once at the end of every top-level render.
    pub fn on_render_complete(mut self, hook: impl Fn() + 'static) -> Self {
        self.render_complete = Some(Rc::new(hook));
        self
    }

    pub(crate) fn create_vnode(&self, vnode: &VNode) {
        if let Some(hook) = &self.create_vnode {
            hook(vnode);
        }
    }

    pub(crate) fn before_render(&self, instance: &dyn Any) {
        if let Some(hook) = &self.before_render {
            hook(instance);
        }
    }

    pub(crate) fn after_render(&self, instance: &dyn Any) {
        if let Some(hook) = &self.after_render {
            hook(instance);
        }
    }

    pub(crate) fn render_complete(&self) {
        if let Some(hook) = &self.render_complete {
            hook();
        }
    }
}

impl fmt::Debug for RenderHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderHooks")
            .field("create_vnode", &self.create_vnode.is_some())
            .field("before_render", &self.before_render.is_some())
            .field("after_render", &self.after_render.is_some())
            .field("render_complete", &self.render_complete.is_some())
            .finish()
    }
}

/// Configuration of a [`crate::Root`].
///
/// ```rust
/// use oxide_vdom::{RenderHooks, RenderOptions};
///
/// let options = RenderOptions::new()
///     .validate_keys(true)
///     .hooks(RenderHooks::new().on_render_complete(|| println!("painted")));
/// assert!(options.validates_keys());
/// ```
#[derive(Clone, Debug)]
pub struct RenderOptions {
    validate_keys: bool,
    hooks: RenderHooks,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            validate_keys: cfg!(debug_assertions),
            hooks: RenderHooks::default(),
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report duplicate and mixed keys while rendering. On by default in
    /// debug builds.
    pub fn validate_keys(mut self, enabled: bool) -> Self {
        self.validate_keys = enabled;
        self
    }

    pub fn hooks(mut self, hooks: RenderHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn validates_keys(&self) -> bool {
        self.validate_keys
    }

    pub(crate) fn render_hooks(&self) -> &RenderHooks {
        &self.hooks
    }
}
