//! Reconciler state shared by the mount, patch, unmount and hydration passes.

use core::any::Any;

use slotmap::SlotMap;

use crate::arena::{Mounted, NodeId};
use crate::component::{AnyInstance, Render};
use crate::error::RenderError;
use crate::events::EventRegistry;
use crate::host::Host;
use crate::lifecycle::{Change, Deferred, UpdateQueue};
use crate::options::RenderOptions;
use crate::vnode::VNode;

/// Everything a root owns besides its container: the host, the side table
/// of mounted nodes, the event registry, the deferred callback queue and
/// the state update channel.
pub(crate) struct Engine<H: Host> {
    pub(crate) host: H,
    pub(crate) nodes: SlotMap<NodeId, Mounted<H::Node>>,
    pub(crate) events: EventRegistry<H::Node>,
    pub(crate) lifecycle: Vec<Deferred<H::Node>>,
    pub(crate) updates: UpdateQueue,
    pub(crate) options: RenderOptions,
}

impl<H: Host> Engine<H> {
    pub(crate) fn new(host: H, options: RenderOptions) -> Self {
        Self {
            host,
            nodes: SlotMap::with_key(),
            events: EventRegistry::new(),
            lifecycle: Vec::new(),
            updates: UpdateQueue::new(),
            options,
        }
    }

    pub(crate) fn record(&self, id: NodeId) -> Result<&Mounted<H::Node>, RenderError> {
        self.nodes.get(id).ok_or(RenderError::Detached)
    }

    pub(crate) fn record_mut(&mut self, id: NodeId) -> Result<&mut Mounted<H::Node>, RenderError> {
        self.nodes.get_mut(id).ok_or(RenderError::Detached)
    }

    /// First host node of a mounted position. Components resolve through
    /// their rendered output, however deeply components are nested.
    pub(crate) fn host_node(&self, id: NodeId) -> Option<H::Node> {
        let mut current = id;
        loop {
            let record = self.nodes.get(current)?;
            if let Some(host) = &record.host {
                return Some(host.clone());
            }
            current = record.rendered?;
        }
    }

    pub(crate) fn require_host(&self, id: NodeId) -> Result<H::Node, RenderError> {
        self.host_node(id).ok_or(RenderError::Detached)
    }

    /// Run the callbacks held back during a pass, in the order they were
    /// queued. Callbacks queued while draining run in the same flush.
    pub(crate) fn flush_lifecycle(&mut self) {
        while !self.lifecycle.is_empty() {
            let queued = core::mem::take(&mut self.lifecycle);
            for deferred in queued {
                match deferred {
                    Deferred::ElementRef { callback, node } => callback(Some(&node as &dyn Any)),
                    Deferred::DidMount(id) => {
                        if let Some(instance) = self
                            .nodes
                            .get_mut(id)
                            .and_then(|record| record.instance.as_mut())
                        {
                            instance.did_mount();
                        }
                    }
                    Deferred::HookDidMount { hooks, props } => hooks.did_mount(props.as_ref()),
                }
            }
        }
    }

    /// Drop callbacks queued by a pass that failed.
    pub(crate) fn discard_lifecycle(&mut self) {
        if !self.lifecycle.is_empty() {
            tracing::debug!(
                discarded = self.lifecycle.len(),
                "discarding deferred callbacks of a failed pass"
            );
            self.lifecycle.clear();
        }
    }

    /// Render a class instance, surrounded by the instrumentation hooks.
    pub(crate) fn render_instance(&self, instance: &dyn AnyInstance) -> Render {
        let hooks = self.options.render_hooks();
        hooks.before_render(instance.component());
        let render = instance.render();
        hooks.after_render(instance.component());
        render
    }

    /// Apply every queued state update, re-rendering each affected
    /// component once per batch. Returns how many components were updated.
    pub(crate) fn process_updates(&mut self) -> Result<usize, RenderError> {
        let mut updated = 0;
        loop {
            let batch = self.updates.take_all();
            if batch.is_empty() {
                break;
            }
            tracing::debug!(components = batch.len(), "processing state updates");
            for (id, changes) in batch {
                if self.update_component(id, changes)? {
                    updated += 1;
                }
            }
            self.flush_lifecycle();
        }
        Ok(updated)
    }

    fn update_component(
        &mut self,
        id: NodeId,
        changes: Vec<Change>,
    ) -> Result<bool, RenderError> {
        let Some(mut instance) = self
            .nodes
            .get_mut(id)
            .and_then(|record| record.instance.take())
        else {
            tracing::warn!(?id, "dropping state update for an unmounted component");
            return Ok(false);
        };

        let mut force = false;
        for change in changes {
            force |= instance.apply(change);
        }
        let result = self.rerender(id, instance.as_mut(), force, None);
        if let Some(record) = self.nodes.get_mut(id) {
            record.instance = Some(instance);
        }
        result.map(|()| true)
    }

    /// Run the update half of the class lifecycle for staged props/state.
    ///
    /// When `parent` is not given it is read back from the host, which is
    /// the case for updates requested by the component itself.
    pub(crate) fn rerender(
        &mut self,
        id: NodeId,
        instance: &mut dyn AnyInstance,
        force: bool,
        parent: Option<&H::Node>,
    ) -> Result<(), RenderError> {
        if !instance.should_update(force) {
            tracing::trace!(component = instance.name(), "update skipped");
            return Ok(());
        }
        tracing::trace!(component = instance.name(), phase = ?instance.phase(), force, "re-rendering");
        instance.will_update();
        instance.commit();
        let next = match self.render_instance(instance) {
            Render::NoOp => {
                instance.settle();
                return Ok(());
            }
            Render::Node(node) => node,
            Render::Nothing => VNode::void(),
        };

        let (rendered, svg) = {
            let record = self.record(id)?;
            (record.rendered.ok_or(RenderError::Detached)?, record.svg)
        };
        let parent = match parent {
            Some(parent) => parent.clone(),
            None => {
                let host = self.require_host(rendered)?;
                self.host.parent(&host).ok_or(RenderError::Detached)?
            }
        };
        let context = instance.child_context();
        let rendered = self.patch(rendered, next, &parent, &context, svg)?;
        self.record_mut(id)?.rendered = Some(rendered);
        instance.did_update();
        Ok(())
    }
}
