//! Reconciling a mounted position against its next description.

use core::any::Any;
use std::rc::Rc;

use crate::arena::{Mounted, MountedChildren, NodeId};
use crate::component::{Context, FunctionType, Render};
use crate::engine::Engine;
use crate::error::RenderError;
use crate::host::Host;
use crate::lifecycle::Deferred;
use crate::mount::check_void;
use crate::normalize;
use crate::vnode::{Children, ElementFlavor, NodeType, Ref, VNode};

/// Text of a child set that is at most one text node.
fn editable_text(children: &Children) -> Option<String> {
    match children {
        Children::Invalid => Some(String::new()),
        Children::Single(child) => match &child.ty {
            NodeType::Text(text) => Some(text.to_string()),
            _ => None,
        },
        _ => None,
    }
}

fn same_ref(last: Option<&Ref>, next: Option<&Ref>) -> bool {
    match (last, next) {
        (None, None) => true,
        (Some(last), Some(next)) => last.same(next),
        _ => false,
    }
}

impl<H: Host> Engine<H> {
    /// Bring the position `last` in line with `next`, returning the id that
    /// now holds it. The id changes only when the node had to be replaced.
    pub(crate) fn patch(
        &mut self,
        last: NodeId,
        next: VNode,
        parent: &H::Node,
        context: &Context,
        svg: bool,
    ) -> Result<NodeId, RenderError> {
        let reusable = !next.recreate
            && self
                .nodes
                .get(last)
                .is_some_and(|record| record.vnode.same_type(&next));
        if !reusable {
            return self.replace(last, next, parent, context, svg);
        }

        self.options.render_hooks().create_vnode(&next);
        match &next.ty {
            NodeType::Element { tag, flavor } => {
                let (tag, flavor) = (tag.clone(), *flavor);
                self.patch_element(last, next, &tag, flavor, context, svg)?;
            }
            NodeType::Class { ty, props } => {
                let (name, props) = (ty.name, props.clone());
                self.patch_class(last, next, name, props, parent, context)?;
            }
            NodeType::Function { ty, props } => {
                let (ty, props) = (ty.clone(), props.clone());
                self.patch_function(last, next, ty, props, parent, context, svg)?;
            }
            NodeType::Text(text) => {
                let text = text.clone();
                self.patch_text(last, next, &text)?;
            }
            NodeType::Void => self.record_mut(last)?.vnode = next,
            NodeType::Portal(_) => self.patch_portal(last, next, context)?,
        }
        Ok(last)
    }

    fn replace(
        &mut self,
        last: NodeId,
        next: VNode,
        parent: &H::Node,
        context: &Context,
        svg: bool,
    ) -> Result<NodeId, RenderError> {
        tracing::trace!(next = %next.describe(), "replacing node");
        let old = self.host_node(last);
        self.unmount(last);
        let id = self.mount(next, None, context, svg)?;
        let node = self.require_host(id)?;
        match old {
            Some(old) => self.host.replace_child(parent, &node, &old),
            None => self.host.append_child(parent, &node),
        }
        Ok(id)
    }

    fn patch_element(
        &mut self,
        id: NodeId,
        mut next: VNode,
        tag: &str,
        flavor: ElementFlavor,
        context: &Context,
        svg: bool,
    ) -> Result<(), RenderError> {
        let node = self.require_host(id)?;
        let svg = svg || flavor == ElementFlavor::Svg;
        let next_children = core::mem::take(&mut next.children);
        check_void(tag, &next_children)?;

        let (last_props, last_class, last_ref) = {
            let record = self.record_mut(id)?;
            (
                record.vnode.props.take(),
                record.vnode.class_name.take(),
                record.vnode.node_ref.take(),
            )
        };
        let next_props = next.props.take();
        self.patch_props(id, &node, flavor, last_props.as_ref(), next_props.as_ref(), svg)?;

        if self.options.validates_keys() {
            if let Children::Keyed(list) = &next_children {
                normalize::validate_keys(tag, list);
            }
        }
        let last_children = core::mem::take(&mut self.record_mut(id)?.children);
        let child_svg = svg && tag != "foreignObject";
        let children = match editable_text(&next_children) {
            Some(text) if next.content_editable => {
                self.patch_editable_text(&node, last_children, next_children, &text)
            }
            _ => self.patch_children(last_children, next_children, &node, context, child_svg)?,
        };
        self.record_mut(id)?.children = children;

        if flavor.is_form() {
            if let Some(props) = &next_props {
                self.apply_form_value(id, &node, flavor, props, false);
            }
        }

        if last_class != next.class_name {
            match next.class_name.as_deref() {
                Some(class_name) => self.set_class_name(&node, class_name, svg),
                None => self.host.remove_attribute(&node, "class"),
            }
        }

        if !same_ref(last_ref.as_ref(), next.node_ref.as_ref()) {
            if let Some(callback) = last_ref.as_ref().and_then(Ref::callback) {
                callback(None);
            }
            if let Some(callback) = next.node_ref.as_ref().and_then(Ref::callback) {
                self.lifecycle.push(Deferred::ElementRef {
                    callback: callback.clone(),
                    node: node.clone(),
                });
            }
        }

        next.props = next_props;
        self.record_mut(id)?.vnode = next;
        Ok(())
    }

    /// Bring the text of a content-editable element in line with `text`,
    /// leaving the host alone when the user's edits already match it.
    fn patch_editable_text(
        &mut self,
        node: &H::Node,
        last: MountedChildren,
        next: Children,
        text: &str,
    ) -> MountedChildren {
        let child = match next {
            Children::Single(child) => Some(*child),
            _ => None,
        };
        let tracked = match (&last, &child) {
            (MountedChildren::Invalid, None) => true,
            (MountedChildren::Single(id), Some(_)) => self.nodes.contains_key(*id),
            _ => false,
        };
        if tracked && self.host.text_content(node) == text {
            if let (MountedChildren::Single(id), Some(child)) = (&last, child) {
                if let Some(record) = self.nodes.get_mut(*id) {
                    record.vnode = child;
                }
            }
            return last;
        }
        self.rewrite_editable_text(node, &last, child, text)
    }

    fn rewrite_editable_text(
        &mut self,
        node: &H::Node,
        last: &MountedChildren,
        child: Option<VNode>,
        text: &str,
    ) -> MountedChildren {
        for id in last.ids() {
            self.unmount(*id);
        }
        self.host.set_text_content(node, text);
        match (child, self.host.first_child(node)) {
            (Some(child), Some(text_node)) => {
                MountedChildren::Single(self.nodes.insert(Mounted::new(child, Some(text_node), false)))
            }
            _ => MountedChildren::Invalid,
        }
    }

    fn patch_text(&mut self, id: NodeId, next: VNode, text: &str) -> Result<(), RenderError> {
        let record = self.record_mut(id)?;
        let changed = match &record.vnode.ty {
            NodeType::Text(last) => &**last != text,
            _ => true,
        };
        let node = record.host.clone().ok_or(RenderError::Detached)?;
        record.vnode = next;
        if changed {
            self.host.set_text(&node, text);
        }
        Ok(())
    }

    fn patch_class(
        &mut self,
        id: NodeId,
        next: VNode,
        name: &'static str,
        props: Rc<dyn Any>,
        parent: &H::Node,
        context: &Context,
    ) -> Result<(), RenderError> {
        if matches!(next.node_ref, Some(Ref::Hooks(_))) {
            return Err(RenderError::HooksOnClassComponent { component: name });
        }

        let (mut instance, last_ref) = {
            let record = self.record_mut(id)?;
            let instance = record.instance.take().ok_or(RenderError::Detached)?;
            (instance, record.vnode.node_ref.take())
        };

        let result = match instance.receive(props, context.clone()) {
            Ok(()) => {
                let mut force = false;
                for change in self.updates.take_for(id) {
                    force |= instance.apply(change);
                }
                self.rerender(id, instance.as_mut(), force, Some(parent))
            }
            Err(error) => Err(error),
        };

        if !same_ref(last_ref.as_ref(), next.node_ref.as_ref()) {
            if let Some(callback) = last_ref.as_ref().and_then(Ref::callback) {
                callback(None);
            }
            if let Some(callback) = next.node_ref.as_ref().and_then(Ref::callback) {
                callback(Some(instance.component()));
            }
        }

        let record = self.record_mut(id)?;
        record.instance = Some(instance);
        record.vnode = next;
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn patch_function(
        &mut self,
        id: NodeId,
        next: VNode,
        ty: FunctionType,
        next_props: Rc<dyn Any>,
        parent: &H::Node,
        context: &Context,
        svg: bool,
    ) -> Result<(), RenderError> {
        let (last_props, rendered) = {
            let record = self.record(id)?;
            let last_props = match &record.vnode.ty {
                NodeType::Function { props, .. } => props.clone(),
                _ => next_props.clone(),
            };
            (last_props, record.rendered)
        };
        let hooks = next.node_ref.as_ref().and_then(Ref::hooks).cloned();

        let proceed = hooks
            .as_ref()
            .map_or(true, |hooks| hooks.should_update(last_props.as_ref(), next_props.as_ref()));
        if proceed {
            if let Some(hooks) = &hooks {
                hooks.will_update(last_props.as_ref(), next_props.as_ref());
            }
            let next_rendered = match ty.call(next_props.as_ref(), context)? {
                Render::Node(node) => Some(node),
                Render::Nothing => Some(VNode::void()),
                Render::NoOp => None,
            };
            if let Some(next_rendered) = next_rendered {
                let rendered = rendered.ok_or(RenderError::Detached)?;
                let rendered = self.patch(rendered, next_rendered, parent, context, svg)?;
                self.record_mut(id)?.rendered = Some(rendered);
            }
            if let Some(hooks) = &hooks {
                hooks.did_update(last_props.as_ref(), next_props.as_ref());
            }
        }

        self.record_mut(id)?.vnode = next;
        Ok(())
    }

    fn patch_portal(&mut self, id: NodeId, mut next: VNode, context: &Context) -> Result<(), RenderError> {
        let last_target = self.portal_target(&self.record(id)?.vnode)?;
        let next_target = self.portal_target(&next)?;
        let next_children = core::mem::take(&mut next.children);
        let last_children = core::mem::take(&mut self.record_mut(id)?.children);
        let children = self.patch_children(last_children, next_children, &last_target, context, false)?;

        if last_target != next_target {
            tracing::debug!("moving portal content to a new target");
            for child in children.ids() {
                if let Some(node) = self.host_node(*child) {
                    self.host.remove_child(&last_target, &node);
                    self.host.append_child(&next_target, &node);
                }
            }
        }

        let record = self.record_mut(id)?;
        record.children = children;
        record.vnode = next;
        Ok(())
    }

    /// Reconcile the children of `parent`, choosing a strategy from the
    /// shapes of both child sets.
    pub(crate) fn patch_children(
        &mut self,
        last: MountedChildren,
        next: Children,
        parent: &H::Node,
        context: &Context,
        svg: bool,
    ) -> Result<MountedChildren, RenderError> {
        Ok(match (last, next) {
            (MountedChildren::Invalid, next) => {
                self.mount_children(next, parent, context, svg)?
            }
            (MountedChildren::Single(last), Children::Single(next)) => {
                MountedChildren::Single(self.patch(last, *next, parent, context, svg)?)
            }
            (MountedChildren::Single(last), next) => {
                self.remove(last, parent);
                self.mount_children(next, parent, context, svg)?
            }
            (last, Children::Invalid) => {
                self.remove_all(&last, parent);
                MountedChildren::Invalid
            }
            (last, Children::Single(next)) => {
                self.remove_all(&last, parent);
                MountedChildren::Single(self.mount(*next, Some(parent), context, svg)?)
            }
            (last, next) if last.ids().is_empty() => {
                self.mount_children(next, parent, context, svg)?
            }
            (last, next) if next.is_empty() => {
                self.remove_all(&last, parent);
                MountedChildren::Invalid
            }
            (MountedChildren::Keyed(last), Children::Keyed(next)) => {
                MountedChildren::Keyed(self.patch_keyed(last, next, parent, context, svg)?)
            }
            (last, Children::Keyed(next)) => MountedChildren::Keyed(
                self.patch_unkeyed(last.ids().to_vec(), next, parent, context, svg)?,
            ),
            (last, Children::Unkeyed(next)) => MountedChildren::Unkeyed(
                self.patch_unkeyed(last.ids().to_vec(), next, parent, context, svg)?,
            ),
        })
    }

    /// Position-wise reconciliation: the common prefix is patched pair by
    /// pair, then surplus old children are removed or new ones mounted.
    fn patch_unkeyed(
        &mut self,
        last: Vec<NodeId>,
        next: Vec<VNode>,
        parent: &H::Node,
        context: &Context,
        svg: bool,
    ) -> Result<Vec<NodeId>, RenderError> {
        let common = last.len().min(next.len());
        let mut patched = Vec::with_capacity(next.len());
        let mut next = next.into_iter();
        for (&last, next) in last.iter().zip(next.by_ref()) {
            patched.push(self.patch(last, next, parent, context, svg)?);
        }
        for next in next {
            patched.push(self.mount(next, Some(parent), context, svg)?);
        }
        for &surplus in &last[common..] {
            self.remove(surplus, parent);
        }
        Ok(patched)
    }
}
