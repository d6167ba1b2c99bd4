//! Creating host nodes for virtual nodes that have none yet.

use core::any::Any;
use std::rc::Rc;

use crate::arena::{Mounted, MountedChildren, NodeId};
use crate::component::{ClassType, Context, FunctionType, Render};
use crate::engine::Engine;
use crate::error::RenderError;
use crate::host::{Host, Namespace, Property};
use crate::lifecycle::Deferred;
use crate::normalize;
use crate::vnode::{is_void_tag, Children, ElementFlavor, NodeType, Ref, VNode};

pub(crate) const INNER_HTML: &str = "dangerouslySetInnerHTML";

impl<H: Host> Engine<H> {
    /// Mount `vnode`, appending its host node to `parent` when one is given.
    pub(crate) fn mount(
        &mut self,
        vnode: VNode,
        parent: Option<&H::Node>,
        context: &Context,
        svg: bool,
    ) -> Result<NodeId, RenderError> {
        self.options.render_hooks().create_vnode(&vnode);
        match &vnode.ty {
            NodeType::Text(text) => {
                let text = text.clone();
                Ok(self.mount_text(vnode, &text, parent))
            }
            NodeType::Void => Ok(self.mount_text(vnode, "", parent)),
            NodeType::Element { tag, flavor } => {
                let (tag, flavor) = (tag.clone(), *flavor);
                self.mount_element(vnode, &tag, flavor, parent, context, svg)
            }
            NodeType::Class { ty, props } => {
                let (ty, props) = (*ty, props.clone());
                self.mount_class(vnode, ty, props, parent, context, svg)
            }
            NodeType::Function { ty, props } => {
                let (ty, props) = (ty.clone(), props.clone());
                self.mount_function(vnode, ty, props, parent, context, svg)
            }
            NodeType::Portal(_) => self.mount_portal(vnode, parent, context),
        }
    }

    fn mount_text(&mut self, vnode: VNode, text: &str, parent: Option<&H::Node>) -> NodeId {
        let node = self.host.create_text(text);
        if let Some(parent) = parent {
            self.host.append_child(parent, &node);
        }
        self.nodes.insert(Mounted::new(vnode, Some(node), false))
    }

    fn mount_element(
        &mut self,
        mut vnode: VNode,
        tag: &str,
        flavor: ElementFlavor,
        parent: Option<&H::Node>,
        context: &Context,
        svg: bool,
    ) -> Result<NodeId, RenderError> {
        let svg = svg || flavor == ElementFlavor::Svg;
        let children = core::mem::take(&mut vnode.children);
        check_void(tag, &children)?;

        let namespace = if svg { Namespace::Svg } else { Namespace::Html };
        let node = self.host.create_element(tag, namespace);
        if let Some(class_name) = vnode.class_name.as_deref().filter(|name| !name.is_empty()) {
            self.set_class_name(&node, class_name, svg);
        }
        if let Some(parent) = parent {
            self.host.append_child(parent, &node);
        }

        let props = vnode.props.take();
        let node_ref = vnode.node_ref.clone();
        let id = self.nodes.insert(Mounted::new(vnode, Some(node.clone()), svg));

        let has_inner_html = props
            .as_ref()
            .is_some_and(|props| props.value(INNER_HTML).is_some());
        if has_inner_html && !children.is_empty() {
            tracing::warn!(tag, "children ignored on an element with inner html");
        } else {
            if self.options.validates_keys() {
                if let Children::Keyed(list) = &children {
                    normalize::validate_keys(tag, list);
                }
            }
            let child_svg = svg && tag != "foreignObject";
            let mounted = self.mount_children(children, &node, context, child_svg)?;
            self.record_mut(id)?.children = mounted;
        }

        if let Some(props) = props {
            self.mount_props(id, &node, flavor, &props, svg)?;
            self.record_mut(id)?.vnode.props = Some(props);
        }

        match node_ref {
            Some(Ref::Callback(callback)) => self.lifecycle.push(Deferred::ElementRef { callback, node }),
            Some(Ref::Hooks(_)) => tracing::warn!(tag, "lifecycle hooks ignored on an element"),
            None => {}
        }
        Ok(id)
    }

    pub(crate) fn set_class_name(&mut self, node: &H::Node, class_name: &str, svg: bool) {
        if svg {
            self.host.set_attribute(node, "class", class_name, None);
        } else {
            self.host
                .set_property(node, "className", Property::Text(class_name.to_owned()));
        }
    }

    pub(crate) fn mount_children(
        &mut self,
        children: Children,
        parent: &H::Node,
        context: &Context,
        svg: bool,
    ) -> Result<MountedChildren, RenderError> {
        Ok(match children {
            Children::Invalid => MountedChildren::Invalid,
            Children::Single(child) => {
                MountedChildren::Single(self.mount(*child, Some(parent), context, svg)?)
            }
            Children::Unkeyed(list) => {
                MountedChildren::Unkeyed(self.mount_list(list, parent, context, svg)?)
            }
            Children::Keyed(list) => {
                MountedChildren::Keyed(self.mount_list(list, parent, context, svg)?)
            }
        })
    }

    fn mount_list(
        &mut self,
        list: Vec<VNode>,
        parent: &H::Node,
        context: &Context,
        svg: bool,
    ) -> Result<Vec<NodeId>, RenderError> {
        list.into_iter()
            .map(|child| self.mount(child, Some(parent), context, svg))
            .collect()
    }

    fn mount_class(
        &mut self,
        vnode: VNode,
        ty: ClassType,
        props: Rc<dyn Any>,
        parent: Option<&H::Node>,
        context: &Context,
        svg: bool,
    ) -> Result<NodeId, RenderError> {
        let (id, rendered, child_context) = self.begin_class(vnode, ty, props, context, svg)?;
        let rendered = self.mount(rendered, None, &child_context, svg)?;
        self.attach(rendered, parent)?;
        self.finish_class(id, rendered)?;
        Ok(id)
    }

    fn mount_function(
        &mut self,
        vnode: VNode,
        ty: FunctionType,
        props: Rc<dyn Any>,
        parent: Option<&H::Node>,
        context: &Context,
        svg: bool,
    ) -> Result<NodeId, RenderError> {
        let (id, rendered) = self.begin_function(vnode, ty, props, context, svg)?;
        let rendered = self.mount(rendered, None, context, svg)?;
        self.attach(rendered, parent)?;
        self.finish_function(id, rendered)?;
        Ok(id)
    }

    fn attach(&mut self, id: NodeId, parent: Option<&H::Node>) -> Result<(), RenderError> {
        if let Some(parent) = parent {
            let node = self.require_host(id)?;
            self.host.append_child(parent, &node);
        }
        Ok(())
    }

    /// Construct a class instance and produce its first render.
    ///
    /// Updates the instance queues for itself before rendering are merged
    /// into that first render.
    pub(crate) fn begin_class(
        &mut self,
        vnode: VNode,
        ty: ClassType,
        props: Rc<dyn Any>,
        context: &Context,
        svg: bool,
    ) -> Result<(NodeId, VNode, Context), RenderError> {
        if matches!(vnode.node_ref, Some(Ref::Hooks(_))) {
            return Err(RenderError::HooksOnClassComponent { component: ty.name });
        }

        let id = self.nodes.insert(Mounted::new(vnode, None, svg));
        let mut instance = match (ty.create)(props, context, id, self.updates.sender()) {
            Ok(instance) => instance,
            Err(error) => {
                self.nodes.remove(id);
                return Err(error);
            }
        };
        instance.will_mount();
        for change in self.updates.take_for(id) {
            instance.apply(change);
        }

        let rendered = match self.render_instance(instance.as_ref()) {
            Render::Node(node) => node,
            Render::Nothing => VNode::void(),
            Render::NoOp => {
                tracing::warn!(component = ty.name, "first render cannot keep previous output");
                VNode::void()
            }
        };
        let child_context = instance.child_context();
        self.record_mut(id)?.instance = Some(instance);
        tracing::trace!(component = ty.name, "constructed");
        Ok((id, rendered, child_context))
    }

    /// Link a constructed instance to its mounted output. The ref sees the
    /// instance right away; `did_mount` waits for the end of the pass.
    pub(crate) fn finish_class(&mut self, id: NodeId, rendered: NodeId) -> Result<(), RenderError> {
        let record = self.record_mut(id)?;
        record.rendered = Some(rendered);
        if let (Some(callback), Some(instance)) = (
            record.vnode.node_ref.as_ref().and_then(Ref::callback),
            record.instance.as_ref(),
        ) {
            callback(Some(instance.component()));
        }
        self.lifecycle.push(Deferred::DidMount(id));
        Ok(())
    }

    pub(crate) fn begin_function(
        &mut self,
        vnode: VNode,
        ty: FunctionType,
        props: Rc<dyn Any>,
        context: &Context,
        svg: bool,
    ) -> Result<(NodeId, VNode), RenderError> {
        if let Some(hooks) = vnode.node_ref.as_ref().and_then(Ref::hooks) {
            hooks.will_mount(props.as_ref());
        }
        let rendered = match ty.call(props.as_ref(), context)? {
            Render::Node(node) => node,
            Render::Nothing | Render::NoOp => VNode::void(),
        };
        let id = self.nodes.insert(Mounted::new(vnode, None, svg));
        Ok((id, rendered))
    }

    pub(crate) fn finish_function(&mut self, id: NodeId, rendered: NodeId) -> Result<(), RenderError> {
        let record = self.record_mut(id)?;
        record.rendered = Some(rendered);
        let deferred = match (&record.vnode.node_ref, &record.vnode.ty) {
            (Some(Ref::Hooks(hooks)), NodeType::Function { props, .. }) if hooks.has_did_mount() => {
                Some(Deferred::HookDidMount {
                    hooks: hooks.clone(),
                    props: props.clone(),
                })
            }
            _ => None,
        };
        if let Some(deferred) = deferred {
            self.lifecycle.push(deferred);
        }
        Ok(())
    }

    fn mount_portal(
        &mut self,
        mut vnode: VNode,
        parent: Option<&H::Node>,
        context: &Context,
    ) -> Result<NodeId, RenderError> {
        let target = self.portal_target(&vnode)?;
        let children = match core::mem::take(&mut vnode.children) {
            Children::Single(child) => {
                MountedChildren::Single(self.mount(*child, Some(&target), context, false)?)
            }
            _ => MountedChildren::Invalid,
        };
        let placeholder = self.host.create_text("");
        if let Some(parent) = parent {
            self.host.append_child(parent, &placeholder);
        }
        let mut record = Mounted::new(vnode, Some(placeholder), false);
        record.children = children;
        Ok(self.nodes.insert(record))
    }

    pub(crate) fn portal_target(&self, vnode: &VNode) -> Result<H::Node, RenderError> {
        match &vnode.ty {
            NodeType::Portal(target) => target
                .downcast_ref::<H::Node>()
                .cloned()
                .ok_or(RenderError::PortalTarget),
            _ => Err(RenderError::PortalTarget),
        }
    }
}

pub(crate) fn check_void(tag: &str, children: &Children) -> Result<(), RenderError> {
    if is_void_tag(tag) && !children.is_empty() {
        return Err(RenderError::VoidElementChildren {
            tag: tag.to_owned(),
        });
    }
    Ok(())
}
