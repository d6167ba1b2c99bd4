//! Adopting host nodes that already exist, typically server-rendered markup.
//!
//! Matching nodes are reused as they are; only props, listeners and refs are
//! attached. A mismatch remounts that subtree and logs a warning.

use crate::arena::{Mounted, MountedChildren, NodeId};
use crate::component::Context;
use crate::engine::Engine;
use crate::error::RenderError;
use crate::host::{Host, HostNodeType, Property};
use crate::lifecycle::Deferred;
use crate::mount::{check_void, INNER_HTML};
use crate::normalize;
use crate::vnode::{Children, ElementFlavor, NodeType, PropValue, Props, Ref, VNode};

/// Comment text marking an empty text node in server output.
const EMPTY_TEXT_MARKER: &str = "!";

impl<H: Host> Engine<H> {
    /// Hydrate the content of `container`. Host nodes after the first one
    /// are removed; an empty container is mounted into instead.
    pub(crate) fn hydrate_root(
        &mut self,
        vnode: VNode,
        container: &H::Node,
        context: &Context,
    ) -> Result<NodeId, RenderError> {
        let Some(first) = self.host.first_child(container) else {
            return self.mount(vnode, Some(container), context, false);
        };
        let id = self.hydrate(vnode, &first, container, context, false)?;
        let node = self.require_host(id)?;
        while let Some(extra) = self.host.next_sibling(&node) {
            self.host.remove_child(container, &extra);
        }
        Ok(id)
    }

    fn hydrate(
        &mut self,
        vnode: VNode,
        node: &H::Node,
        parent: &H::Node,
        context: &Context,
        svg: bool,
    ) -> Result<NodeId, RenderError> {
        self.options.render_hooks().create_vnode(&vnode);
        match &vnode.ty {
            NodeType::Element { tag, flavor } => {
                let (tag, flavor) = (tag.clone(), *flavor);
                self.hydrate_element(vnode, &tag, flavor, node, parent, context, svg)
            }
            NodeType::Text(text) => {
                let text = text.clone();
                self.hydrate_text(vnode, &text, node, parent)
            }
            NodeType::Void => Ok(self.nodes.insert(Mounted::new(vnode, Some(node.clone()), false))),
            NodeType::Class { ty, props } => {
                let (ty, props) = (*ty, props.clone());
                let (id, rendered, child_context) = self.begin_class(vnode, ty, props, context, svg)?;
                let rendered = self.hydrate(rendered, node, parent, &child_context, svg)?;
                self.finish_class(id, rendered)?;
                Ok(id)
            }
            NodeType::Function { ty, props } => {
                let (ty, props) = (ty.clone(), props.clone());
                let (id, rendered) = self.begin_function(vnode, ty, props, context, svg)?;
                let rendered = self.hydrate(rendered, node, parent, context, svg)?;
                self.finish_function(id, rendered)?;
                Ok(id)
            }
            NodeType::Portal(_) => {
                let id = self.mount(vnode, None, context, svg)?;
                let placeholder = self.require_host(id)?;
                self.host.insert_before(parent, &placeholder, node);
                Ok(id)
            }
        }
    }

    fn remount(
        &mut self,
        vnode: VNode,
        node: &H::Node,
        parent: &H::Node,
        context: &Context,
        svg: bool,
    ) -> Result<NodeId, RenderError> {
        tracing::warn!(
            expected = %vnode.describe(),
            "existing markup does not match, remounting"
        );
        let id = self.mount(vnode, None, context, svg)?;
        let fresh = self.require_host(id)?;
        self.host.replace_child(parent, &fresh, node);
        Ok(id)
    }

    fn hydrate_text(
        &mut self,
        vnode: VNode,
        text: &str,
        node: &H::Node,
        parent: &H::Node,
    ) -> Result<NodeId, RenderError> {
        if self.host.node_type(node) != HostNodeType::Text {
            return self.remount(vnode, node, parent, &Context::new(), false);
        }
        if self.host.text(node).as_deref() != Some(text) {
            self.host.set_text(node, text);
        }
        Ok(self.nodes.insert(Mounted::new(vnode, Some(node.clone()), false)))
    }

    #[allow(clippy::too_many_arguments)]
    fn hydrate_element(
        &mut self,
        mut vnode: VNode,
        tag: &str,
        flavor: ElementFlavor,
        node: &H::Node,
        parent: &H::Node,
        context: &Context,
        svg: bool,
    ) -> Result<NodeId, RenderError> {
        let svg = svg || flavor == ElementFlavor::Svg;
        let same_tag = matches!(
            self.host.node_type(node),
            HostNodeType::Element(name) if name.eq_ignore_ascii_case(tag)
        );
        if !same_tag {
            return self.remount(vnode, node, parent, context, svg);
        }

        let children = core::mem::take(&mut vnode.children);
        check_void(tag, &children)?;
        let props = vnode.props.take();
        let class_name = vnode.class_name.clone();
        let node_ref = vnode.node_ref.clone();
        let id = self.nodes.insert(Mounted::new(vnode, Some(node.clone()), svg));

        if !children.is_empty() {
            self.strip_comments(node);
            if self.options.validates_keys() {
                if let Children::Keyed(list) = &children {
                    normalize::validate_keys(tag, list);
                }
            }
            let child_svg = svg && tag != "foreignObject";
            let mounted = self.hydrate_children(children, node, context, child_svg)?;
            self.record_mut(id)?.children = mounted;
        } else if self.host.first_child(node).is_some() && !self.same_inner_html(node, props.as_ref()) {
            self.host.clear_children(node);
            if flavor.is_form() {
                self.host
                    .set_property(node, "defaultValue", Property::Text(String::new()));
            }
        }

        if let Some(props) = props {
            self.mount_props(id, node, flavor, &props, svg)?;
            self.record_mut(id)?.vnode.props = Some(props);
        }

        match class_name.as_deref() {
            Some(class_name) => self.set_class_name(node, class_name, svg),
            None => {
                if self.host.attribute(node, "class").is_some_and(|class| !class.is_empty()) {
                    self.host.remove_attribute(node, "class");
                }
            }
        }

        if let Some(callback) = node_ref.as_ref().and_then(Ref::callback) {
            self.lifecycle.push(Deferred::ElementRef {
                callback: callback.clone(),
                node: node.clone(),
            });
        }
        Ok(id)
    }

    /// Drop comment nodes between children. An empty-text marker comment
    /// becomes the empty text node it stands for.
    fn strip_comments(&mut self, node: &H::Node) {
        let mut cursor = self.host.first_child(node);
        while let Some(child) = cursor {
            cursor = self.host.next_sibling(&child);
            if self.host.node_type(&child) != HostNodeType::Comment {
                continue;
            }
            if self.host.text(&child).as_deref() == Some(EMPTY_TEXT_MARKER) {
                let empty = self.host.create_text("");
                self.host.replace_child(node, &empty, &child);
            } else {
                self.host.remove_child(node, &child);
            }
        }
    }

    fn same_inner_html(&self, node: &H::Node, props: Option<&Props>) -> bool {
        match props.and_then(|props| props.value(INNER_HTML)) {
            Some(PropValue::Html(html)) if !html.is_empty() => self.host.inner_html(node) == *html,
            _ => false,
        }
    }

    fn hydrate_children(
        &mut self,
        children: Children,
        node: &H::Node,
        context: &Context,
        svg: bool,
    ) -> Result<MountedChildren, RenderError> {
        let mut cursor = self.host.first_child(node);
        let (list, keyed, single) = match children {
            Children::Invalid => (Vec::new(), false, false),
            Children::Single(child) => (vec![*child], false, true),
            Children::Unkeyed(list) => (list, false, false),
            Children::Keyed(list) => (list, true, false),
        };

        let mut ids = Vec::with_capacity(list.len());
        for child in list {
            let id = if matches!(child.ty, NodeType::Portal(_)) {
                let id = self.mount(child, None, context, svg)?;
                let placeholder = self.require_host(id)?;
                self.host.insert_or_append(node, &placeholder, cursor.as_ref());
                id
            } else if let Some(current) = cursor.clone() {
                cursor = self.host.next_sibling(&current);
                self.hydrate(child, &current, node, context, svg)?
            } else {
                self.mount(child, Some(node), context, svg)?
            };
            ids.push(id);
        }

        while let Some(extra) = cursor {
            cursor = self.host.next_sibling(&extra);
            self.host.remove_child(node, &extra);
        }

        Ok(match (single, keyed) {
            (true, _) => ids
                .into_iter()
                .next()
                .map_or(MountedChildren::Invalid, MountedChildren::Single),
            (false, true) => MountedChildren::Keyed(ids),
            (false, false) => MountedChildren::Unkeyed(ids),
        })
    }
}
