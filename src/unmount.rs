//! Tearing down mounted positions.

use std::collections::HashSet;

use crate::arena::{MountedChildren, NodeId};
use crate::engine::Engine;
use crate::host::Host;
use crate::vnode::{NodeType, Ref};

impl<H: Host> Engine<H> {
    /// Release everything a mounted position holds: refs, listeners,
    /// component instances and descendants. Host nodes are left attached;
    /// see [`Engine::remove`].
    pub(crate) fn unmount(&mut self, id: NodeId) {
        let Some(record) = self.nodes.remove(id) else {
            return;
        };
        let callback = record.vnode.node_ref.as_ref().and_then(Ref::callback).cloned();

        match &record.vnode.ty {
            NodeType::Element { .. } => {
                if let Some(callback) = callback {
                    callback(None);
                }
                for &child in record.children.ids() {
                    self.unmount(child);
                }
                if let Some(node) = &record.host {
                    self.events.release(&mut self.host, node);
                }
            }
            NodeType::Class { ty, .. } => {
                if let Some(mut instance) = record.instance {
                    instance.will_unmount();
                }
                if let Some(callback) = callback {
                    callback(None);
                }
                tracing::trace!(component = ty.name, "unmounted");
                if let Some(rendered) = record.rendered {
                    self.unmount(rendered);
                }
            }
            NodeType::Function { props, .. } => {
                if let Some(hooks) = record.vnode.node_ref.as_ref().and_then(Ref::hooks) {
                    hooks.will_unmount(props.as_ref());
                }
                if let Some(rendered) = record.rendered {
                    self.unmount(rendered);
                }
            }
            NodeType::Portal(target) => {
                if let Some(target) = target.downcast_ref::<H::Node>() {
                    for &child in record.children.ids() {
                        self.remove(child, target);
                    }
                }
            }
            NodeType::Text(_) | NodeType::Void => {}
        }
    }

    /// Unmount a child and detach its host node from `parent`.
    pub(crate) fn remove(&mut self, id: NodeId, parent: &H::Node) {
        let node = self.host_node(id);
        self.unmount(id);
        if let Some(node) = node {
            self.host.remove_child(parent, &node);
        }
    }

    /// Unmount every child of `parent` and clear it in one host call.
    pub(crate) fn remove_all(&mut self, children: &MountedChildren, parent: &H::Node) {
        match children {
            MountedChildren::Invalid => {}
            MountedChildren::Single(child) => self.remove(*child, parent),
            MountedChildren::Unkeyed(ids) | MountedChildren::Keyed(ids) => {
                for &child in ids {
                    self.unmount(child);
                }
                self.host.clear_children(parent);
            }
        }
    }

    /// Tear down every mounted position after a failed pass, reachable or
    /// not, and detach the outermost host nodes from wherever they were
    /// attached. Leaves the side table and the event registry empty.
    pub(crate) fn abandon(&mut self) {
        let ids: Vec<NodeId> = self.nodes.keys().collect();
        let hosts: HashSet<H::Node> = self
            .nodes
            .values()
            .filter_map(|record| record.host.clone())
            .collect();
        tracing::debug!(nodes = ids.len(), "abandoning a failed pass");

        for id in ids {
            self.unmount(id);
        }
        for node in &hosts {
            if let Some(parent) = self.host.parent(node) {
                if !hosts.contains(&parent) {
                    self.host.remove_child(&parent, node);
                }
            }
        }
    }
}
