//! Side table of mounted nodes.
//!
//! Virtual nodes stay plain values. Everything learned while mounting one
//! (its host node, its mounted children, its component instance) is stored
//! here under a [`NodeId`] that lives exactly as long as the mounted position.

use slotmap::new_key_type;

use crate::component::AnyInstance;
use crate::vnode::VNode;

new_key_type! {
    /// Stable identity of one mounted position.
    pub struct NodeId;
}

/// Mounted children, mirroring the shape of [`crate::Children`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum MountedChildren {
    #[default]
    Invalid,
    Single(NodeId),
    Unkeyed(Vec<NodeId>),
    Keyed(Vec<NodeId>),
}

impl MountedChildren {
    pub(crate) fn ids(&self) -> &[NodeId] {
        match self {
            MountedChildren::Invalid => &[],
            MountedChildren::Single(id) => core::slice::from_ref(id),
            MountedChildren::Unkeyed(ids) | MountedChildren::Keyed(ids) => ids,
        }
    }
}

/// Bookkeeping for one mounted position.
pub(crate) struct Mounted<N> {
    /// The description last applied here, with its children moved into
    /// [`Mounted::children`].
    pub(crate) vnode: VNode,
    /// Host node for elements, text, void and portal placeholders.
    /// Components resolve theirs through `rendered`.
    pub(crate) host: Option<N>,
    pub(crate) children: MountedChildren,
    /// Root of a component's rendered output.
    pub(crate) rendered: Option<NodeId>,
    pub(crate) instance: Option<Box<dyn AnyInstance>>,
    pub(crate) svg: bool,
}

impl<N> Mounted<N> {
    pub(crate) fn new(vnode: VNode, host: Option<N>, svg: bool) -> Self {
        Self {
            vnode,
            host,
            children: MountedChildren::Invalid,
            rendered: None,
            instance: None,
            svg,
        }
    }
}
