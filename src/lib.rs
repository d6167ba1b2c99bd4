//! A keyed virtual-DOM reconciler.
//!
//! Describe the UI as a tree of [`VNode`] values, hand it to a [`Root`] and
//! the reconciler brings a host tree in line with it through the primitives
//! of a [`Host`]. Successive renders are diffed against the previous tree so
//! only what changed is touched; keyed children are reordered with the
//! fewest moves.
//!
//! Class-shaped [`Component`]s keep state between renders and queue their
//! own updates through a [`Link`]. Function components are plain functions
//! with optional [`FunctionHooks`]. Events are delegated: one host listener
//! per event type routes to the handlers of the rendered tree.
//!
//! ## Example
//!
//! ```rust
//! use oxide_vdom::{Component, Context, Event, Link, Render, Root, TestHost, TestNode, VNode};
//!
//! struct Counter {
//!     link: Link<Self>,
//! }
//!
//! impl Component for Counter {
//!     type Props = ();
//!     type State = u32;
//!
//!     fn create(_props: &(), _context: &Context, link: Link<Self>) -> Self {
//!         Counter { link }
//!     }
//!
//!     fn render(&self, _props: &(), count: &u32, _context: &Context) -> Render {
//!         let link = self.link.clone();
//!         VNode::element("button")
//!             .on("onClick", move |_| link.set_state(|count| *count += 1))
//!             .child(*count)
//!             .into()
//!     }
//! }
//!
//! let host = TestHost::new();
//! let container = host.create_container();
//! let mut root = Root::new(host.clone(), container);
//!
//! root.render(VNode::component::<Counter>(())).unwrap();
//! assert_eq!(host.html(container), "<button>0</button>");
//!
//! let button: TestNode = host.children_of(container)[0];
//! root.dispatch_event(Event::new("click", button)).unwrap();
//! assert_eq!(host.html(container), "<button>1</button>");
//! ```

mod arena;
mod attributes;
mod component;
mod engine;
mod error;
mod events;
mod forms;
mod host;
mod hydrate;
mod keyed;
mod lifecycle;
mod mount;
mod normalize;
mod options;
mod patch;
mod root;
#[cfg(any(test, feature = "testing"))]
mod test_host;
mod unmount;
mod vnode;

pub use arena::NodeId;
pub use component::{Component, Context, FunctionHooks, Link, Phase, Render};
pub use error::RenderError;
pub use events::{link_event, Event, Handler};
pub use host::{Host, HostNodeType, Namespace, Property};
pub use normalize::Child;
pub use options::{RenderHooks, RenderOptions};
pub use root::Root;
pub use vnode::{
    Children, ComponentFlavor, ElementFlavor, Key, Kind, PropValue, Props, Style, StyleValue, VNode,
};

#[cfg(any(test, feature = "testing"))]
pub use test_host::{HostOp, TestHost, TestNode};
