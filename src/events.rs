//! Delegated events and the per-root event registry.

use core::any::Any;
use core::fmt;
use std::collections::HashMap;
use std::rc::Rc;

use crate::arena::NodeId;
use crate::engine::Engine;
use crate::error::RenderError;
use crate::forms;
use crate::host::{Host, Property};
use crate::vnode::{NodeType, PropValue};

/// Props handled by one document-level listener per event type, paired with
/// the native event type they listen for.
const DELEGATED: &[(&str, &str)] = &[
    ("onClick", "click"),
    ("onDblClick", "dblclick"),
    ("onFocusIn", "focusin"),
    ("onFocusOut", "focusout"),
    ("onKeyDown", "keydown"),
    ("onKeyPress", "keypress"),
    ("onKeyUp", "keyup"),
    ("onMouseDown", "mousedown"),
    ("onMouseMove", "mousemove"),
    ("onMouseUp", "mouseup"),
    ("onSubmit", "submit"),
    ("onTouchEnd", "touchend"),
    ("onTouchMove", "touchmove"),
    ("onTouchStart", "touchstart"),
];

/// Native event type for a delegated prop name.
pub(crate) fn delegated_type(prop: &str) -> Option<&'static str> {
    DELEGATED
        .iter()
        .find(|(name, _)| *name == prop)
        .map(|(_, event_type)| *event_type)
}

fn delegated_type_by_name(event_type: &str) -> Option<&'static str> {
    DELEGATED
        .iter()
        .find(|(_, name)| *name == event_type)
        .map(|(_, name)| *name)
}

/// Native event type for a node-level `on*` prop.
pub(crate) fn listener_type(prop: &str) -> String {
    prop[2..].to_ascii_lowercase()
}

fn is_click(event_type: &str) -> bool {
    event_type == "click" || event_type == "dblclick"
}

/// A native event routed through the reconciler.
///
/// The target and current target are host nodes; read them back with the
/// host's node type.
pub struct Event {
    event_type: String,
    target: Rc<dyn Any>,
    current_target: Option<Rc<dyn Any>>,
    button: i16,
    data: Option<Rc<dyn Any>>,
    propagation_stopped: bool,
}

impl Event {
    pub fn new<N: Any>(event_type: impl Into<String>, target: N) -> Self {
        Self {
            event_type: event_type.into(),
            target: Rc::new(target),
            current_target: None,
            button: 0,
            data: None,
            propagation_stopped: false,
        }
    }

    /// Set the mouse button; anything but `0` suppresses click dispatch.
    pub fn with_button(mut self, button: i16) -> Self {
        self.button = button;
        self
    }

    /// Attach an arbitrary payload for handlers to read.
    pub fn with_data<T: Any>(mut self, data: T) -> Self {
        self.data = Some(Rc::new(data));
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn button(&self) -> i16 {
        self.button
    }

    pub fn target<N: Any>(&self) -> Option<&N> {
        self.target.downcast_ref()
    }

    /// The node whose handler is running.
    pub fn current_target<N: Any>(&self) -> Option<&N> {
        self.current_target.as_ref()?.downcast_ref()
    }

    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.as_ref()?.downcast_ref()
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    fn set_current_target<N: Any>(&mut self, node: N) {
        self.current_target = Some(Rc::new(node));
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("event_type", &self.event_type)
            .field("button", &self.button)
            .field("propagation_stopped", &self.propagation_stopped)
            .finish()
    }
}

/// Event handler stored in a prop.
///
/// Handlers compare by identity, so re-rendering with the same handler
/// value leaves the registry untouched.
#[derive(Clone)]
pub enum Handler {
    Plain(Rc<dyn Fn(&mut Event)>),
    /// A callback paired with shared data, see [`link_event`].
    Linked {
        data: Rc<dyn Any>,
        callback: usize,
        invoke: Rc<dyn Fn(&dyn Any, &mut Event)>,
    },
}

impl Handler {
    pub fn new(handler: impl Fn(&mut Event) + 'static) -> Self {
        Handler::Plain(Rc::new(handler))
    }

    pub fn same(&self, other: &Handler) -> bool {
        match (self, other) {
            (Handler::Plain(a), Handler::Plain(b)) => {
                core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            (
                Handler::Linked {
                    data: a,
                    callback: fa,
                    ..
                },
                Handler::Linked {
                    data: b,
                    callback: fb,
                    ..
                },
            ) => fa == fb && core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            _ => false,
        }
    }

    pub fn call(&self, event: &mut Event) {
        match self {
            Handler::Plain(handler) => handler(event),
            Handler::Linked { data, invoke, .. } => invoke(data.as_ref(), event),
        }
    }
}

/// Pair a plain function with shared data.
///
/// The pair keeps its identity across renders as long as the same `data`
/// allocation and function are used, which avoids re-registering a fresh
/// closure on every render.
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use oxide_vdom::{link_event, Event, PropValue};
///
/// fn bump(counter: &Cell<u32>, _event: &mut Event) {
///     counter.set(counter.get() + 1);
/// }
///
/// let counter = Rc::new(Cell::new(0));
/// let a = PropValue::from(link_event(counter.clone(), bump));
/// let b = PropValue::from(link_event(counter, bump));
/// assert_eq!(a, b);
/// ```
pub fn link_event<D: 'static>(data: Rc<D>, callback: fn(&D, &mut Event)) -> Handler {
    Handler::Linked {
        data,
        callback: callback as usize,
        invoke: Rc::new(move |data, event| {
            if let Some(data) = data.downcast_ref::<D>() {
                callback(data, event);
            }
        }),
    }
}

/// Document-level listener state for one delegated event type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct DelegatedType {
    pub(crate) installed: bool,
    pub(crate) count: usize,
}

/// Form-element listeners owned by the reconciler rather than by props.
struct Controlled {
    owner: NodeId,
    types: Vec<&'static str>,
}

#[derive(Default)]
struct NodeListeners {
    delegated: HashMap<&'static str, Handler>,
    direct: HashMap<String, Handler>,
    controlled: Option<Controlled>,
}

impl NodeListeners {
    fn is_empty(&self) -> bool {
        self.delegated.is_empty() && self.direct.is_empty() && self.controlled.is_none()
    }
}

/// Tracks which handlers are active per host node and keeps exactly one
/// document-level listener installed per delegated type in use.
pub(crate) struct EventRegistry<N> {
    types: HashMap<&'static str, DelegatedType>,
    nodes: HashMap<N, NodeListeners>,
}

impl<N: Clone + Eq + core::hash::Hash> EventRegistry<N> {
    pub(crate) fn new() -> Self {
        Self {
            types: HashMap::new(),
            nodes: HashMap::new(),
        }
    }

    pub(crate) fn delegated(&self, event_type: &str) -> DelegatedType {
        self.types.get(event_type).copied().unwrap_or_default()
    }

    /// Number of nodes holding any listener.
    pub(crate) fn tracked_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn attach_delegated<H: Host<Node = N>>(
        &mut self,
        host: &mut H,
        node: &N,
        event_type: &'static str,
        handler: Handler,
    ) {
        let listeners = self.nodes.entry(node.clone()).or_default();
        if listeners.delegated.insert(event_type, handler).is_some() {
            return;
        }
        let state = self.types.entry(event_type).or_default();
        state.count += 1;
        if !state.installed {
            host.listen(event_type);
            state.installed = true;
        }
    }

    pub(crate) fn detach_delegated<H: Host<Node = N>>(
        &mut self,
        host: &mut H,
        node: &N,
        event_type: &'static str,
    ) {
        let Some(listeners) = self.nodes.get_mut(node) else {
            return;
        };
        if listeners.delegated.remove(event_type).is_none() {
            return;
        }
        if listeners.is_empty() {
            self.nodes.remove(node);
        }
        self.release_type(host, event_type);
    }

    fn release_type<H: Host<Node = N>>(&mut self, host: &mut H, event_type: &'static str) {
        let Some(state) = self.types.get_mut(event_type) else {
            return;
        };
        state.count = state.count.saturating_sub(1);
        if state.count == 0 {
            if state.installed {
                host.unlisten(event_type);
            }
            self.types.remove(event_type);
        }
    }

    pub(crate) fn attach_direct<H: Host<Node = N>>(
        &mut self,
        host: &mut H,
        node: &N,
        event_type: String,
        handler: Handler,
    ) {
        let listeners = self.nodes.entry(node.clone()).or_default();
        if !listeners.direct.contains_key(&event_type) {
            host.add_listener(node, &event_type);
        }
        listeners.direct.insert(event_type, handler);
    }

    pub(crate) fn detach_direct<H: Host<Node = N>>(
        &mut self,
        host: &mut H,
        node: &N,
        event_type: &str,
    ) {
        let Some(listeners) = self.nodes.get_mut(node) else {
            return;
        };
        if listeners.direct.remove(event_type).is_some() {
            host.remove_listener(node, event_type);
        }
        if listeners.is_empty() {
            self.nodes.remove(node);
        }
    }

    /// Install the reconciler-owned listeners of a controlled form element.
    pub(crate) fn control<H: Host<Node = N>>(
        &mut self,
        host: &mut H,
        node: &N,
        owner: NodeId,
        types: &[&'static str],
    ) {
        let listeners = self.nodes.entry(node.clone()).or_default();
        if listeners.controlled.is_some() {
            return;
        }
        for event_type in types {
            if !listeners.direct.contains_key(*event_type) {
                host.add_listener(node, event_type);
            }
        }
        listeners.controlled = Some(Controlled {
            owner,
            types: types.to_vec(),
        });
    }

    pub(crate) fn is_controlled(&self, node: &N, event_type: &str) -> bool {
        self.controlled_owner(node, event_type).is_some()
    }

    fn controlled_owner(&self, node: &N, event_type: &str) -> Option<NodeId> {
        let controlled = self.nodes.get(node)?.controlled.as_ref()?;
        controlled
            .types
            .contains(&event_type)
            .then_some(controlled.owner)
    }

    fn delegated_handler(&self, node: &N, event_type: &str) -> Option<Handler> {
        self.nodes.get(node)?.delegated.get(event_type).cloned()
    }

    fn direct_handler(&self, node: &N, event_type: &str) -> Option<Handler> {
        self.nodes.get(node)?.direct.get(event_type).cloned()
    }

    /// Drop every listener of a node that is being unmounted. Delegated
    /// handlers give back their share of the document-level listener; the
    /// node-level ones go away with the host node itself.
    pub(crate) fn release<H: Host<Node = N>>(&mut self, host: &mut H, node: &N) {
        let Some(listeners) = self.nodes.remove(node) else {
            return;
        };
        for event_type in listeners.delegated.into_keys() {
            self.release_type(host, event_type);
        }
    }
}

impl<H: Host> Engine<H> {
    /// Route a native event to the handlers registered for it.
    ///
    /// Returns the controlled form element whose value must be re-applied
    /// once the handlers' state updates have been processed.
    pub(crate) fn dispatch(&mut self, mut event: Event) -> Result<Option<NodeId>, RenderError> {
        let target = event
            .target::<H::Node>()
            .cloned()
            .ok_or(RenderError::EventTarget)?;
        let event_type = event.event_type.clone();

        // A controlled element sees its own events before any delegated
        // handler and keeps them from bubbling further.
        if let Some(owner) = self.events.controlled_owner(&target, &event_type) {
            event.set_current_target(target);
            self.dispatch_controlled(owner, &event_type, &mut event);
            return Ok(Some(owner));
        }

        if let Some(event_type) = delegated_type_by_name(&event_type) {
            self.dispatch_delegated(event_type, target, &mut event);
            return Ok(None);
        }

        if let Some(handler) = self.events.direct_handler(&target, &event_type) {
            event.set_current_target(target);
            handler.call(&mut event);
        }
        Ok(None)
    }

    fn dispatch_delegated(&mut self, event_type: &'static str, target: H::Node, event: &mut Event) {
        let click = is_click(event_type);
        if click && event.button != 0 {
            tracing::trace!(event_type, button = event.button, "ignoring non-primary button");
            return;
        }

        let mut current = Some(target);
        while let Some(node) = current {
            if click
                && self
                    .host
                    .property(&node, "disabled")
                    .is_some_and(|disabled| disabled == Property::Bool(true))
            {
                return;
            }
            if let Some(handler) = self.events.delegated_handler(&node, event_type) {
                event.set_current_target(node.clone());
                handler.call(event);
                if event.propagation_stopped {
                    return;
                }
            }
            current = self.host.parent(&node);
        }
    }

    /// Run the prop handlers a controlled form element forwards for
    /// `event_type`, reading them from the element's current props.
    fn dispatch_controlled(&mut self, owner: NodeId, event_type: &str, event: &mut Event) {
        let Some(record) = self.nodes.get(owner) else {
            return;
        };
        let NodeType::Element { flavor, .. } = &record.vnode.ty else {
            return;
        };
        let flavor = *flavor;
        let Some(props) = record.vnode.props.clone() else {
            return;
        };
        event.stop_propagation();
        for name in forms::forwarded_props(flavor, &props, event_type) {
            if let Some(PropValue::Handler(handler)) = props.get(name) {
                handler.call(event);
            }
        }
    }
}
