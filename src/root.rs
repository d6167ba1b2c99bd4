//! Render roots: the public entry point of the reconciler.

use core::any::Any;

use crate::arena::NodeId;
use crate::component::{Component, Context, Render};
use crate::engine::Engine;
use crate::error::RenderError;
use crate::events::Event;
use crate::host::Host;
use crate::options::RenderOptions;
use crate::vnode::VNode;

/// A container in the host tree and the virtual tree rendered into it.
///
/// Each top-level call runs to completion: structural changes are applied
/// first, then every callback deferred during the pass (element refs,
/// `did_mount`) runs in order, then queued state updates are applied.
/// A failed call discards the deferred callbacks, unmounts everything the
/// root holds (including nodes the failed pass had already created) and
/// returns its error, leaving the container as if nothing was rendered.
///
/// State updates requested from components or event handlers are queued on
/// a channel. They are applied by the next top-level call, by
/// [`process_updates`](Self::process_updates), or by awaiting
/// [`run`](Self::run).
///
/// # Example
///
/// ```rust
/// use oxide_vdom::{Root, TestHost, VNode};
///
/// let host = TestHost::new();
/// let container = host.create_container();
/// let mut root = Root::new(host.clone(), container);
///
/// root.render(VNode::element("p").child("hello")).unwrap();
/// assert_eq!(host.html(container), "<p>hello</p>");
///
/// root.render(VNode::element("p").child("bye")).unwrap();
/// assert_eq!(host.html(container), "<p>bye</p>");
/// ```
pub struct Root<H: Host> {
    engine: Engine<H>,
    container: H::Node,
    root: Option<NodeId>,
}

impl<H: Host> Root<H> {
    /// Create a root rendering into `container` with default options.
    pub fn new(host: H, container: H::Node) -> Self {
        Self::with_options(host, container, RenderOptions::default())
    }

    pub fn with_options(host: H, container: H::Node, options: RenderOptions) -> Self {
        Root {
            engine: Engine::new(host, options),
            container,
            root: None,
        }
    }

    /// Render `input` into the container.
    ///
    /// The first render adopts existing content of the container through
    /// hydration; later renders patch against the previous tree.
    /// [`Render::Nothing`] unmounts everything and [`Render::NoOp`] leaves
    /// the container untouched.
    pub fn render(&mut self, input: impl Into<Render>) -> Result<(), RenderError> {
        let result = self.render_pass(input.into());
        self.complete(result)
    }

    fn render_pass(&mut self, input: Render) -> Result<(), RenderError> {
        let context = Context::new();
        match (input, self.root) {
            (Render::NoOp, _) => {}
            (Render::Nothing, None) => {}
            (Render::Nothing, Some(root)) => {
                tracing::debug!("unmounting root");
                self.root = None;
                self.engine.remove(root, &self.container);
            }
            (Render::Node(vnode), None) => {
                let first_render = if self.engine.host.first_child(&self.container).is_some() {
                    tracing::debug!("hydrating existing content");
                    self.engine.hydrate_root(vnode, &self.container, &context)?
                } else {
                    tracing::debug!("mounting root");
                    self.engine.mount(vnode, Some(&self.container), &context, false)?
                };
                self.root = Some(first_render);
            }
            (Render::Node(vnode), Some(root)) => {
                tracing::debug!("patching root");
                let patched = self.engine.patch(root, vnode, &self.container, &context, false)?;
                self.root = Some(patched);
            }
        }
        Ok(())
    }

    fn complete(&mut self, result: Result<(), RenderError>) -> Result<(), RenderError> {
        if let Err(error) = result {
            tracing::warn!(%error, "render pass failed");
            self.abandon();
            return Err(error);
        }
        self.engine.flush_lifecycle();
        self.engine.options.render_hooks().render_complete();
        self.process_updates()?;
        Ok(())
    }

    /// Adopt the existing content of the container explicitly, replacing
    /// whatever this root rendered before.
    pub fn hydrate(&mut self, vnode: VNode) -> Result<(), RenderError> {
        if let Some(root) = self.root.take() {
            self.engine.unmount(root);
        }
        let result = self
            .engine
            .hydrate_root(vnode, &self.container, &Context::new())
            .map(|id| self.root = Some(id));
        self.complete(result)
    }

    /// Unmount everything rendered into the container.
    pub fn unmount(&mut self) -> Result<(), RenderError> {
        self.render(Render::Nothing)
    }

    /// Deliver a native event to the handlers of the rendered tree.
    ///
    /// The target must be a host node of this root's host type. State
    /// updates requested by handlers are applied before returning, and a
    /// controlled form element is then restored to its rendered value.
    pub fn dispatch_event(&mut self, event: Event) -> Result<(), RenderError> {
        tracing::debug!(event_type = event.event_type(), "dispatching event");
        let controlled = self.engine.dispatch(event)?;
        self.process_updates()?;
        if let Some(owner) = controlled {
            self.engine.reapply_form(owner);
        }
        Ok(())
    }

    /// Apply every queued state update. Returns how many components were
    /// re-rendered.
    pub fn process_updates(&mut self) -> Result<usize, RenderError> {
        let result = self.engine.process_updates();
        if let Err(error) = &result {
            tracing::warn!(%error, "state update failed");
            self.abandon();
        }
        result
    }

    fn abandon(&mut self) {
        self.engine.discard_lifecycle();
        self.root = None;
        self.engine.abandon();
    }

    /// Wait for at least one state update, then apply everything queued.
    pub async fn next_update(&mut self) -> Result<usize, RenderError> {
        self.engine.updates.wait().await;
        self.process_updates()
    }

    /// Apply state updates as they arrive. Only returns on error.
    pub async fn run(&mut self) -> Result<(), RenderError> {
        loop {
            self.next_update().await?;
        }
    }

    pub fn host(&self) -> &H {
        &self.engine.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.engine.host
    }

    pub fn container(&self) -> &H::Node {
        &self.container
    }

    /// The instance of the class component rendered at the top of the tree.
    pub fn root_component<C: Component>(&self) -> Option<&C> {
        let record = self.engine.nodes.get(self.root?)?;
        let instance: &dyn Any = record.instance.as_ref()?.component();
        instance.downcast_ref()
    }

    /// Number of nodes holding a handler for the delegated `event_type`.
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.engine.events.delegated(event_type).count
    }

    /// Whether a document-level listener is installed for `event_type`.
    pub fn is_listening(&self, event_type: &str) -> bool {
        self.engine.events.delegated(event_type).installed
    }

    /// Number of mounted positions, including components and text.
    pub fn mounted_nodes(&self) -> usize {
        self.engine.nodes.len()
    }

    /// Number of host nodes holding any listener.
    pub fn tracked_listener_nodes(&self) -> usize {
        self.engine.events.tracked_nodes()
    }
}
