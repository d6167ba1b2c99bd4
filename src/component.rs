//! Component contract, instances and the per-instance lifecycle state machine.

use core::any::{type_name, Any, TypeId};
use core::fmt;
use core::marker::PhantomData;
use std::collections::HashMap;
use std::rc::Rc;

use flume::Sender;

use crate::arena::NodeId;
use crate::error::RenderError;
use crate::lifecycle::{Change, StateUpdate};
use crate::vnode::VNode;

/// Immutable, type-keyed values threaded from components to their
/// descendants.
///
/// ```rust
/// use oxide_vdom::Context;
///
/// struct Theme(&'static str);
///
/// let context = Context::new().with(Theme("dark"));
/// assert_eq!(context.get::<Theme>().map(|theme| theme.0), Some("dark"));
/// assert!(context.get::<u32>().is_none());
/// ```
#[derive(Clone, Default)]
pub struct Context(Rc<HashMap<TypeId, Rc<dyn Any>>>);

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of this context holding `value`, replacing any value of the
    /// same type.
    pub fn with<T: Any>(&self, value: T) -> Self {
        let mut values = (*self.0).clone();
        values.insert(TypeId::of::<T>(), Rc::new(value));
        Context(Rc::new(values))
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.0.get(&TypeId::of::<T>())?.downcast_ref()
    }

    /// Values from `other` layered over this context.
    pub fn merge(&self, other: &Context) -> Self {
        if other.0.is_empty() {
            return self.clone();
        }
        if self.0.is_empty() {
            return other.clone();
        }
        let mut values = (*self.0).clone();
        values.extend(other.0.iter().map(|(id, value)| (*id, value.clone())));
        Context(Rc::new(values))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("entries", &self.0.len())
            .finish()
    }
}

/// Result of rendering a component.
#[derive(Clone, Debug)]
pub enum Render {
    Node(VNode),
    /// Render nothing; occupies an empty placeholder.
    Nothing,
    /// Keep whatever is currently rendered and skip the update.
    NoOp,
}

impl From<VNode> for Render {
    fn from(value: VNode) -> Self {
        Render::Node(value)
    }
}

impl From<Option<VNode>> for Render {
    fn from(value: Option<VNode>) -> Self {
        value.map_or(Render::Nothing, Render::Node)
    }
}

/// Lifecycle phase of a class component instance.
///
/// `Constructing → PreMounted → Mounted ⇄ Updating → Unmounted`. Once
/// unmounted, updates for the instance are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Constructing,
    PreMounted,
    Mounted,
    Updating,
    Unmounted,
}

/// Class-shaped component.
///
/// Only [`create`](Self::create) and [`render`](Self::render) are required;
/// every other hook defaults to doing nothing (and `should_update` to
/// always updating).
///
/// # Example
///
/// ```rust
/// use oxide_vdom::{Component, Context, Link, Render, VNode};
///
/// struct Counter {
///     link: Link<Self>,
/// }
///
/// impl Component for Counter {
///     type Props = String;
///     type State = u32;
///
///     fn create(_props: &String, _context: &Context, link: Link<Self>) -> Self {
///         Counter { link }
///     }
///
///     fn render(&self, label: &String, count: &u32, _context: &Context) -> Render {
///         let link = self.link.clone();
///         VNode::element("button")
///             .on("onClick", move |_| link.set_state(|count| *count += 1))
///             .child(format!("{label}: {count}"))
///             .into()
///     }
/// }
/// ```
pub trait Component: Sized + 'static {
    type Props: 'static;
    type State: Clone + Default + 'static;

    /// Construct the instance. `link` queues state updates for it.
    fn create(props: &Self::Props, context: &Context, link: Link<Self>) -> Self;

    fn initial_state(&self, _props: &Self::Props) -> Self::State {
        Self::State::default()
    }

    /// Runs once before the first render; `state` may be edited in place.
    fn will_mount(&mut self, _props: &Self::Props, _state: &mut Self::State) {}

    /// Runs before an update caused by new props; `state` is the state the
    /// update will render with.
    fn will_receive_props(
        &mut self,
        _next_props: &Self::Props,
        _state: &mut Self::State,
        _context: &Context,
    ) {
    }

    fn should_update(
        &self,
        _props: &Self::Props,
        _state: &Self::State,
        _next_props: &Self::Props,
        _next_state: &Self::State,
    ) -> bool {
        true
    }

    fn will_update(
        &mut self,
        _props: &Self::Props,
        _state: &Self::State,
        _next_props: &Self::Props,
        _next_state: &Self::State,
    ) {
    }

    fn render(&self, props: &Self::Props, state: &Self::State, context: &Context) -> Render;

    /// Values merged into the context seen by descendants.
    fn child_context(&self, _props: &Self::Props, _state: &Self::State) -> Option<Context> {
        None
    }

    /// Runs after the whole pass that mounted the instance has settled.
    fn did_mount(&mut self, _props: &Self::Props, _state: &Self::State) {}

    fn did_update(
        &mut self,
        _props: &Self::Props,
        _state: &Self::State,
        _prev_props: &Self::Props,
        _prev_state: &Self::State,
    ) {
    }

    fn will_unmount(&mut self, _props: &Self::Props, _state: &Self::State) {}
}

/// Handle through which a component requests updates of its own state.
///
/// Updates are queued, never applied re-entrantly; the owning root applies
/// them after the current pass (see [`crate::Root::process_updates`]).
pub struct Link<C: Component> {
    id: NodeId,
    sender: Sender<StateUpdate>,
    _component: PhantomData<fn() -> C>,
}

impl<C: Component> Clone for Link<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            sender: self.sender.clone(),
            _component: PhantomData,
        }
    }
}

impl<C: Component> Link<C> {
    /// Queue an edit of the component's state.
    pub fn set_state(&self, update: impl FnOnce(&mut C::State) + 'static) {
        let change = Change::Apply(Box::new(move |state: &mut dyn Any| {
            if let Some(state) = state.downcast_mut::<C::State>() {
                update(state);
            }
        }));
        self.send(change);
    }

    /// Queue a re-render that bypasses [`Component::should_update`].
    pub fn force_update(&self) {
        self.send(Change::Force);
    }

    fn send(&self, change: Change) {
        self.sender.send(StateUpdate { id: self.id, change }).ok();
    }
}

/// Type-erased view of an [`Instance`] used by the reconciler.
pub(crate) trait AnyInstance {
    fn name(&self) -> &'static str;
    fn phase(&self) -> Phase;
    fn component(&self) -> &dyn Any;
    fn will_mount(&mut self);
    /// Merge a queued change; returns whether it forces an update.
    fn apply(&mut self, change: Change) -> bool;
    fn receive(&mut self, props: Rc<dyn Any>, context: Context) -> Result<(), RenderError>;
    /// Decide whether the staged update renders. When it does not, the
    /// staged props and state are committed without rendering.
    fn should_update(&mut self, force: bool) -> bool;
    fn will_update(&mut self);
    fn commit(&mut self);
    fn render(&self) -> Render;
    fn child_context(&self) -> Context;
    fn did_mount(&mut self);
    fn did_update(&mut self);
    /// End an update that rendered [`Render::NoOp`].
    fn settle(&mut self);
    fn will_unmount(&mut self);
}

struct Instance<C: Component> {
    component: C,
    props: Rc<C::Props>,
    state: C::State,
    context: Context,
    next_props: Option<Rc<C::Props>>,
    next_state: Option<C::State>,
    next_context: Option<Context>,
    previous: Option<(Rc<C::Props>, C::State)>,
    phase: Phase,
}

impl<C: Component> AnyInstance for Instance<C> {
    fn name(&self) -> &'static str {
        type_name::<C>()
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn component(&self) -> &dyn Any {
        &self.component
    }

    fn will_mount(&mut self) {
        self.component.will_mount(&self.props, &mut self.state);
        self.phase = Phase::PreMounted;
    }

    fn apply(&mut self, change: Change) -> bool {
        match change {
            Change::Force => true,
            Change::Apply(update) => {
                let state = match self.phase {
                    Phase::Constructing | Phase::PreMounted => &mut self.state,
                    _ => self.next_state.get_or_insert_with(|| self.state.clone()),
                };
                update(state as &mut dyn Any);
                false
            }
        }
    }

    fn receive(&mut self, props: Rc<dyn Any>, context: Context) -> Result<(), RenderError> {
        let props = props
            .downcast::<C::Props>()
            .map_err(|_| RenderError::PropsMismatch {
                component: type_name::<C>(),
            })?;
        let state = self.next_state.get_or_insert_with(|| self.state.clone());
        self.component.will_receive_props(&props, state, &context);
        self.next_props = Some(props);
        self.next_context = Some(context);
        Ok(())
    }

    fn should_update(&mut self, force: bool) -> bool {
        let next_props = self.next_props.take().unwrap_or_else(|| self.props.clone());
        let next_state = self.next_state.take().unwrap_or_else(|| self.state.clone());
        let proceed = force
            || self
                .component
                .should_update(&self.props, &self.state, &next_props, &next_state);
        if proceed {
            self.next_props = Some(next_props);
            self.next_state = Some(next_state);
            self.phase = Phase::Updating;
        } else {
            self.props = next_props;
            self.state = next_state;
            if let Some(context) = self.next_context.take() {
                self.context = context;
            }
        }
        proceed
    }

    fn will_update(&mut self) {
        if let (Some(next_props), Some(next_state)) = (&self.next_props, &self.next_state) {
            self.component
                .will_update(&self.props, &self.state, next_props, next_state);
        }
    }

    fn commit(&mut self) {
        let next_props = self.next_props.take().unwrap_or_else(|| self.props.clone());
        let next_state = self.next_state.take().unwrap_or_else(|| self.state.clone());
        let prev_props = core::mem::replace(&mut self.props, next_props);
        let prev_state = core::mem::replace(&mut self.state, next_state);
        self.previous = Some((prev_props, prev_state));
        if let Some(context) = self.next_context.take() {
            self.context = context;
        }
    }

    fn render(&self) -> Render {
        self.component.render(&self.props, &self.state, &self.context)
    }

    fn child_context(&self) -> Context {
        match self.component.child_context(&self.props, &self.state) {
            Some(child) => self.context.merge(&child),
            None => self.context.clone(),
        }
    }

    fn did_mount(&mut self) {
        if self.phase != Phase::PreMounted {
            return;
        }
        self.phase = Phase::Mounted;
        self.component.did_mount(&self.props, &self.state);
    }

    fn did_update(&mut self) {
        self.phase = Phase::Mounted;
        if let Some((prev_props, prev_state)) = self.previous.take() {
            self.component
                .did_update(&self.props, &self.state, &prev_props, &prev_state);
        }
    }

    fn settle(&mut self) {
        self.phase = Phase::Mounted;
        self.previous = None;
    }

    fn will_unmount(&mut self) {
        self.component.will_unmount(&self.props, &self.state);
        self.phase = Phase::Unmounted;
    }
}

type CreateFn = fn(
    Rc<dyn Any>,
    &Context,
    NodeId,
    Sender<StateUpdate>,
) -> Result<Box<dyn AnyInstance>, RenderError>;

/// Identity and constructor of a class component type.
#[derive(Clone, Copy)]
pub(crate) struct ClassType {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
    pub(crate) create: CreateFn,
}

impl ClassType {
    pub(crate) fn of<C: Component>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: type_name::<C>(),
            create: create_instance::<C>,
        }
    }
}

fn create_instance<C: Component>(
    props: Rc<dyn Any>,
    context: &Context,
    id: NodeId,
    sender: Sender<StateUpdate>,
) -> Result<Box<dyn AnyInstance>, RenderError> {
    let props = props
        .downcast::<C::Props>()
        .map_err(|_| RenderError::PropsMismatch {
            component: type_name::<C>(),
        })?;
    let link = Link {
        id,
        sender,
        _component: PhantomData,
    };
    let component = C::create(&props, context, link);
    let state = component.initial_state(&props);
    Ok(Box::new(Instance {
        component,
        props,
        state,
        context: context.clone(),
        next_props: None,
        next_state: None,
        next_context: None,
        previous: None,
        phase: Phase::Constructing,
    }))
}

type RenderFn = Rc<dyn Fn(&dyn Any, &Context) -> Option<Render>>;

/// Identity and entry point of a function component.
#[derive(Clone)]
pub(crate) struct FunctionType {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
    render: RenderFn,
}

impl FunctionType {
    pub(crate) fn of<P, F>(render: F) -> Self
    where
        P: 'static,
        F: Fn(&P, &Context) -> Render + 'static,
    {
        Self {
            id: TypeId::of::<F>(),
            name: type_name::<F>(),
            render: Rc::new(move |props, context| {
                props
                    .downcast_ref::<P>()
                    .map(|props| render(props, context))
            }),
        }
    }

    pub(crate) fn call(&self, props: &dyn Any, context: &Context) -> Result<Render, RenderError> {
        (self.render)(props, context).ok_or(RenderError::PropsMismatch {
            component: self.name,
        })
    }
}

type Hook = Box<dyn Fn(&dyn Any)>;
type PairHook = Box<dyn Fn(&dyn Any, &dyn Any)>;
type GateHook = Box<dyn Fn(&dyn Any, &dyn Any) -> bool>;

/// Function-component hooks with their props type erased.
#[derive(Default)]
pub(crate) struct ErasedHooks {
    will_mount: Option<Hook>,
    did_mount: Option<Hook>,
    should_update: Option<GateHook>,
    will_update: Option<PairHook>,
    did_update: Option<PairHook>,
    will_unmount: Option<Hook>,
}

impl ErasedHooks {
    pub(crate) fn will_mount(&self, props: &dyn Any) {
        if let Some(hook) = &self.will_mount {
            hook(props);
        }
    }

    pub(crate) fn has_did_mount(&self) -> bool {
        self.did_mount.is_some()
    }

    pub(crate) fn did_mount(&self, props: &dyn Any) {
        if let Some(hook) = &self.did_mount {
            hook(props);
        }
    }

    pub(crate) fn should_update(&self, last: &dyn Any, next: &dyn Any) -> bool {
        self.should_update
            .as_ref()
            .map_or(true, |hook| hook(last, next))
    }

    pub(crate) fn will_update(&self, last: &dyn Any, next: &dyn Any) {
        if let Some(hook) = &self.will_update {
            hook(last, next);
        }
    }

    pub(crate) fn did_update(&self, last: &dyn Any, next: &dyn Any) {
        if let Some(hook) = &self.did_update {
            hook(last, next);
        }
    }

    pub(crate) fn will_unmount(&self, props: &dyn Any) {
        if let Some(hook) = &self.will_unmount {
            hook(props);
        }
    }
}

/// Lifecycle hooks for a function component, attached with
/// [`VNode::hooks`].
///
/// ```rust
/// use oxide_vdom::{Context, FunctionHooks, Render, VNode};
///
/// fn greeting(name: &String, _context: &Context) -> Render {
///     VNode::text(format!("hello {name}")).into()
/// }
///
/// let node = VNode::function(greeting, String::from("world")).hooks(
///     FunctionHooks::<String>::new()
///         .on_should_update(|last, next| last != next)
///         .on_did_mount(|name| println!("mounted {name}")),
/// );
/// # let _ = node;
/// ```
pub struct FunctionHooks<P> {
    erased: ErasedHooks,
    _props: PhantomData<fn(&P)>,
}

impl<P: 'static> Default for FunctionHooks<P> {
    fn default() -> Self {
        Self::new()
    }
}

fn typed<P: 'static>(hook: impl Fn(&P) + 'static) -> Hook {
    Box::new(move |props| {
        if let Some(props) = props.downcast_ref::<P>() {
            hook(props);
        }
    })
}

fn typed_pair<P: 'static>(hook: impl Fn(&P, &P) + 'static) -> PairHook {
    Box::new(move |last, next| {
        if let (Some(last), Some(next)) = (last.downcast_ref::<P>(), next.downcast_ref::<P>()) {
            hook(last, next);
        }
    })
}

impl<P: 'static> FunctionHooks<P> {
    pub fn new() -> Self {
        Self {
            erased: ErasedHooks::default(),
            _props: PhantomData,
        }
    }

    pub fn on_will_mount(mut self, hook: impl Fn(&P) + 'static) -> Self {
        self.erased.will_mount = Some(typed(hook));
        self
    }

    /// Runs after the pass that mounted the component has settled.
    pub fn on_did_mount(mut self, hook: impl Fn(&P) + 'static) -> Self {
        self.erased.did_mount = Some(typed(hook));
        self
    }

    /// Gate re-rendering on new props; returning `false` keeps the previous
    /// output untouched.
    pub fn on_should_update(mut self, hook: impl Fn(&P, &P) -> bool + 'static) -> Self {
        self.erased.should_update = Some(Box::new(move |last, next| {
            match (last.downcast_ref::<P>(), next.downcast_ref::<P>()) {
                (Some(last), Some(next)) => hook(last, next),
                _ => true,
            }
        }));
        self
    }

    pub fn on_will_update(mut self, hook: impl Fn(&P, &P) + 'static) -> Self {
        self.erased.will_update = Some(typed_pair(hook));
        self
    }

    pub fn on_did_update(mut self, hook: impl Fn(&P, &P) + 'static) -> Self {
        self.erased.did_update = Some(typed_pair(hook));
        self
    }

    pub fn on_will_unmount(mut self, hook: impl Fn(&P) + 'static) -> Self {
        self.erased.will_unmount = Some(typed(hook));
        self
    }

    pub(crate) fn into_erased(self) -> ErasedHooks {
        self.erased
    }
}
