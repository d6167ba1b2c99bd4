use std::cell::{Cell, RefCell};
use std::rc::Rc;

use oxide_vdom::{Component, Context, Link, Render, VNode};

/// Observer of the class component lifecycle, mocked in tests.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait LifecycleProbe {
    fn will_mount(&self);
    fn render(&self, value: u32);
    fn did_mount(&self);
    fn should_update(&self, value: u32, next_value: u32) -> bool;
    fn will_update(&self, next_value: u32);
    fn did_update(&self, prev_value: u32);
    fn will_unmount(&self);
}

#[derive(Clone)]
pub(crate) struct ProbeProps {
    pub(crate) value: u32,
    pub(crate) probe: Rc<dyn LifecycleProbe>,
}

/// Forwards every lifecycle hook to its probe and renders its value.
pub(crate) struct Probed;

impl Component for Probed {
    type Props = ProbeProps;
    type State = ();

    fn create(_props: &ProbeProps, _context: &Context, _link: Link<Self>) -> Self {
        Probed
    }

    fn will_mount(&mut self, props: &ProbeProps, _state: &mut ()) {
        props.probe.will_mount();
    }

    fn should_update(&self, props: &ProbeProps, _state: &(), next_props: &ProbeProps, _next_state: &()) -> bool {
        next_props.probe.should_update(props.value, next_props.value)
    }

    fn will_update(&mut self, _props: &ProbeProps, _state: &(), next_props: &ProbeProps, _next_state: &()) {
        next_props.probe.will_update(next_props.value);
    }

    fn render(&self, props: &ProbeProps, _state: &(), _context: &Context) -> Render {
        props.probe.render(props.value);
        VNode::element("span").child(props.value).into()
    }

    fn did_mount(&mut self, props: &ProbeProps, _state: &()) {
        props.probe.did_mount();
    }

    fn did_update(&mut self, props: &ProbeProps, _state: &(), prev_props: &ProbeProps, _prev_state: &()) {
        props.probe.did_update(prev_props.value);
    }

    fn will_unmount(&mut self, props: &ProbeProps, _state: &()) {
        props.probe.will_unmount();
    }
}

#[derive(Clone, Default)]
pub(crate) struct CounterProps {
    pub(crate) renders: Rc<Cell<u32>>,
    pub(crate) links: Rc<RefCell<Vec<Link<Counter>>>>,
    /// Queue an increment from `will_mount`.
    pub(crate) start_at_one: bool,
    /// Refuse every update that is not forced.
    pub(crate) frozen: bool,
}

/// Renders its count in a `<span>` and hands out its link.
pub(crate) struct Counter {
    link: Link<Self>,
}

impl Component for Counter {
    type Props = CounterProps;
    type State = u32;

    fn create(props: &CounterProps, _context: &Context, link: Link<Self>) -> Self {
        props.links.borrow_mut().push(link.clone());
        Counter { link }
    }

    fn will_mount(&mut self, props: &CounterProps, _state: &mut u32) {
        if props.start_at_one {
            self.link.set_state(|count| *count += 1);
        }
    }

    fn should_update(&self, _props: &CounterProps, _state: &u32, next_props: &CounterProps, _next_state: &u32) -> bool {
        !next_props.frozen
    }

    fn render(&self, props: &CounterProps, count: &u32, _context: &Context) -> Render {
        props.renders.set(props.renders.get() + 1);
        VNode::element("span").child(*count).into()
    }
}

impl CounterProps {
    pub(crate) fn link(&self, index: usize) -> Link<Counter> {
        self.links.borrow()[index].clone()
    }
}

#[derive(Clone)]
pub(crate) struct LoggedProps {
    pub(crate) name: &'static str,
    pub(crate) log: Rc<RefCell<Vec<String>>>,
    pub(crate) inner: Option<VNode>,
}

/// Records when it mounts and unmounts, wrapping an optional child.
pub(crate) struct Logged;

impl Component for Logged {
    type Props = LoggedProps;
    type State = ();

    fn create(_props: &LoggedProps, _context: &Context, _link: Link<Self>) -> Self {
        Logged
    }

    fn render(&self, props: &LoggedProps, _state: &(), _context: &Context) -> Render {
        VNode::element("div").child(props.inner.clone()).into()
    }

    fn did_mount(&mut self, props: &LoggedProps, _state: &()) {
        props.log.borrow_mut().push(format!("{} mounted", props.name));
    }

    fn will_unmount(&mut self, props: &LoggedProps, _state: &()) {
        props.log.borrow_mut().push(format!("{} unmounting", props.name));
    }
}

#[derive(Clone)]
pub(crate) struct LabelProps {
    pub(crate) text: &'static str,
    pub(crate) renders: Rc<Cell<u32>>,
}

pub(crate) fn label(props: &LabelProps, _context: &Context) -> Render {
    props.renders.set(props.renders.get() + 1);
    VNode::element("em").child(props.text).into()
}
