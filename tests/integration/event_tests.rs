use std::cell::RefCell;
use std::rc::Rc;

use oxide_vdom::{Event, HostOp, RenderError, TestNode, VNode};

use super::{first_child, given_an_empty_root};

type Log = Rc<RefCell<Vec<&'static str>>>;

fn logging(log: &Log, entry: &'static str, stop: bool) -> impl Fn(&mut Event) + 'static {
    let log = log.clone();
    move |event: &mut Event| {
        log.borrow_mut().push(entry);
        if stop {
            event.stop_propagation();
        }
    }
}

fn nested(log: &Log, inner: VNode) -> VNode {
    VNode::element("div")
        .on("onClick", logging(log, "outer", false))
        .child(inner)
}

#[test]
fn given_nested_handlers_should_bubble_from_target_to_ancestors() {
    let (mut root, host, container) = given_an_empty_root();
    let log = Log::default();
    root.render(nested(&log, VNode::element("button").on("onClick", logging(&log, "inner", false))))
        .unwrap();
    let button = first_child(&host, first_child(&host, container));

    root.dispatch_event(Event::new("click", button)).unwrap();

    assert_eq!(*log.borrow(), ["inner", "outer"]);
}

#[test]
fn given_stop_propagation_should_not_reach_ancestors() {
    let (mut root, host, container) = given_an_empty_root();
    let log = Log::default();
    root.render(nested(&log, VNode::element("button").on("onClick", logging(&log, "inner", true))))
        .unwrap();
    let button = first_child(&host, first_child(&host, container));

    root.dispatch_event(Event::new("click", button)).unwrap();

    assert_eq!(*log.borrow(), ["inner"]);
}

#[test]
fn given_a_secondary_button_click_should_not_dispatch() {
    let (mut root, host, container) = given_an_empty_root();
    let log = Log::default();
    root.render(nested(&log, VNode::element("button"))).unwrap();
    let button = first_child(&host, first_child(&host, container));

    root.dispatch_event(Event::new("click", button).with_button(2)).unwrap();

    assert!(log.borrow().is_empty());
}

#[test]
fn given_a_disabled_target_should_swallow_clicks() {
    let (mut root, host, container) = given_an_empty_root();
    let log = Log::default();
    root.render(nested(
        &log,
        VNode::element("button")
            .prop("disabled", true)
            .on("onClick", logging(&log, "inner", false)),
    ))
    .unwrap();
    let button = first_child(&host, first_child(&host, container));

    root.dispatch_event(Event::new("click", button)).unwrap();

    assert!(log.borrow().is_empty());
}

#[test]
fn given_a_handler_should_see_its_own_node_as_current_target() {
    let (mut root, host, container) = given_an_empty_root();
    let seen: Rc<RefCell<Vec<TestNode>>> = Rc::default();
    let observer = seen.clone();
    root.render(
        VNode::element("div")
            .on("onClick", move |event: &mut Event| {
                observer
                    .borrow_mut()
                    .extend(event.current_target::<TestNode>().copied());
            })
            .child(VNode::element("span")),
    )
    .unwrap();
    let div = first_child(&host, container);
    let span = first_child(&host, div);

    root.dispatch_event(Event::new("click", span)).unwrap();

    assert_eq!(*seen.borrow(), [div]);
}

#[test]
fn given_many_handlers_should_install_one_host_listener_per_type() {
    let (mut root, host, _container) = given_an_empty_root();
    let log = Log::default();
    let buttons = |with_handlers: bool| {
        VNode::element("div").children((0..3).map(|i| {
            let button = VNode::element("button").key(i);
            if with_handlers {
                button.on("onClick", logging(&log, "clicked", false))
            } else {
                button
            }
        }))
    };

    root.render(buttons(true)).unwrap();
    assert_eq!(root.listener_count("click"), 3);
    assert!(root.is_listening("click"));
    assert_eq!(
        host.ops()
            .iter()
            .filter(|op| matches!(op, HostOp::Listen { .. }))
            .count(),
        1
    );

    root.render(buttons(false)).unwrap();
    assert_eq!(root.listener_count("click"), 0);
    assert!(!host.is_listening("click"));
}

#[test]
fn given_a_non_delegated_event_should_attach_to_the_node() {
    let (mut root, host, container) = given_an_empty_root();
    let log = Log::default();
    root.render(VNode::element("div").on("onScroll", logging(&log, "scrolled", false)))
        .unwrap();
    let div = first_child(&host, container);
    assert_eq!(host.listeners_of(div), ["scroll"]);

    root.dispatch_event(Event::new("scroll", div)).unwrap();

    assert_eq!(*log.borrow(), ["scrolled"]);
}

#[test]
fn given_a_non_handler_event_prop_should_fail() {
    let (mut root, _host, _container) = given_an_empty_root();

    let result = root.render(VNode::element("div").prop("onClick", "alert(1)"));

    assert!(matches!(result, Err(RenderError::InvalidEventProp { name }) if name == "onClick"));
}

#[test]
fn given_a_non_handler_event_prop_after_a_handler_should_release_the_listener() {
    let (mut root, host, container) = given_an_empty_root();

    let result = root.render(VNode::element("div").unkeyed_children([
        VNode::element("button").on("onClick", |_| {}),
        VNode::element("a").prop("onClick", "alert(1)"),
    ]));

    assert!(matches!(result, Err(RenderError::InvalidEventProp { .. })));
    assert!(!root.is_listening("click"));
    assert_eq!(root.mounted_nodes(), 0);
    assert_eq!(host.html(container), "");
}

#[test]
fn given_an_unmounted_tree_should_release_every_listener() {
    let (mut root, host, _container) = given_an_empty_root();
    let log = Log::default();
    root.render(nested(
        &log,
        VNode::element("input").on("onKeyDown", logging(&log, "key", false)),
    ))
    .unwrap();

    root.unmount().unwrap();

    assert_eq!(root.mounted_nodes(), 0);
    assert_eq!(root.tracked_listener_nodes(), 0);
    assert!(!root.is_listening("click"));
    assert!(!host.is_listening("keydown"));
}
