use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mockall::predicate::eq;
use mockall::Sequence;
use oxide_vdom::{FunctionHooks, RenderHooks, RenderOptions, Root, TestHost, TestNode, VNode};

use super::{
    first_child, given_an_empty_root, label, LabelProps, LifecycleProbe, Logged, LoggedProps,
    MockLifecycleProbe, ProbeProps, Probed,
};

fn probed(value: u32, probe: &Rc<dyn LifecycleProbe>) -> VNode {
    VNode::component::<Probed>(ProbeProps {
        value,
        probe: probe.clone(),
    })
}

#[test]
fn given_a_new_component_should_run_mount_hooks_in_order() {
    let (mut root, host, container) = given_an_empty_root();
    let mut sequence = Sequence::new();
    let mut probe = MockLifecycleProbe::new();
    probe.expect_will_mount().times(1).in_sequence(&mut sequence).return_const(());
    probe
        .expect_render()
        .with(eq(1))
        .times(1)
        .in_sequence(&mut sequence)
        .return_const(());
    probe.expect_did_mount().times(1).in_sequence(&mut sequence).return_const(());
    let probe: Rc<dyn LifecycleProbe> = Rc::new(probe);

    root.render(probed(1, &probe)).unwrap();

    assert_eq!(host.html(container), "<span>1</span>");
}

#[test]
fn given_should_update_false_should_keep_output_but_store_props() {
    let (mut root, host, container) = given_an_empty_root();
    let mut probe = MockLifecycleProbe::new();
    probe.expect_will_mount().return_const(());
    probe.expect_did_mount().return_const(());
    probe.expect_render().with(eq(1)).times(1).return_const(());
    probe
        .expect_should_update()
        .with(eq(1), eq(2))
        .times(1)
        .return_const(false);
    probe
        .expect_should_update()
        .with(eq(2), eq(3))
        .times(1)
        .return_const(true);
    probe.expect_will_update().with(eq(3)).times(1).return_const(());
    probe.expect_render().with(eq(3)).times(1).return_const(());
    probe.expect_did_update().with(eq(2)).times(1).return_const(());
    let probe: Rc<dyn LifecycleProbe> = Rc::new(probe);

    root.render(probed(1, &probe)).unwrap();
    root.render(probed(2, &probe)).unwrap();
    assert_eq!(host.html(container), "<span>1</span>");

    root.render(probed(3, &probe)).unwrap();
    assert_eq!(host.html(container), "<span>3</span>");
}

#[test]
fn given_an_unmounted_root_should_call_will_unmount() {
    let (mut root, host, container) = given_an_empty_root();
    let mut probe = MockLifecycleProbe::new();
    probe.expect_will_mount().return_const(());
    probe.expect_render().return_const(());
    probe.expect_did_mount().return_const(());
    probe.expect_will_unmount().times(1).return_const(());
    let probe: Rc<dyn LifecycleProbe> = Rc::new(probe);
    root.render(probed(1, &probe)).unwrap();

    root.unmount().unwrap();

    assert_eq!(host.html(container), "");
    assert_eq!(root.mounted_nodes(), 0);
}

#[test]
fn given_nested_components_should_mount_children_first_and_unmount_parents_first() {
    let (mut root, _host, _container) = given_an_empty_root();
    let log = Rc::new(RefCell::new(Vec::new()));
    let inner = VNode::component::<Logged>(LoggedProps {
        name: "inner",
        log: log.clone(),
        inner: None,
    });
    root.render(VNode::component::<Logged>(LoggedProps {
        name: "outer",
        log: log.clone(),
        inner: Some(inner),
    }))
    .unwrap();

    root.unmount().unwrap();

    assert_eq!(
        *log.borrow(),
        ["inner mounted", "outer mounted", "outer unmounting", "inner unmounting"]
    );
}

#[test]
fn given_an_element_ref_should_see_the_node_then_none() {
    let (mut root, host, container) = given_an_empty_root();
    let seen: Rc<RefCell<Vec<Option<TestNode>>>> = Rc::default();
    let observer = seen.clone();
    root.render(VNode::element("div").node_ref(move |node: Option<&dyn Any>| {
        observer
            .borrow_mut()
            .push(node.and_then(|node| node.downcast_ref::<TestNode>()).copied());
    }))
    .unwrap();
    let div = first_child(&host, container);

    root.unmount().unwrap();

    assert_eq!(*seen.borrow(), [Some(div), None]);
}

#[test]
fn given_function_hooks_should_skip_renders_with_equal_props() {
    let (mut root, host, container) = given_an_empty_root();
    let renders = Rc::new(Cell::new(0));
    let mounted = Rc::new(Cell::new(0));
    let node = |text: &'static str| {
        let mounted = mounted.clone();
        VNode::function(
            label,
            LabelProps {
                text,
                renders: renders.clone(),
            },
        )
        .hooks(
            FunctionHooks::<LabelProps>::new()
                .on_should_update(|last, next| last.text != next.text)
                .on_did_mount(move |_| mounted.set(mounted.get() + 1)),
        )
    };

    root.render(node("a")).unwrap();
    root.render(node("a")).unwrap();
    assert_eq!(renders.get(), 1);

    root.render(node("b")).unwrap();
    assert_eq!(renders.get(), 2);
    assert_eq!(mounted.get(), 1);
    assert_eq!(host.html(container), "<em>b</em>");
}

#[test]
fn given_render_hooks_should_observe_every_pass() {
    let host = TestHost::new();
    let container = host.create_container();
    let completed = Rc::new(Cell::new(0));
    let rendered = Rc::new(Cell::new(0));
    let (on_complete, on_render) = (completed.clone(), rendered.clone());
    let options = RenderOptions::new().hooks(
        RenderHooks::new()
            .on_render_complete(move || on_complete.set(on_complete.get() + 1))
            .on_after_render(move |_| on_render.set(on_render.get() + 1)),
    );
    let mut root = Root::with_options(host.clone(), container, options);
    let log = Rc::new(RefCell::new(Vec::new()));
    let tree = || {
        VNode::component::<Logged>(LoggedProps {
            name: "only",
            log: log.clone(),
            inner: None,
        })
    };

    root.render(tree()).unwrap();
    root.render(tree()).unwrap();

    assert_eq!(completed.get(), 2);
    assert_eq!(rendered.get(), 2);
}
