use futures::executor::block_on;
use oxide_vdom::VNode;

use super::{given_an_empty_root, Counter, CounterProps};

fn counter(props: &CounterProps) -> VNode {
    VNode::component::<Counter>(props.clone())
}

#[test]
fn given_queued_updates_should_render_once_per_batch() {
    let (mut root, host, container) = given_an_empty_root();
    let props = CounterProps::default();
    root.render(counter(&props)).unwrap();

    let link = props.link(0);
    link.set_state(|count| *count += 1);
    link.set_state(|count| *count += 1);
    link.set_state(|count| *count += 1);

    assert_eq!(root.process_updates().unwrap(), 1);
    assert_eq!(props.renders.get(), 2);
    assert_eq!(host.html(container), "<span>3</span>");
}

#[test]
fn given_an_update_from_will_mount_should_merge_it_into_the_first_render() {
    let (mut root, host, container) = given_an_empty_root();
    let props = CounterProps {
        start_at_one: true,
        ..CounterProps::default()
    };

    root.render(counter(&props)).unwrap();

    assert_eq!(props.renders.get(), 1);
    assert_eq!(host.html(container), "<span>1</span>");
}

#[test]
fn given_a_pending_update_when_awaited_should_apply_it() {
    let (mut root, host, container) = given_an_empty_root();
    let props = CounterProps::default();
    root.render(counter(&props)).unwrap();

    props.link(0).set_state(|count| *count = 7);
    let updated = block_on(root.next_update()).unwrap();

    assert_eq!(updated, 1);
    assert_eq!(host.html(container), "<span>7</span>");
}

#[test]
fn given_a_frozen_component_should_store_state_without_rendering_until_forced() {
    let (mut root, host, container) = given_an_empty_root();
    let props = CounterProps {
        frozen: true,
        ..CounterProps::default()
    };
    root.render(counter(&props)).unwrap();
    let link = props.link(0);

    link.set_state(|count| *count = 5);
    root.process_updates().unwrap();
    assert_eq!(host.html(container), "<span>0</span>");

    link.force_update();
    root.process_updates().unwrap();
    assert_eq!(host.html(container), "<span>5</span>");
}

#[test]
fn given_an_unmounted_component_should_drop_its_updates() {
    let (mut root, host, container) = given_an_empty_root();
    let props = CounterProps::default();
    root.render(counter(&props)).unwrap();
    let link = props.link(0);
    root.unmount().unwrap();

    link.set_state(|count| *count += 1);

    assert_eq!(root.process_updates().unwrap(), 0);
    assert_eq!(host.html(container), "");
}

#[test]
fn given_a_nested_component_update_should_patch_in_place() {
    let (mut root, host, container) = given_an_empty_root();
    let props = CounterProps::default();
    root.render(VNode::element("section").unkeyed_children([VNode::element("h1").child("title"), counter(&props)]))
        .unwrap();

    props.link(0).set_state(|count| *count = 2);
    root.process_updates().unwrap();

    assert_eq!(host.html(container), "<section><h1>title</h1><span>2</span></section>");
}
