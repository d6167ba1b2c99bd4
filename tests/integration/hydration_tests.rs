use std::cell::Cell;
use std::rc::Rc;

use oxide_vdom::{Event, HostOp, VNode};

use super::{first_child, given_an_empty_root};

fn created_nodes(ops: &[HostOp]) -> usize {
    ops.iter()
        .filter(|op| matches!(op, HostOp::CreateElement { .. } | HostOp::CreateText { .. }))
        .count()
}

#[test]
fn given_matching_markup_should_adopt_existing_nodes() {
    let (mut root, host, container) = given_an_empty_root();
    let server_div = host.build_element(container, "div", &[]);
    host.build_text(server_div, "hello");
    let clicks = Rc::new(Cell::new(0));
    let counter = clicks.clone();

    root.render(
        VNode::element("div")
            .on("onClick", move |_| counter.set(counter.get() + 1))
            .child("hello"),
    )
    .unwrap();

    assert_eq!(created_nodes(&host.ops()), 0);
    assert_eq!(first_child(&host, container), server_div);
    assert_eq!(host.html(container), "<div>hello</div>");

    root.dispatch_event(Event::new("click", server_div)).unwrap();
    assert_eq!(clicks.get(), 1);
}

#[test]
fn given_different_text_should_correct_it_in_place() {
    let (mut root, host, container) = given_an_empty_root();
    let server_div = host.build_element(container, "div", &[]);
    let server_text = host.build_text(server_div, "old");

    root.render(VNode::element("div").child("new")).unwrap();

    assert_eq!(first_child(&host, server_div), server_text);
    assert_eq!(host.html(container), "<div>new</div>");
}

#[test]
fn given_a_different_tag_should_remount_that_subtree() {
    let (mut root, host, container) = given_an_empty_root();
    let server_span = host.build_element(container, "span", &[]);
    host.build_text(server_span, "x");

    root.render(VNode::element("div").child("x")).unwrap();

    assert_ne!(first_child(&host, container), server_span);
    assert_eq!(host.html(container), "<div>x</div>");
}

#[test]
fn given_extra_server_nodes_should_remove_them() {
    let (mut root, host, container) = given_an_empty_root();
    let server_div = host.build_element(container, "div", &[]);
    host.build_text(server_div, "a");
    host.build_text(server_div, "stale");
    host.build_element(container, "footer", &[]);

    root.render(VNode::element("div").unkeyed_children(["a"])).unwrap();

    assert_eq!(host.html(container), "<div>a</div>");
}

#[test]
fn given_missing_server_nodes_should_mount_them() {
    let (mut root, host, container) = given_an_empty_root();
    let server_list = host.build_element(container, "ul", &[]);
    let server_item = host.build_element(server_list, "li", &[]);
    host.build_text(server_item, "a");

    root.render(VNode::element("ul").children(["a", "b"].map(|key| VNode::element("li").key(key).child(key))))
        .unwrap();

    assert_eq!(host.children_of(server_list)[0], server_item);
    assert_eq!(host.html(container), "<ul><li>a</li><li>b</li></ul>");
}

#[test]
fn given_comment_markers_should_strip_them_and_restore_empty_text() {
    let (mut root, host, container) = given_an_empty_root();
    let server_div = host.build_element(container, "div", &[]);
    host.build_comment(server_div, "server");
    host.build_text(server_div, "a");
    host.build_comment(server_div, "!");

    root.render(VNode::element("div").unkeyed_children(["a", ""])).unwrap();

    assert_eq!(host.children_of(server_div).len(), 2);
    assert_eq!(host.html(container), "<div>a</div>");
}

#[test]
fn given_a_stale_class_attribute_should_remove_it() {
    let (mut root, host, container) = given_an_empty_root();
    host.build_element(container, "p", &[("class", "old")]);

    root.render(VNode::element("p")).unwrap();

    assert_eq!(host.html(container), "<p></p>");
}

#[test]
fn given_a_later_render_should_patch_the_hydrated_tree() {
    let (mut root, host, container) = given_an_empty_root();
    let server_div = host.build_element(container, "div", &[]);
    host.build_text(server_div, "one");
    root.render(VNode::element("div").child("one")).unwrap();

    root.render(VNode::element("div").child("two")).unwrap();

    assert_eq!(first_child(&host, container), server_div);
    assert_eq!(host.html(container), "<div>two</div>");
}
