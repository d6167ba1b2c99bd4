use oxide_vdom::{Host, HostOp, Namespace, PropValue, Property, RenderError, Style, VNode};

use super::{first_child, given_an_empty_root};

fn card(title: &str) -> VNode {
    VNode::element("section")
        .class("card")
        .prop("title", title)
        .prop("style", Style::map().set("width", 10).set("opacity", 0.5))
        .child(VNode::element("h2").child(title))
}

fn controlled_form() -> VNode {
    VNode::element("form").unkeyed_children([
        VNode::element("input")
            .prop("type", "checkbox")
            .prop("checked", true)
            .prop("value", "on"),
        VNode::element("select").prop("value", "b").children(
            ["a", "b"].map(|option| VNode::element("option").key(option).prop("value", option).child(option)),
        ),
        VNode::element("input").prop("value", "typed"),
    ])
}

#[test]
fn given_an_identical_tree_should_not_touch_the_host() {
    let (mut root, host, _container) = given_an_empty_root();
    root.render(card("hello")).unwrap();
    host.clear_ops();

    root.render(card("hello")).unwrap();

    assert_eq!(host.ops(), vec![]);
}

#[test]
fn given_identical_controlled_form_elements_should_not_touch_the_host() {
    let (mut root, host, _container) = given_an_empty_root();
    root.render(controlled_form()).unwrap();
    host.clear_ops();

    root.render(controlled_form()).unwrap();

    assert_eq!(host.ops(), vec![]);
}

#[test]
fn given_a_changed_prop_should_only_rewrite_that_prop() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(card("hello")).unwrap();
    host.clear_ops();

    root.render(card("bye")).unwrap();

    let section = first_child(&host, container);
    assert_eq!(
        host.ops()
            .into_iter()
            .filter(|op| matches!(op, HostOp::SetAttribute { .. }))
            .collect::<Vec<_>>(),
        vec![HostOp::SetAttribute {
            node: section,
            name: String::from("title"),
            value: String::from("bye"),
        }]
    );
    assert_eq!(
        host.html(container),
        "<section class=\"card\" title=\"bye\" style=\"width:10px;opacity:0.5;\"><h2>bye</h2></section>"
    );
}

#[test]
fn given_a_dropped_style_property_should_clear_it() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(card("hello")).unwrap();

    root.render(
        VNode::element("section")
            .class("card")
            .prop("title", "hello")
            .prop("style", Style::map().set("width", "50%"))
            .child(VNode::element("h2").child("hello")),
    )
    .unwrap();

    let section = first_child(&host, container);
    assert_eq!(host.style_of(section, "width").as_deref(), Some("50%"));
    assert_eq!(host.style_of(section, "opacity"), None);
}

#[test]
fn given_a_removed_class_should_remove_the_class_attribute() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(VNode::element("div").class("a")).unwrap();
    assert_eq!(host.html(container), "<div class=\"a\"></div>");

    root.render(VNode::element("div")).unwrap();

    assert_eq!(host.html(container), "<div></div>");
}

#[test]
fn given_boolean_props_should_set_properties_instead_of_attributes() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(VNode::element("button").prop("disabled", true).prop("autoFocus", true))
        .unwrap();

    let button = first_child(&host, container);
    assert_eq!(host.property_of(button, "disabled"), Some(Property::Bool(true)));
    assert_eq!(host.property_of(button, "autofocus"), Some(Property::Bool(true)));
    assert_eq!(host.attribute_of(button, "disabled"), None);
}

#[test]
fn given_a_null_prop_should_remove_the_attribute() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(VNode::element("a").prop("href", "/home")).unwrap();

    root.render(VNode::element("a").prop("href", PropValue::Null)).unwrap();

    let link = first_child(&host, container);
    assert_eq!(host.attribute_of(link, "href"), None);
}

#[test]
fn given_an_svg_subtree_should_create_elements_in_the_svg_namespace() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(
        VNode::element("svg").child(
            VNode::element("foreignObject").child(VNode::element("div").prop("xlink:href", "#a")),
        ),
    )
    .unwrap();

    let svg = first_child(&host, container);
    let foreign = first_child(&host, svg);
    let div = first_child(&host, foreign);
    assert_eq!(host.namespace_of(svg), Some(Namespace::Svg));
    assert_eq!(host.namespace_of(foreign), Some(Namespace::Svg));
    assert_eq!(host.namespace_of(div), Some(Namespace::Html));
}

#[test]
fn given_inner_html_should_write_raw_markup() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(VNode::element("div").prop("dangerouslySetInnerHTML", PropValue::html("<b>x</b>")))
        .unwrap();
    assert_eq!(host.html(container), "<div><b>x</b></div>");

    root.render(VNode::element("div").child("plain")).unwrap();

    assert_eq!(host.html(container), "<div>plain</div>");
}

#[test]
fn given_children_on_a_void_element_should_fail() {
    let (mut root, _host, _container) = given_an_empty_root();

    let result = root.render(VNode::element("input").child("nope"));

    assert!(matches!(result, Err(RenderError::VoidElementChildren { tag }) if tag == "input"));
}

fn clickable_with(last: VNode) -> VNode {
    VNode::element("div").unkeyed_children([VNode::element("p").on("onClick", |_| {}), last])
}

#[test]
fn given_a_failed_first_render_should_leave_nothing_behind() {
    let (mut root, host, container) = given_an_empty_root();

    let result = root.render(clickable_with(VNode::element("input").child("x")));

    assert!(matches!(result, Err(RenderError::VoidElementChildren { .. })));
    assert_eq!(root.mounted_nodes(), 0);
    assert!(!root.is_listening("click"));
    assert_eq!(root.listener_count("click"), 0);
    assert_eq!(root.tracked_listener_nodes(), 0);
    assert_eq!(host.html(container), "");

    root.render(VNode::element("div").child("ok")).unwrap();
    assert_eq!(host.html(container), "<div>ok</div>");
}

#[test]
fn given_a_failed_patch_should_unmount_the_whole_tree() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(clickable_with(VNode::element("span"))).unwrap();
    assert!(root.is_listening("click"));

    let result = root.render(clickable_with(VNode::element("input").child("x")));

    assert!(result.is_err());
    assert_eq!(root.mounted_nodes(), 0);
    assert!(!root.is_listening("click"));
    assert_eq!(host.html(container), "");

    root.render(clickable_with(VNode::element("span"))).unwrap();
    assert_eq!(host.html(container), "<div><p></p><span></span></div>");
    assert_eq!(root.listener_count("click"), 1);
}

#[test]
fn given_a_different_tag_should_replace_the_node() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(VNode::element("div").child("x")).unwrap();
    let div = first_child(&host, container);

    root.render(VNode::element("p").child("x")).unwrap();

    assert_ne!(first_child(&host, container), div);
    assert_eq!(host.html(container), "<p>x</p>");
    assert_eq!(root.mounted_nodes(), 2);
}

fn editable(text: &str) -> VNode {
    VNode::element("div").content_editable().child(text)
}

#[test]
fn given_user_edits_matching_the_next_text_should_leave_an_editable_element_alone() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(editable("a")).unwrap();
    let text = first_child(&host, first_child(&host, container));
    host.clone().set_text(&text, "ab");
    host.clear_ops();

    root.render(editable("ab")).unwrap();

    assert_eq!(host.ops(), vec![]);
    assert_eq!(host.html(container), "<div>ab</div>");
}

#[test]
fn given_different_text_should_rewrite_the_editable_element_content() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(editable("a")).unwrap();
    let div = first_child(&host, container);
    let text = first_child(&host, div);
    host.clone().set_text(&text, "typed");
    host.clear_ops();

    root.render(editable("b")).unwrap();

    assert_eq!(host.ops()[0], HostOp::ClearChildren { parent: div });
    assert_eq!(host.html(container), "<div>b</div>");
    assert_eq!(root.mounted_nodes(), 2);

    root.render(editable("")).unwrap();
    assert_eq!(host.html(container), "<div></div>");
    assert_eq!(root.mounted_nodes(), 1);
}
