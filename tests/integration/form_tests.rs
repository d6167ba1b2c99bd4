use std::cell::Cell;
use std::rc::Rc;

use oxide_vdom::{Event, Property, VNode};

use super::{first_child, given_an_empty_root};

fn counting(count: &Rc<Cell<u32>>) -> impl Fn(&mut Event) + 'static {
    let count = count.clone();
    move |_event: &mut Event| count.set(count.get() + 1)
}

fn text(value: &str) -> Option<Property> {
    Some(Property::Text(value.to_owned()))
}

#[test]
fn given_a_controlled_input_should_restore_its_value_after_input() {
    let (mut root, host, container) = given_an_empty_root();
    let inputs = Rc::new(Cell::new(0));
    root.render(
        VNode::element("input")
            .prop("value", "a")
            .on("onInput", counting(&inputs)),
    )
    .unwrap();
    let input = first_child(&host, container);
    assert_eq!(host.property_of(input, "value"), text("a"));
    assert_eq!(host.listeners_of(input), ["input"]);

    host.poke_property(input, "value", Property::Text(String::from("ab")));
    root.dispatch_event(Event::new("input", input)).unwrap();

    assert_eq!(inputs.get(), 1);
    assert_eq!(host.property_of(input, "value"), text("a"));
}

#[test]
fn given_a_controlled_checkbox_should_report_changes_to_click_and_change_handlers() {
    let (mut root, host, container) = given_an_empty_root();
    let clicks = Rc::new(Cell::new(0));
    let changes = Rc::new(Cell::new(0));
    root.render(
        VNode::element("input")
            .prop("type", "checkbox")
            .prop("checked", false)
            .on("onClick", counting(&clicks))
            .on("onChange", counting(&changes)),
    )
    .unwrap();
    let checkbox = first_child(&host, container);
    assert_eq!(host.property_of(checkbox, "checked"), Some(Property::Bool(false)));

    host.poke_property(checkbox, "checked", Property::Bool(true));
    root.dispatch_event(Event::new("click", checkbox)).unwrap();
    root.dispatch_event(Event::new("change", checkbox)).unwrap();

    assert_eq!((clicks.get(), changes.get()), (1, 1));
    assert_eq!(host.property_of(checkbox, "checked"), Some(Property::Bool(false)));
}

#[test]
fn given_a_select_value_should_select_the_matching_option() {
    let (mut root, host, container) = given_an_empty_root();
    let select = |value: &str| {
        VNode::element("select").prop("value", value).children(
            ["a", "b"].map(|option| VNode::element("option").key(option).prop("value", option).child(option)),
        )
    };
    root.render(select("b")).unwrap();
    let options = host.children_of(first_child(&host, container));
    assert_eq!(host.property_of(options[0], "selected"), Some(Property::Bool(false)));
    assert_eq!(host.property_of(options[1], "selected"), Some(Property::Bool(true)));

    root.render(select("a")).unwrap();

    assert_eq!(host.property_of(options[0], "selected"), Some(Property::Bool(true)));
    assert_eq!(host.property_of(options[1], "selected"), Some(Property::Bool(false)));
}

#[test]
fn given_a_multiple_select_should_select_every_listed_option() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(
        VNode::element("select")
            .prop("multiple", true)
            .prop("value", vec![String::from("a"), String::from("c")])
            .children(
                ["a", "b", "c"].map(|option| VNode::element("option").key(option).prop("value", option)),
            ),
    )
    .unwrap();

    let select = first_child(&host, container);
    let selected: Vec<_> = host
        .children_of(select)
        .into_iter()
        .map(|option| host.property_of(option, "selected"))
        .collect();
    assert_eq!(host.property_of(select, "multiple"), Some(Property::Bool(true)));
    assert_eq!(
        selected,
        [
            Some(Property::Bool(true)),
            Some(Property::Bool(false)),
            Some(Property::Bool(true)),
        ]
    );
}

#[test]
fn given_a_textarea_default_value_should_only_apply_on_mount() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(VNode::element("textarea").prop("defaultValue", "hi")).unwrap();
    let textarea = first_child(&host, container);
    assert_eq!(host.property_of(textarea, "value"), text("hi"));

    root.render(VNode::element("textarea").prop("defaultValue", "changed"))
        .unwrap();

    assert_eq!(host.property_of(textarea, "value"), text("hi"));
}
