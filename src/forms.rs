//! Controlled form elements.
//!
//! An `input`, `select` or `textarea` whose value (or `checked` state, for
//! checkboxes and radios) is given by props is controlled: the reconciler
//! owns its native listeners, forwards them to the matching prop handlers
//! and writes the props back into the host once the handlers have run, so
//! the host never drifts from what was last rendered.

use crate::arena::NodeId;
use crate::engine::Engine;
use crate::host::{Host, Property};
use crate::vnode::{ElementFlavor, NodeType, PropValue, Props};

fn is_checked_type(props: &Props) -> bool {
    matches!(
        props.value("type").and_then(PropValue::as_str),
        Some("checkbox" | "radio")
    )
}

pub(crate) fn is_controlled(props: &Props) -> bool {
    if is_checked_type(props) {
        props.value("checked").is_some()
    } else {
        props.value("value").is_some()
    }
}

/// Native event types the reconciler listens for on a controlled element.
pub(crate) fn listener_types(flavor: ElementFlavor, props: &Props) -> &'static [&'static str] {
    match flavor {
        ElementFlavor::Input if is_checked_type(props) => &["change", "click"],
        ElementFlavor::Input => &["input"],
        ElementFlavor::Select => &["change"],
        ElementFlavor::Textarea if props.value("onChange").is_some() => &["input", "change"],
        ElementFlavor::Textarea => &["input"],
        ElementFlavor::Html | ElementFlavor::Svg => &[],
    }
}

/// Prop handlers a controlled element forwards a native event to.
///
/// A checkbox reports both `onClick` and `onChange` from its `change`
/// event; its native `click` only stops propagation.
pub(crate) fn forwarded_props(
    flavor: ElementFlavor,
    props: &Props,
    event_type: &str,
) -> &'static [&'static str] {
    match (flavor, event_type) {
        (ElementFlavor::Input, "change") if is_checked_type(props) => &["onClick", "onChange"],
        (ElementFlavor::Input, "input") if !is_checked_type(props) => &["onInput"],
        (ElementFlavor::Select, "change") => &["onChange"],
        (ElementFlavor::Textarea, "input") => &["onInput"],
        (ElementFlavor::Textarea, "change") => &["onChange"],
        _ => &[],
    }
}

fn text(value: &PropValue) -> Property {
    Property::Text(value.to_text())
}

impl<H: Host> Engine<H> {
    /// Write value-like props into a form element, comparing against the
    /// live host state first.
    pub(crate) fn apply_form_value(
        &mut self,
        id: NodeId,
        node: &H::Node,
        flavor: ElementFlavor,
        props: &Props,
        mounting: bool,
    ) {
        match flavor {
            ElementFlavor::Input => self.apply_input(node, props),
            ElementFlavor::Select => self.apply_select(id, node, props, mounting),
            ElementFlavor::Textarea => self.apply_textarea(node, props, mounting),
            ElementFlavor::Html | ElementFlavor::Svg => {}
        }
    }

    fn apply_input(&mut self, node: &H::Node, props: &Props) {
        let value = props.value("value");
        let checked = props.value("checked");

        if let Some(input_type) = props.value("type").map(PropValue::to_text) {
            if self.host.attribute(node, "type").as_deref() != Some(input_type.as_str()) {
                self.host.set_attribute(node, "type", &input_type, None);
            }
        }
        self.apply_multiple(node, props);
        if let (Some(default), None) = (props.value("defaultValue"), value) {
            self.update_property(node, "defaultValue", text(default));
        }

        if is_checked_type(props) {
            if let Some(value) = value {
                self.update_property(node, "value", text(value));
            }
            if let Some(checked) = checked {
                self.update_property(node, "checked", Property::Bool(checked.truthy()));
            }
        } else if let Some(value) = value.filter(|value| self.host.property(node, "value") != Some(text(value))) {
            self.host.set_property(node, "defaultValue", text(value));
            self.host.set_property(node, "value", text(value));
        } else if let Some(checked) = checked {
            self.update_property(node, "checked", Property::Bool(checked.truthy()));
        }
    }

    /// Write a live property unless the host already holds that value.
    fn update_property(&mut self, node: &H::Node, name: &str, value: Property) {
        if self.host.property(node, name).as_ref() != Some(&value) {
            self.host.set_property(node, name, value);
        }
    }

    fn apply_multiple(&mut self, node: &H::Node, props: &Props) {
        if let Some(multiple) = props.value("multiple") {
            self.update_property(node, "multiple", Property::Bool(multiple.truthy()));
        }
    }

    fn apply_select(&mut self, id: NodeId, node: &H::Node, props: &Props, mounting: bool) {
        self.apply_multiple(node, props);
        let mut value = props.value("value");
        if mounting && value.is_none() {
            value = props.value("defaultValue");
        }
        let value = value.cloned();
        let children = match self.nodes.get(id) {
            Some(record) => record.children.ids().to_vec(),
            None => return,
        };
        for child in children {
            self.update_option_group(child, value.as_ref());
        }
    }

    fn update_option_group(&mut self, id: NodeId, value: Option<&PropValue>) {
        let Some(record) = self.nodes.get(id) else {
            return;
        };
        match &record.vnode.ty {
            NodeType::Element { tag, .. } if &**tag == "optgroup" => {
                let options = record.children.ids().to_vec();
                for option in options {
                    self.update_option(option, value);
                }
            }
            _ => self.update_option(id, value),
        }
    }

    fn update_option(&mut self, id: NodeId, value: Option<&PropValue>) {
        let Some(record) = self.nodes.get(id) else {
            return;
        };
        let (Some(node), Some(props)) = (record.host.clone(), record.vnode.props.clone()) else {
            return;
        };
        let option_value = props.value("value");
        if let Some(option_value) = option_value {
            self.update_property(&node, "value", text(option_value));
        }

        let matches = match (value, option_value) {
            (Some(PropValue::Values(values)), Some(option_value)) => {
                values.contains(&option_value.to_text())
            }
            (Some(value), Some(option_value)) => value.to_text() == option_value.to_text(),
            _ => false,
        };
        let selected = props.value("selected");
        if matches {
            self.update_property(&node, "selected", Property::Bool(true));
        } else if value.is_some() || selected.is_some() {
            let selected = selected.is_some_and(PropValue::truthy);
            self.update_property(&node, "selected", Property::Bool(selected));
        }
    }

    fn apply_textarea(&mut self, node: &H::Node, props: &Props, mounting: bool) {
        let current = self.host.property(node, "value");
        match props.value("value") {
            None => {
                if !mounting {
                    return;
                }
                if let Some(default) = props.value("defaultValue") {
                    if current != Some(text(default)) {
                        self.host.set_property(node, "defaultValue", text(default));
                        self.host.set_property(node, "value", text(default));
                    }
                }
            }
            Some(value) => {
                if current != Some(text(value)) {
                    self.host.set_property(node, "defaultValue", text(value));
                    self.host.set_property(node, "value", text(value));
                }
            }
        }
    }

    /// Restore a controlled element to its current props after its
    /// handlers ran.
    pub(crate) fn reapply_form(&mut self, owner: NodeId) {
        let Some(record) = self.nodes.get(owner) else {
            return;
        };
        let NodeType::Element { flavor, .. } = &record.vnode.ty else {
            return;
        };
        let flavor = *flavor;
        let (Some(node), Some(props)) = (record.host.clone(), record.vnode.props.clone()) else {
            return;
        };
        tracing::trace!(?owner, "re-applying controlled value");
        self.apply_form_value(owner, &node, flavor, &props, false);
    }
}
