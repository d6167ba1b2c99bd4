//! Applying element props to host nodes.
//!
//! Every prop name falls into one policy: delegated event, node-level
//! listener, boolean property, live value property, raw markup, inline style
//! or plain attribute.

use indexmap::IndexMap;

use crate::arena::NodeId;
use crate::engine::Engine;
use crate::error::RenderError;
use crate::events::{delegated_type, listener_type};
use crate::forms;
use crate::host::{Host, Property};
use crate::mount::INNER_HTML;
use crate::vnode::{format_number, ElementFlavor, PropValue, Props, Style, StyleValue};

/// Props consumed by the reconciler itself.
const IGNORED: &[&str] = &[
    "children",
    "childrenType",
    "className",
    "defaultValue",
    "key",
    "multiple",
    "ref",
];

/// Props written as boolean host properties.
const BOOLEAN: &[&str] = &[
    "allowfullscreen",
    "autoplay",
    "capture",
    "checked",
    "controls",
    "default",
    "disabled",
    "hidden",
    "indeterminate",
    "loop",
    "muted",
    "novalidate",
    "open",
    "readOnly",
    "required",
    "reversed",
    "scoped",
    "seamless",
    "selected",
];

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Attributes set with a namespace inside SVG.
const NAMESPACED: &[(&str, &str)] = &[
    ("xlink:actuate", XLINK_NS),
    ("xlink:arcrole", XLINK_NS),
    ("xlink:href", XLINK_NS),
    ("xlink:role", XLINK_NS),
    ("xlink:show", XLINK_NS),
    ("xlink:title", XLINK_NS),
    ("xlink:type", XLINK_NS),
    ("xml:base", XML_NS),
    ("xml:lang", XML_NS),
    ("xml:space", XML_NS),
];

/// Style properties whose numeric values take no `px` suffix.
const UNITLESS: &[&str] = &[
    "animationIterationCount",
    "borderImageOutset",
    "borderImageSlice",
    "borderImageWidth",
    "boxFlex",
    "boxFlexGroup",
    "boxOrdinalGroup",
    "columnCount",
    "fillOpacity",
    "flex",
    "flexGrow",
    "flexNegative",
    "flexOrder",
    "flexPositive",
    "flexShrink",
    "floodOpacity",
    "fontWeight",
    "gridColumn",
    "gridRow",
    "lineClamp",
    "lineHeight",
    "opacity",
    "order",
    "orphans",
    "stopOpacity",
    "strokeDasharray",
    "strokeDashoffset",
    "strokeMiterlimit",
    "strokeOpacity",
    "strokeWidth",
    "tabSize",
    "widows",
    "zIndex",
    "zoom",
];

fn namespace_of(name: &str) -> Option<&'static str> {
    NAMESPACED
        .iter()
        .find(|(attribute, _)| *attribute == name)
        .map(|(_, namespace)| *namespace)
}

pub(crate) fn style_text(name: &str, value: &StyleValue) -> String {
    match value {
        StyleValue::Text(text) => text.clone(),
        StyleValue::Number(number) if UNITLESS.contains(&name) => format_number(*number),
        StyleValue::Number(number) => format!("{}px", format_number(*number)),
    }
}

fn html_of(value: &PropValue) -> &str {
    match value {
        PropValue::Html(html) => html,
        _ => "",
    }
}

impl<H: Host> Engine<H> {
    /// Apply the props of a freshly created element.
    pub(crate) fn mount_props(
        &mut self,
        id: NodeId,
        node: &H::Node,
        flavor: ElementFlavor,
        props: &Props,
        svg: bool,
    ) -> Result<(), RenderError> {
        let controlled = self.control_form(id, node, flavor, props);
        for (name, value) in props.iter() {
            self.patch_prop(id, node, name, None, value, svg, controlled)?;
        }
        if flavor.is_form() {
            self.apply_form_value(id, node, flavor, props, true);
        }
        Ok(())
    }

    /// Apply the difference between two prop sets. Props only present in
    /// `last` are cleared.
    pub(crate) fn patch_props(
        &mut self,
        id: NodeId,
        node: &H::Node,
        flavor: ElementFlavor,
        last: Option<&Props>,
        next: Option<&Props>,
        svg: bool,
    ) -> Result<(), RenderError> {
        let controlled = match next {
            Some(next) => self.control_form(id, node, flavor, next),
            None => false,
        };
        if let Some(next) = next {
            for (name, value) in next.iter() {
                let last_value = last.and_then(|last| last.get(name));
                if last_value != Some(value) {
                    self.patch_prop(id, node, name, last_value, value, svg, controlled)?;
                }
            }
        }
        if let Some(last) = last {
            for (name, value) in last.iter() {
                let kept = next.is_some_and(|next| next.contains(name));
                if !kept && !value.is_null() {
                    self.patch_prop(id, node, name, Some(value), &PropValue::Null, svg, controlled)?;
                }
            }
        }
        Ok(())
    }

    fn control_form(&mut self, id: NodeId, node: &H::Node, flavor: ElementFlavor, props: &Props) -> bool {
        if !flavor.is_form() || !forms::is_controlled(props) {
            return false;
        }
        let types = forms::listener_types(flavor, props);
        self.events.control(&mut self.host, node, id, types);
        true
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn patch_prop(
        &mut self,
        id: NodeId,
        node: &H::Node,
        name: &str,
        last: Option<&PropValue>,
        next: &PropValue,
        svg: bool,
        controlled: bool,
    ) -> Result<(), RenderError> {
        if let Some(event_type) = delegated_type(name) {
            match next {
                PropValue::Handler(handler) => {
                    self.events
                        .attach_delegated(&mut self.host, node, event_type, handler.clone());
                }
                PropValue::Null => self.events.detach_delegated(&mut self.host, node, event_type),
                _ => {
                    return Err(RenderError::InvalidEventProp {
                        name: name.to_owned(),
                    })
                }
            }
            return Ok(());
        }

        match name {
            _ if IGNORED.contains(&name) => {}
            "autoFocus" => {
                self.host
                    .set_property(node, "autofocus", Property::Bool(next.truthy()));
            }
            _ if BOOLEAN.contains(&name) => {
                self.host.set_property(node, name, Property::Bool(next.truthy()));
            }
            "defaultChecked" | "value" | "volume" => {
                if controlled && name == "value" {
                    return Ok(());
                }
                let value = match next {
                    PropValue::Bool(value) => Property::Bool(*value),
                    value => Property::Text(value.to_text()),
                };
                if self.host.property(node, name).as_ref() != Some(&value) {
                    self.host.set_property(node, name, value);
                }
            }
            INNER_HTML => {
                let last_html = last.map_or("", html_of);
                let next_html = html_of(next);
                if last_html != next_html && self.host.inner_html(node) != next_html {
                    let children = core::mem::take(&mut self.record_mut(id)?.children);
                    for child in children.ids() {
                        self.unmount(*child);
                    }
                    self.host.set_inner_html(node, next_html);
                }
            }
            _ if name.starts_with("on") => {
                let event_type = listener_type(name);
                if self.events.is_controlled(node, &event_type) {
                    return Ok(());
                }
                match next {
                    PropValue::Handler(handler) => {
                        self.events
                            .attach_direct(&mut self.host, node, event_type, handler.clone());
                    }
                    PropValue::Null => self.events.detach_direct(&mut self.host, node, &event_type),
                    _ => {
                        return Err(RenderError::InvalidEventProp {
                            name: name.to_owned(),
                        })
                    }
                }
            }
            _ if next.is_null() => self.host.remove_attribute(node, name),
            "style" => self.patch_style(node, last, next),
            _ => {
                let namespace = if svg { namespace_of(name) } else { None };
                self.host.set_attribute(node, name, &next.to_text(), namespace);
            }
        }
        Ok(())
    }

    fn patch_style(&mut self, node: &H::Node, last: Option<&PropValue>, next: &PropValue) {
        let next = match next {
            PropValue::Style(Style::Map(map)) => map,
            PropValue::Style(Style::Text(css)) | PropValue::Text(css) => {
                self.host.set_style_text(node, css);
                return;
            }
            other => {
                self.host.set_style_text(node, &other.to_text());
                return;
            }
        };
        let last: Option<&IndexMap<String, StyleValue>> = match last {
            Some(PropValue::Style(Style::Map(map))) => Some(map),
            _ => None,
        };

        match last {
            Some(last) => {
                for (name, value) in next {
                    if last.get(name) != Some(value) {
                        self.host.set_style(node, name, &style_text(name, value));
                    }
                }
                for name in last.keys() {
                    if !next.contains_key(name) {
                        self.host.set_style(node, name, "");
                    }
                }
            }
            None => {
                for (name, value) in next {
                    self.host.set_style(node, name, &style_text(name, value));
                }
            }
        }
    }
}
