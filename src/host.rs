//! Host-tree abstraction the reconciler renders into.

use core::fmt::Debug;
use core::hash::Hash;

/// Namespace an element is created in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    Html,
    Svg,
}

impl Namespace {
    /// The namespace URI.
    pub fn uri(self) -> &'static str {
        match self {
            Namespace::Html => "http://www.w3.org/1999/xhtml",
            Namespace::Svg => "http://www.w3.org/2000/svg",
        }
    }
}

/// Category of an existing host node, as seen by hydration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostNodeType {
    Element(String),
    Text,
    Comment,
}

/// Value of a live host property such as `checked` or `value`.
#[derive(Clone, Debug, PartialEq)]
pub enum Property {
    Bool(bool),
    Text(String),
}

impl Property {
    pub fn as_bool(&self) -> bool {
        match self {
            Property::Bool(value) => *value,
            Property::Text(text) => !text.is_empty(),
        }
    }
}

/// Host-tree abstraction.
///
/// Implement this trait to integrate oxide-vdom with your rendering target
/// (a browser document, a native widget tree, a terminal buffer, etc.).
///
/// The reconciler only ever talks to the target through these primitives. The
/// mutating methods are what a patch is made of; the read methods let the
/// reconciler compare against live state (hydration, controlled form values)
/// without writing.
///
/// # Example
///
/// ```rust
/// use oxide_vdom::{Host, HostNodeType, Namespace, Property};
///
/// #[derive(Default)]
/// struct CountingHost {
///     created: usize,
/// }
///
/// impl Host for CountingHost {
///     type Node = usize;
///
///     fn create_element(&mut self, _tag: &str, _namespace: Namespace) -> usize {
///         self.created += 1;
///         self.created
///     }
///     fn create_text(&mut self, _text: &str) -> usize {
///         self.created += 1;
///         self.created
///     }
///     fn append_child(&mut self, _parent: &usize, _child: &usize) {}
///     fn insert_before(&mut self, _parent: &usize, _child: &usize, _anchor: &usize) {}
///     fn replace_child(&mut self, _parent: &usize, _new: &usize, _old: &usize) {}
///     fn remove_child(&mut self, _parent: &usize, _child: &usize) {}
///     fn clear_children(&mut self, _parent: &usize) {}
///     fn set_text(&mut self, _node: &usize, _text: &str) {}
///     fn set_attribute(&mut self, _node: &usize, _name: &str, _value: &str, _ns: Option<&'static str>) {}
///     fn remove_attribute(&mut self, _node: &usize, _name: &str) {}
///     fn set_property(&mut self, _node: &usize, _name: &str, _value: Property) {}
///     fn set_style(&mut self, _node: &usize, _name: &str, _value: &str) {}
///     fn set_style_text(&mut self, _node: &usize, _css: &str) {}
///     fn set_inner_html(&mut self, _node: &usize, _html: &str) {}
///     fn listen(&mut self, _event_type: &str) {}
///     fn unlisten(&mut self, _event_type: &str) {}
///     fn add_listener(&mut self, _node: &usize, _event_type: &str) {}
///     fn remove_listener(&mut self, _node: &usize, _event_type: &str) {}
///     fn parent(&self, _node: &usize) -> Option<usize> { None }
///     fn first_child(&self, _node: &usize) -> Option<usize> { None }
///     fn next_sibling(&self, _node: &usize) -> Option<usize> { None }
///     fn node_type(&self, _node: &usize) -> HostNodeType { HostNodeType::Text }
///     fn text(&self, _node: &usize) -> Option<String> { None }
///     fn attribute(&self, _node: &usize, _name: &str) -> Option<String> { None }
///     fn property(&self, _node: &usize, _name: &str) -> Option<Property> { None }
///     fn inner_html(&self, _node: &usize) -> String { String::new() }
/// }
/// ```
pub trait Host {
    /// Handle to a host node. Handles are compared and hashed to key the
    /// event registry, so two handles to the same node must be equal.
    type Node: Clone + Eq + Hash + Debug + 'static;

    fn create_element(&mut self, tag: &str, namespace: Namespace) -> Self::Node;
    fn create_text(&mut self, text: &str) -> Self::Node;

    /// Append `child` as the last child of `parent`, moving it if it is
    /// already attached somewhere.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);
    /// Insert `child` before `anchor`, moving it if it is already attached.
    fn insert_before(&mut self, parent: &Self::Node, child: &Self::Node, anchor: &Self::Node);
    fn replace_child(&mut self, parent: &Self::Node, new: &Self::Node, old: &Self::Node);
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);
    /// Detach every child of `parent` in one step.
    fn clear_children(&mut self, parent: &Self::Node);
    fn set_text(&mut self, node: &Self::Node, text: &str);

    /// Set an attribute, in `namespace` when one is given.
    fn set_attribute(
        &mut self,
        node: &Self::Node,
        name: &str,
        value: &str,
        namespace: Option<&'static str>,
    );
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);
    /// Set a live property (`checked`, `value`, `className`, ...).
    fn set_property(&mut self, node: &Self::Node, name: &str, value: Property);
    fn set_style(&mut self, node: &Self::Node, name: &str, value: &str);
    fn set_style_text(&mut self, node: &Self::Node, css: &str);
    /// Replace the content of `node` with raw markup.
    fn set_inner_html(&mut self, node: &Self::Node, html: &str);

    /// Install the single document-level listener for a delegated event type.
    fn listen(&mut self, event_type: &str);
    /// Remove the document-level listener for a delegated event type.
    fn unlisten(&mut self, event_type: &str);
    /// Attach a node-level listener for an event type that does not bubble
    /// through delegation.
    fn add_listener(&mut self, node: &Self::Node, event_type: &str);
    fn remove_listener(&mut self, node: &Self::Node, event_type: &str);

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
    fn node_type(&self, node: &Self::Node) -> HostNodeType;
    /// Text content of a text or comment node.
    fn text(&self, node: &Self::Node) -> Option<String>;
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn property(&self, node: &Self::Node, name: &str) -> Option<Property>;
    fn inner_html(&self, node: &Self::Node) -> String;

    /// Concatenated text of every text node below `node`.
    fn text_content(&self, node: &Self::Node) -> String {
        let mut content = String::new();
        let mut child = self.first_child(node);
        while let Some(current) = child {
            match self.node_type(&current) {
                HostNodeType::Text => content.push_str(&self.text(&current).unwrap_or_default()),
                HostNodeType::Element(_) => content.push_str(&self.text_content(&current)),
                HostNodeType::Comment => {}
            }
            child = self.next_sibling(&current);
        }
        content
    }

    /// Replace the content of `node` with a single text node, or with
    /// nothing when `text` is empty.
    fn set_text_content(&mut self, node: &Self::Node, text: &str) {
        self.clear_children(node);
        if !text.is_empty() {
            let child = self.create_text(text);
            self.append_child(node, &child);
        }
    }

    /// Insert before `anchor` when there is one, otherwise append.
    fn insert_or_append(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        anchor: Option<&Self::Node>,
    ) {
        match anchor {
            Some(anchor) => self.insert_before(parent, child, anchor),
            None => self.append_child(parent, child),
        }
    }
}
