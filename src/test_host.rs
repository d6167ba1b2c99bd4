//! In-memory host for tests.

use indexmap::IndexMap;
use portable_atomic_util::Arc;
use spin::Mutex;

use crate::host::{Host, HostNodeType, Namespace, Property};
use crate::vnode::is_void_tag;

/// Handle to a node of a [`TestHost`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestNode(usize);

/// One mutating call received by a [`TestHost`], in the order it was made.
#[derive(Clone, Debug, PartialEq)]
pub enum HostOp {
    CreateElement { node: TestNode, tag: String },
    CreateText { node: TestNode, text: String },
    AppendChild { parent: TestNode, child: TestNode },
    InsertBefore { parent: TestNode, child: TestNode, anchor: TestNode },
    ReplaceChild { parent: TestNode, new: TestNode, old: TestNode },
    RemoveChild { parent: TestNode, child: TestNode },
    ClearChildren { parent: TestNode },
    SetText { node: TestNode, text: String },
    SetAttribute { node: TestNode, name: String, value: String },
    RemoveAttribute { node: TestNode, name: String },
    SetProperty { node: TestNode, name: String, value: Property },
    SetStyle { node: TestNode, name: String, value: String },
    SetStyleText { node: TestNode, css: String },
    SetInnerHtml { node: TestNode, html: String },
    Listen { event_type: String },
    Unlisten { event_type: String },
    AddListener { node: TestNode, event_type: String },
    RemoveListener { node: TestNode, event_type: String },
}

impl HostOp {
    /// Whether the call changed the shape of the tree rather than a node.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            HostOp::AppendChild { .. }
                | HostOp::InsertBefore { .. }
                | HostOp::ReplaceChild { .. }
                | HostOp::RemoveChild { .. }
                | HostOp::ClearChildren { .. }
        )
    }
}

#[derive(Clone, Debug)]
enum NodeKind {
    Element { tag: String, namespace: Namespace },
    Text(String),
    Comment(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<usize>,
    children: Vec<usize>,
    attributes: IndexMap<String, String>,
    properties: IndexMap<String, Property>,
    styles: IndexMap<String, String>,
    style_text: Option<String>,
    listeners: Vec<String>,
    inner_html: Option<String>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: IndexMap::new(),
            properties: IndexMap::new(),
            styles: IndexMap::new(),
            style_text: None,
            listeners: Vec::new(),
            inner_html: None,
        }
    }
}

#[derive(Default)]
struct HostState {
    nodes: Vec<NodeData>,
    ops: Vec<HostOp>,
    listening: Vec<String>,
}

impl HostState {
    fn add(&mut self, kind: NodeKind) -> usize {
        self.nodes.push(NodeData::new(kind));
        self.nodes.len() - 1
    }

    fn detach(&mut self, child: usize) {
        if let Some(parent) = self.nodes[child].parent.take() {
            self.nodes[parent].children.retain(|&c| c != child);
        }
    }

    fn attach_at(&mut self, parent: usize, child: usize, index: Option<usize>) {
        self.detach(child);
        let siblings = &mut self.nodes[parent].children;
        match index {
            Some(index) if index <= siblings.len() => siblings.insert(index, child),
            _ => siblings.push(child),
        }
        self.nodes[parent].inner_html = None;
        self.nodes[child].parent = Some(parent);
    }

    fn index_of(&self, parent: usize, child: usize) -> Option<usize> {
        self.nodes[parent].children.iter().position(|&c| c == child)
    }

    fn markup(&self, node: usize, out: &mut String) {
        let data = &self.nodes[node];
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Element { tag, .. } => {
                out.push('<');
                out.push_str(tag);
                if let Some(Property::Text(class)) = data.properties.get("className") {
                    out.push_str(&format!(" class=\"{class}\""));
                }
                for (name, value) in &data.attributes {
                    if name == "class" && data.properties.contains_key("className") {
                        continue;
                    }
                    out.push_str(&format!(" {name}=\"{value}\""));
                }
                let style = match &data.style_text {
                    Some(css) => css.clone(),
                    None => data
                        .styles
                        .iter()
                        .filter(|(_, value)| !value.is_empty())
                        .map(|(name, value)| format!("{name}:{value};"))
                        .collect(),
                };
                if !style.is_empty() {
                    out.push_str(&format!(" style=\"{style}\""));
                }
                out.push('>');
                if is_void_tag(tag) && tag != "textarea" {
                    return;
                }
                self.inner(node, out);
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn inner(&self, node: usize, out: &mut String) {
        let data = &self.nodes[node];
        if let Some(html) = &data.inner_html {
            out.push_str(html);
            return;
        }
        for &child in &data.children {
            self.markup(child, out);
        }
    }
}

/// Host that keeps its tree in memory and records every mutating call.
///
/// Clones share the same tree, so a test keeps one clone for assertions and
/// hands the other to a [`Root`](crate::Root). Nodes are never freed; a
/// removed node simply loses its parent.
///
/// ```rust
/// use oxide_vdom::{HostOp, Root, TestHost, VNode};
///
/// let host = TestHost::new();
/// let container = host.create_container();
/// let mut root = Root::new(host.clone(), container);
///
/// root.render(VNode::element("div").prop("title", "a")).unwrap();
/// host.clear_ops();
/// root.render(VNode::element("div")).unwrap();
///
/// assert!(matches!(
///     host.ops().as_slice(),
///     [HostOp::RemoveAttribute { name, .. }] if name == "title"
/// ));
/// ```
#[derive(Clone)]
pub struct TestHost {
    state: Arc<Mutex<HostState>>,
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHost {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HostState::default())),
        }
    }

    /// A detached `div` to render into. Not recorded as an operation.
    pub fn create_container(&self) -> TestNode {
        let mut state = self.state.lock();
        TestNode(state.add(NodeKind::Element {
            tag: String::from("div"),
            namespace: Namespace::Html,
        }))
    }

    /// Build an element outside of any render, as server markup would be.
    /// Not recorded as an operation.
    pub fn build_element(&self, parent: TestNode, tag: &str, attributes: &[(&str, &str)]) -> TestNode {
        let mut state = self.state.lock();
        let node = state.add(NodeKind::Element {
            tag: tag.to_owned(),
            namespace: Namespace::Html,
        });
        for (name, value) in attributes {
            state.nodes[node]
                .attributes
                .insert((*name).to_owned(), (*value).to_owned());
        }
        state.attach_at(parent.0, node, None);
        TestNode(node)
    }

    /// Build a text node under `parent`. Not recorded as an operation.
    pub fn build_text(&self, parent: TestNode, text: &str) -> TestNode {
        let mut state = self.state.lock();
        let node = state.add(NodeKind::Text(text.to_owned()));
        state.attach_at(parent.0, node, None);
        TestNode(node)
    }

    /// Build a comment node under `parent`. Not recorded as an operation.
    pub fn build_comment(&self, parent: TestNode, text: &str) -> TestNode {
        let mut state = self.state.lock();
        let node = state.add(NodeKind::Comment(text.to_owned()));
        state.attach_at(parent.0, node, None);
        TestNode(node)
    }

    /// Every mutating call since creation or the last [`clear_ops`](Self::clear_ops).
    pub fn ops(&self) -> Vec<HostOp> {
        self.state.lock().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.state.lock().ops.clear();
    }

    /// Markup of the children of `node`.
    pub fn html(&self, node: TestNode) -> String {
        let state = self.state.lock();
        let mut out = String::new();
        state.inner(node.0, &mut out);
        out
    }

    /// Markup of `node` itself.
    pub fn outer_html(&self, node: TestNode) -> String {
        let state = self.state.lock();
        let mut out = String::new();
        state.markup(node.0, &mut out);
        out
    }

    pub fn children_of(&self, node: TestNode) -> Vec<TestNode> {
        self.state.lock().nodes[node.0]
            .children
            .iter()
            .map(|&child| TestNode(child))
            .collect()
    }

    /// Namespace an element was created in; `None` for text and comments.
    pub fn namespace_of(&self, node: TestNode) -> Option<Namespace> {
        match &self.state.lock().nodes[node.0].kind {
            NodeKind::Element { namespace, .. } => Some(*namespace),
            NodeKind::Text(_) | NodeKind::Comment(_) => None,
        }
    }

    pub fn parent_of(&self, node: TestNode) -> Option<TestNode> {
        self.state.lock().nodes[node.0].parent.map(TestNode)
    }

    pub fn attribute_of(&self, node: TestNode, name: &str) -> Option<String> {
        self.state.lock().nodes[node.0].attributes.get(name).cloned()
    }

    pub fn property_of(&self, node: TestNode, name: &str) -> Option<Property> {
        self.state.lock().nodes[node.0].properties.get(name).cloned()
    }

    /// Set a live property directly, the way user input would.
    pub fn poke_property(&self, node: TestNode, name: &str, value: Property) {
        self.state.lock().nodes[node.0]
            .properties
            .insert(name.to_owned(), value);
    }

    pub fn style_of(&self, node: TestNode, name: &str) -> Option<String> {
        self.state.lock().nodes[node.0]
            .styles
            .get(name)
            .filter(|value| !value.is_empty())
            .cloned()
    }

    /// Node-level listeners attached to `node`.
    pub fn listeners_of(&self, node: TestNode) -> Vec<String> {
        self.state.lock().nodes[node.0].listeners.clone()
    }

    /// Whether a document-level listener is installed for `event_type`.
    pub fn is_listening(&self, event_type: &str) -> bool {
        self.state
            .lock()
            .listening
            .iter()
            .any(|listening| listening == event_type)
    }
}

impl Host for TestHost {
    type Node = TestNode;

    fn create_element(&mut self, tag: &str, namespace: Namespace) -> TestNode {
        let mut state = self.state.lock();
        let node = TestNode(state.add(NodeKind::Element {
            tag: tag.to_owned(),
            namespace,
        }));
        state.ops.push(HostOp::CreateElement {
            node,
            tag: tag.to_owned(),
        });
        node
    }

    fn create_text(&mut self, text: &str) -> TestNode {
        let mut state = self.state.lock();
        let node = TestNode(state.add(NodeKind::Text(text.to_owned())));
        state.ops.push(HostOp::CreateText {
            node,
            text: text.to_owned(),
        });
        node
    }

    fn append_child(&mut self, parent: &TestNode, child: &TestNode) {
        let mut state = self.state.lock();
        state.attach_at(parent.0, child.0, None);
        state.ops.push(HostOp::AppendChild {
            parent: *parent,
            child: *child,
        });
    }

    fn insert_before(&mut self, parent: &TestNode, child: &TestNode, anchor: &TestNode) {
        let mut state = self.state.lock();
        state.detach(child.0);
        let index = state.index_of(parent.0, anchor.0);
        state.attach_at(parent.0, child.0, index);
        state.ops.push(HostOp::InsertBefore {
            parent: *parent,
            child: *child,
            anchor: *anchor,
        });
    }

    fn replace_child(&mut self, parent: &TestNode, new: &TestNode, old: &TestNode) {
        let mut state = self.state.lock();
        state.detach(new.0);
        let index = state.index_of(parent.0, old.0);
        state.detach(old.0);
        state.attach_at(parent.0, new.0, index);
        state.ops.push(HostOp::ReplaceChild {
            parent: *parent,
            new: *new,
            old: *old,
        });
    }

    fn remove_child(&mut self, parent: &TestNode, child: &TestNode) {
        let mut state = self.state.lock();
        if state.nodes[child.0].parent == Some(parent.0) {
            state.detach(child.0);
        }
        state.ops.push(HostOp::RemoveChild {
            parent: *parent,
            child: *child,
        });
    }

    fn clear_children(&mut self, parent: &TestNode) {
        let mut state = self.state.lock();
        let children = core::mem::take(&mut state.nodes[parent.0].children);
        for child in children {
            state.nodes[child].parent = None;
        }
        state.nodes[parent.0].inner_html = None;
        state.ops.push(HostOp::ClearChildren { parent: *parent });
    }

    fn set_text(&mut self, node: &TestNode, text: &str) {
        let mut state = self.state.lock();
        match &mut state.nodes[node.0].kind {
            NodeKind::Text(current) | NodeKind::Comment(current) => *current = text.to_owned(),
            NodeKind::Element { .. } => {}
        }
        state.ops.push(HostOp::SetText {
            node: *node,
            text: text.to_owned(),
        });
    }

    fn set_attribute(&mut self, node: &TestNode, name: &str, value: &str, _namespace: Option<&'static str>) {
        let mut state = self.state.lock();
        state.nodes[node.0]
            .attributes
            .insert(name.to_owned(), value.to_owned());
        state.ops.push(HostOp::SetAttribute {
            node: *node,
            name: name.to_owned(),
            value: value.to_owned(),
        });
    }

    fn remove_attribute(&mut self, node: &TestNode, name: &str) {
        let mut state = self.state.lock();
        let data = &mut state.nodes[node.0];
        data.attributes.shift_remove(name);
        if name == "class" {
            data.properties.shift_remove("className");
        }
        state.ops.push(HostOp::RemoveAttribute {
            node: *node,
            name: name.to_owned(),
        });
    }

    fn set_property(&mut self, node: &TestNode, name: &str, value: Property) {
        let mut state = self.state.lock();
        state.nodes[node.0]
            .properties
            .insert(name.to_owned(), value.clone());
        state.ops.push(HostOp::SetProperty {
            node: *node,
            name: name.to_owned(),
            value,
        });
    }

    fn set_style(&mut self, node: &TestNode, name: &str, value: &str) {
        let mut state = self.state.lock();
        let data = &mut state.nodes[node.0];
        data.style_text = None;
        data.styles.insert(name.to_owned(), value.to_owned());
        state.ops.push(HostOp::SetStyle {
            node: *node,
            name: name.to_owned(),
            value: value.to_owned(),
        });
    }

    fn set_style_text(&mut self, node: &TestNode, css: &str) {
        let mut state = self.state.lock();
        let data = &mut state.nodes[node.0];
        data.styles.clear();
        data.style_text = Some(css.to_owned());
        state.ops.push(HostOp::SetStyleText {
            node: *node,
            css: css.to_owned(),
        });
    }

    fn set_inner_html(&mut self, node: &TestNode, html: &str) {
        let mut state = self.state.lock();
        let children = core::mem::take(&mut state.nodes[node.0].children);
        for child in children {
            state.nodes[child].parent = None;
        }
        state.nodes[node.0].inner_html = Some(html.to_owned());
        state.ops.push(HostOp::SetInnerHtml {
            node: *node,
            html: html.to_owned(),
        });
    }

    fn listen(&mut self, event_type: &str) {
        let mut state = self.state.lock();
        state.listening.push(event_type.to_owned());
        state.ops.push(HostOp::Listen {
            event_type: event_type.to_owned(),
        });
    }

    fn unlisten(&mut self, event_type: &str) {
        let mut state = self.state.lock();
        state.listening.retain(|listening| listening != event_type);
        state.ops.push(HostOp::Unlisten {
            event_type: event_type.to_owned(),
        });
    }

    fn add_listener(&mut self, node: &TestNode, event_type: &str) {
        let mut state = self.state.lock();
        state.nodes[node.0].listeners.push(event_type.to_owned());
        state.ops.push(HostOp::AddListener {
            node: *node,
            event_type: event_type.to_owned(),
        });
    }

    fn remove_listener(&mut self, node: &TestNode, event_type: &str) {
        let mut state = self.state.lock();
        state.nodes[node.0]
            .listeners
            .retain(|listener| listener != event_type);
        state.ops.push(HostOp::RemoveListener {
            node: *node,
            event_type: event_type.to_owned(),
        });
    }

    fn parent(&self, node: &TestNode) -> Option<TestNode> {
        self.parent_of(*node)
    }

    fn first_child(&self, node: &TestNode) -> Option<TestNode> {
        self.state.lock().nodes[node.0]
            .children
            .first()
            .map(|&child| TestNode(child))
    }

    fn next_sibling(&self, node: &TestNode) -> Option<TestNode> {
        let state = self.state.lock();
        let parent = state.nodes[node.0].parent?;
        let index = state.index_of(parent, node.0)?;
        state.nodes[parent]
            .children
            .get(index + 1)
            .map(|&sibling| TestNode(sibling))
    }

    fn node_type(&self, node: &TestNode) -> HostNodeType {
        match &self.state.lock().nodes[node.0].kind {
            NodeKind::Element { tag, .. } => HostNodeType::Element(tag.clone()),
            NodeKind::Text(_) => HostNodeType::Text,
            NodeKind::Comment(_) => HostNodeType::Comment,
        }
    }

    fn text(&self, node: &TestNode) -> Option<String> {
        match &self.state.lock().nodes[node.0].kind {
            NodeKind::Text(text) | NodeKind::Comment(text) => Some(text.clone()),
            NodeKind::Element { .. } => None,
        }
    }

    fn attribute(&self, node: &TestNode, name: &str) -> Option<String> {
        self.attribute_of(*node, name)
    }

    fn property(&self, node: &TestNode, name: &str) -> Option<Property> {
        self.property_of(*node, name)
    }

    fn inner_html(&self, node: &TestNode) -> String {
        self.html(*node)
    }
}
