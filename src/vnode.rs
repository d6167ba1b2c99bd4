//! Virtual node model.

use core::any::Any;
use core::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::component::{ClassType, Component, Context, ErasedHooks, FunctionHooks, FunctionType, Render};
use crate::events::{Event, Handler};
use crate::normalize::{self, Child};

/// Element tags that can never have children.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr", "textarea",
];

pub(crate) fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Formats a number the way a script host prints it: integers lose the
/// trailing `.0`.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Element specialisation, fixed at construction from the tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementFlavor {
    Html,
    Svg,
    Input,
    Select,
    Textarea,
}

impl ElementFlavor {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "svg" => ElementFlavor::Svg,
            "input" => ElementFlavor::Input,
            "select" => ElementFlavor::Select,
            "textarea" => ElementFlavor::Textarea,
            _ => ElementFlavor::Html,
        }
    }

    pub(crate) fn is_form(self) -> bool {
        matches!(
            self,
            ElementFlavor::Input | ElementFlavor::Select | ElementFlavor::Textarea
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentFlavor {
    Class,
    Function,
}

/// What a [`VNode`] describes. Exactly one variant applies and it never
/// changes after construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Element(ElementFlavor),
    Component(ComponentFlavor),
    Text,
    Void,
    Portal,
}

/// Identity of a child among keyed siblings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(KeyRepr);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum KeyRepr {
    Str(Rc<str>),
    Int(i64),
    Synthetic(Rc<str>),
}

/// Prefix reserved for keys derived from a child's position.
pub(crate) const SYNTHETIC_PREFIX: char = '$';

impl Key {
    pub(crate) fn synthetic(path: String) -> Self {
        Key(KeyRepr::Synthetic(path.into()))
    }

    pub(crate) fn is_synthetic(&self) -> bool {
        matches!(self.0, KeyRepr::Synthetic(_))
    }

    /// User keys may not claim the synthetic prefix.
    pub(crate) fn is_reserved(&self) -> bool {
        matches!(&self.0, KeyRepr::Str(s) if s.starts_with(SYNTHETIC_PREFIX))
    }

    /// Scope a user key under the path of the nested list it came from.
    pub(crate) fn scoped(&self, path: &str) -> Self {
        if path.is_empty() {
            return self.clone();
        }
        Key(KeyRepr::Str(format!("{path}{self}").into()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            KeyRepr::Str(s) | KeyRepr::Synthetic(s) => f.write_str(s),
            KeyRepr::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key(KeyRepr::Str(value.into()))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key(KeyRepr::Str(value.into()))
    }
}

macro_rules! int_key {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Key {
            fn from(value: $ty) -> Self {
                Key(KeyRepr::Int(value as i64))
            }
        })*
    };
}

int_key!(i32, i64, u32, u64, usize);

/// Inline style, either precomputed text or a property map.
#[derive(Clone, Debug, PartialEq)]
pub enum Style {
    Text(String),
    Map(IndexMap<String, StyleValue>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum StyleValue {
    Text(String),
    Number(f64),
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Text(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Text(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Number(value.into())
    }
}

impl Style {
    pub fn text(css: impl Into<String>) -> Self {
        Style::Text(css.into())
    }

    pub fn map() -> Self {
        Style::Map(IndexMap::new())
    }

    /// Add a property, turning a text style into a map.
    pub fn set(self, name: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        let mut map = match self {
            Style::Map(map) => map,
            Style::Text(_) => IndexMap::new(),
        };
        map.insert(name.into(), value.into());
        Style::Map(map)
    }
}

/// Value of a single element prop.
#[derive(Clone)]
pub enum PropValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// A list of values, used by `<select multiple>`.
    Values(Vec<String>),
    Style(Style),
    /// Raw markup for `dangerouslySetInnerHTML`.
    Html(String),
    Handler(Handler),
}

impl PropValue {
    pub fn html(markup: impl Into<String>) -> Self {
        PropValue::Html(markup.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }

    /// Coercion used for boolean properties.
    pub(crate) fn truthy(&self) -> bool {
        match self {
            PropValue::Null => false,
            PropValue::Bool(value) => *value,
            PropValue::Number(value) => *value != 0.0 && !value.is_nan(),
            PropValue::Text(text) => !text.is_empty(),
            _ => true,
        }
    }

    /// Text written when the value is applied as an attribute.
    pub(crate) fn to_text(&self) -> String {
        match self {
            PropValue::Null => String::new(),
            PropValue::Bool(value) => value.to_string(),
            PropValue::Number(value) => format_number(*value),
            PropValue::Text(text) | PropValue::Html(text) => text.clone(),
            PropValue::Values(values) => values.join(","),
            PropValue::Style(Style::Text(css)) => css.clone(),
            PropValue::Style(Style::Map(_)) => String::from("[style]"),
            PropValue::Handler(_) => String::from("[handler]"),
        }
    }

    pub(crate) fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Null, PropValue::Null) => true,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Number(a), PropValue::Number(b)) => a == b,
            (PropValue::Text(a), PropValue::Text(b)) => a == b,
            (PropValue::Values(a), PropValue::Values(b)) => a == b,
            (PropValue::Style(a), PropValue::Style(b)) => a == b,
            (PropValue::Html(a), PropValue::Html(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => a.same(b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Null => f.write_str("Null"),
            PropValue::Bool(value) => write!(f, "Bool({value})"),
            PropValue::Number(value) => write!(f, "Number({value})"),
            PropValue::Text(text) => write!(f, "Text({text:?})"),
            PropValue::Values(values) => write!(f, "Values({values:?})"),
            PropValue::Style(style) => write!(f, "Style({style:?})"),
            PropValue::Html(markup) => write!(f, "Html({markup:?})"),
            PropValue::Handler(_) => f.write_str("Handler"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Number(value.into())
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Number(value as f64)
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        PropValue::Number(value.into())
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        PropValue::Number(value as f64)
    }
}

impl From<Vec<String>> for PropValue {
    fn from(value: Vec<String>) -> Self {
        PropValue::Values(value)
    }
}

impl From<Style> for PropValue {
    fn from(value: Style) -> Self {
        PropValue::Style(value)
    }
}

impl From<Handler> for PropValue {
    fn from(value: Handler) -> Self {
        PropValue::Handler(value)
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropValue::Null, Into::into)
    }
}

/// Ordered element props.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props(IndexMap<String, PropValue>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0.get(name)
    }

    /// The value of `name`, treating an explicit null as absent.
    pub fn value(&self, name: &str) -> Option<&PropValue> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Props(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Canonical children of a node. The variant is tracked explicitly because
/// the diff dispatches on it.
#[derive(Clone, Debug, Default)]
pub enum Children {
    #[default]
    Invalid,
    Single(Box<VNode>),
    Unkeyed(Vec<VNode>),
    Keyed(Vec<VNode>),
}

impl Children {
    pub fn len(&self) -> usize {
        match self {
            Children::Invalid => 0,
            Children::Single(_) => 1,
            Children::Unkeyed(list) | Children::Keyed(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) type RefCallback = Rc<dyn Fn(Option<&dyn Any>)>;

/// Observer attached to a node's `ref` slot.
#[derive(Clone)]
pub(crate) enum Ref {
    Callback(RefCallback),
    Hooks(Rc<ErasedHooks>),
}

impl Ref {
    pub(crate) fn same(&self, other: &Ref) -> bool {
        match (self, other) {
            (Ref::Callback(a), Ref::Callback(b)) => core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            (Ref::Hooks(a), Ref::Hooks(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn callback(&self) -> Option<&RefCallback> {
        match self {
            Ref::Callback(callback) => Some(callback),
            Ref::Hooks(_) => None,
        }
    }

    pub(crate) fn hooks(&self) -> Option<&Rc<ErasedHooks>> {
        match self {
            Ref::Hooks(hooks) => Some(hooks),
            Ref::Callback(_) => None,
        }
    }
}

#[derive(Clone)]
pub(crate) enum NodeType {
    Element { tag: Rc<str>, flavor: ElementFlavor },
    Class { ty: ClassType, props: Rc<dyn Any> },
    Function { ty: FunctionType, props: Rc<dyn Any> },
    Text(Rc<str>),
    Void,
    Portal(Rc<dyn Any>),
}

/// Description of one position in the rendered tree.
///
/// Virtual nodes are plain values: building, cloning and reusing them never
/// touches the host. Everything the reconciler learns while mounting a node
/// lives in its own side table, so the same `VNode` can be rendered into
/// several places or several roots.
///
/// ```rust
/// use oxide_vdom::{Kind, VNode};
///
/// let list = VNode::element("ul")
///     .class("todo")
///     .children(["a", "b"].map(|key| VNode::element("li").key(key).child(key)));
///
/// assert_eq!(list.kind(), Kind::Element(oxide_vdom::ElementFlavor::Html));
/// assert_eq!(list.child_nodes().len(), 2);
/// ```
#[derive(Clone)]
pub struct VNode {
    pub(crate) ty: NodeType,
    pub(crate) props: Option<Props>,
    pub(crate) class_name: Option<String>,
    pub(crate) children: Children,
    pub(crate) key: Option<Key>,
    pub(crate) node_ref: Option<Ref>,
    pub(crate) recreate: bool,
    pub(crate) content_editable: bool,
}

impl VNode {
    fn with_type(ty: NodeType) -> Self {
        Self {
            ty,
            props: None,
            class_name: None,
            children: Children::Invalid,
            key: None,
            node_ref: None,
            recreate: false,
            content_editable: false,
        }
    }

    pub fn element(tag: impl Into<String>) -> Self {
        let tag: String = tag.into();
        let flavor = ElementFlavor::from_tag(&tag);
        Self::with_type(NodeType::Element {
            tag: tag.into(),
            flavor,
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::with_type(NodeType::Text(text.into().into()))
    }

    /// A placeholder that renders as an empty text node.
    pub fn void() -> Self {
        Self::with_type(NodeType::Void)
    }

    /// Render `child` into `container` instead of the logical parent. The
    /// portal itself occupies one empty placeholder in its parent.
    pub fn portal<N: Any>(container: N, child: VNode) -> Self {
        let mut node = Self::with_type(NodeType::Portal(Rc::new(container)));
        node.children = Children::Single(Box::new(child));
        node
    }

    pub fn component<C: Component>(props: C::Props) -> Self {
        Self::with_type(NodeType::Class {
            ty: ClassType::of::<C>(),
            props: Rc::new(props),
        })
    }

    /// A function component. Its identity is the type of `render`, so two
    /// nodes built from the same function item patch into each other.
    pub fn function<P, F>(render: F, props: P) -> Self
    where
        P: 'static,
        F: Fn(&P, &Context) -> Render + 'static,
    {
        Self::with_type(NodeType::Function {
            ty: FunctionType::of(render),
            props: Rc::new(props),
        })
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Set an element prop. Props on non-element nodes are ignored.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props
            .get_or_insert_with(Props::new)
            .insert(name, value);
        self
    }

    /// Set an event handler prop such as `onClick`.
    pub fn on(self, name: impl Into<String>, handler: impl Fn(&mut Event) + 'static) -> Self {
        self.prop(name, Handler::new(handler))
    }

    pub fn props(mut self, props: Props) -> Self {
        self.props = Some(props);
        self
    }

    /// Set children from a list. The list is flattened and every entry gets
    /// a key, synthetic when none was given, so it reconciles as keyed.
    pub fn children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        self.children = normalize::keyed(children.into_iter().map(Into::into).collect());
        self
    }

    /// Set children that are matched by position only and never reordered.
    pub fn unkeyed_children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        self.children = normalize::unkeyed(children.into_iter().map(Into::into).collect());
        self
    }

    /// Set a single child.
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children = normalize::single(child.into());
        self
    }

    /// Observe the mounted host node (elements) or instance (class components).
    /// Called with `None` on unmount.
    pub fn node_ref(mut self, callback: impl Fn(Option<&dyn Any>) + 'static) -> Self {
        self.node_ref = Some(Ref::Callback(Rc::new(callback)));
        self
    }

    /// Attach lifecycle hooks to a function component.
    pub fn hooks<P: 'static>(mut self, hooks: FunctionHooks<P>) -> Self {
        self.node_ref = Some(Ref::Hooks(Rc::new(hooks.into_erased())));
        self
    }

    /// Always replace this node on patch instead of diffing it.
    pub fn recreate(mut self) -> Self {
        self.recreate = true;
        self
    }

    /// Mark an element whose text the user edits in place. On patch its
    /// text content is compared and rewritten as a whole instead of
    /// reconciling its children.
    pub fn content_editable(mut self) -> Self {
        self.content_editable = true;
        self
    }

    pub fn kind(&self) -> Kind {
        match &self.ty {
            NodeType::Element { flavor, .. } => Kind::Element(*flavor),
            NodeType::Class { .. } => Kind::Component(ComponentFlavor::Class),
            NodeType::Function { .. } => Kind::Component(ComponentFlavor::Function),
            NodeType::Text(_) => Kind::Text,
            NodeType::Void => Kind::Void,
            NodeType::Portal(_) => Kind::Portal,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.ty {
            NodeType::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn get_key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn get_props(&self) -> Option<&Props> {
        self.props.as_ref()
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn child_nodes(&self) -> &Children {
        &self.children
    }

    /// Whether `next` can be patched into a position currently holding `self`.
    pub(crate) fn same_type(&self, next: &VNode) -> bool {
        match (&self.ty, &next.ty) {
            (
                NodeType::Element { tag: a, flavor: fa },
                NodeType::Element { tag: b, flavor: fb },
            ) => a == b && fa == fb,
            (NodeType::Class { ty: a, .. }, NodeType::Class { ty: b, .. }) => {
                a.id == b.id && self.key == next.key
            }
            (NodeType::Function { ty: a, .. }, NodeType::Function { ty: b, .. }) => {
                a.id == b.id && self.key == next.key
            }
            (NodeType::Text(_), NodeType::Text(_))
            | (NodeType::Void, NodeType::Void)
            | (NodeType::Portal(_), NodeType::Portal(_)) => true,
            _ => false,
        }
    }

    /// Name used in diagnostics.
    pub(crate) fn describe(&self) -> String {
        match &self.ty {
            NodeType::Element { tag, .. } => format!("<{tag}>"),
            NodeType::Class { ty, .. } => ty.name.to_string(),
            NodeType::Function { ty, .. } => ty.name.to_string(),
            NodeType::Text(_) => String::from("#text"),
            NodeType::Void => String::from("#void"),
            NodeType::Portal(_) => String::from("#portal"),
        }
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("VNode");
        debug.field("kind", &self.kind());
        match &self.ty {
            NodeType::Element { tag, .. } => {
                debug.field("tag", tag);
            }
            NodeType::Text(text) => {
                debug.field("text", text);
            }
            _ => {
                debug.field("type", &self.describe());
            }
        }
        debug
            .field("key", &self.key)
            .field("class_name", &self.class_name)
            .field("props", &self.props)
            .field("children", &self.children)
            .finish()
    }
}
