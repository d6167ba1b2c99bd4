//! Turning raw child input into canonical [`Children`].

use std::collections::HashSet;

use crate::vnode::{format_number, Children, Key, VNode};

/// Raw child input accepted by the [`VNode`] child builders.
///
/// Strings and numbers become text nodes; `None`, `()` and booleans render as
/// nothing; nested lists are flattened depth-first.
#[derive(Clone, Debug)]
pub enum Child {
    Node(VNode),
    Text(String),
    Invalid,
    List(Vec<Child>),
}

impl From<VNode> for Child {
    fn from(value: VNode) -> Self {
        Child::Node(value)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Text(value)
    }
}

impl From<&String> for Child {
    fn from(value: &String) -> Self {
        Child::Text(value.clone())
    }
}

macro_rules! number_child {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Child {
            fn from(value: $ty) -> Self {
                Child::Text(format_number(value as f64))
            }
        })*
    };
}

number_child!(i32, i64, u32, u64, usize, f32, f64);

impl From<bool> for Child {
    fn from(_: bool) -> Self {
        Child::Invalid
    }
}

impl From<()> for Child {
    fn from(_: ()) -> Self {
        Child::Invalid
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Child::Invalid, Into::into)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(value: Vec<T>) -> Self {
        Child::List(value.into_iter().map(Into::into).collect())
    }
}

/// Normalise a list into keyed children. Entries without a user key get a
/// synthetic one built from their position; user keys inside nested lists
/// are scoped by the nested list's position so they cannot collide.
pub(crate) fn keyed(children: Vec<Child>) -> Children {
    let mut out = Vec::with_capacity(children.len());
    flatten_keyed(children, "", &mut out);
    if out.is_empty() {
        Children::Invalid
    } else {
        Children::Keyed(out)
    }
}

fn flatten_keyed(children: Vec<Child>, path: &str, out: &mut Vec<VNode>) {
    for (index, child) in children.into_iter().enumerate() {
        match child {
            Child::Invalid => {}
            Child::List(nested) => flatten_keyed(nested, &position(path, index), out),
            Child::Text(text) => {
                out.push(VNode::text(text).key(Key::synthetic(position(path, index))));
            }
            Child::Node(mut node) => {
                let key = match node.key.take() {
                    Some(key) if !key.is_synthetic() && !key.is_reserved() => key.scoped(path),
                    _ => Key::synthetic(position(path, index)),
                };
                node.key = Some(key);
                out.push(node);
            }
        }
    }
}

fn position(path: &str, index: usize) -> String {
    format!("{path}${index}")
}

/// Normalise a list into positional children.
pub(crate) fn unkeyed(children: Vec<Child>) -> Children {
    let mut out = Vec::with_capacity(children.len());
    flatten_unkeyed(children, &mut out);
    if out.is_empty() {
        Children::Invalid
    } else {
        Children::Unkeyed(out)
    }
}

fn flatten_unkeyed(children: Vec<Child>, out: &mut Vec<VNode>) {
    for child in children {
        match child {
            Child::Invalid => {}
            Child::List(nested) => flatten_unkeyed(nested, out),
            Child::Text(text) => out.push(VNode::text(text)),
            Child::Node(node) => out.push(node),
        }
    }
}

pub(crate) fn single(child: Child) -> Children {
    match child {
        Child::Invalid => Children::Invalid,
        Child::Text(text) => Children::Single(Box::new(VNode::text(text))),
        Child::Node(node) => Children::Single(Box::new(node)),
        Child::List(list) => keyed(list),
    }
}

/// Report duplicate keys and lists that mix user and positional keys.
pub(crate) fn validate_keys(element: &str, children: &[VNode]) {
    let mut seen = HashSet::with_capacity(children.len());
    let mut synthetic = 0;
    for child in children {
        let Some(key) = child.get_key() else {
            continue;
        };
        if key.is_synthetic() {
            synthetic += 1;
        }
        if !seen.insert(key) {
            tracing::warn!(element, key = %key, "duplicate key among keyed children");
        }
    }
    if synthetic > 0 && synthetic < children.len() {
        tracing::warn!(
            element,
            keyed = children.len() - synthetic,
            unkeyed = synthetic,
            "keyed children mix explicit keys with unkeyed entries"
        );
    }
}
