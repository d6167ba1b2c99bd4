//! Structural errors raised while rendering.

use thiserror::Error;

/// Errors that abort a top-level render call.
///
/// These cover structural misuse only: continuing past any of them would leave
/// the host tree and the mounted description out of sync. Advisory problems such
/// as duplicate keys, hydration mismatches or state updates on unmounted
/// components are reported through `tracing` instead and never fail a render.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A void element such as `<input>` or `<br>` was given children.
    #[error("<{tag}> is a void element and cannot have children")]
    VoidElementChildren { tag: String },

    /// A function-component hook object was attached to a class component.
    #[error("class component `{component}` cannot take function component hooks as its ref")]
    HooksOnClassComponent { component: &'static str },

    /// A component received props of a type it does not accept.
    #[error("component `{component}` received props of an unexpected type")]
    PropsMismatch { component: &'static str },

    /// An `on*` prop carried something other than a handler or null.
    #[error("event prop `{name}` must be a handler or null")]
    InvalidEventProp { name: String },

    /// A portal was pointed at a container that is not a node of the active host.
    #[error("portal target is not a node of the active host")]
    PortalTarget,

    /// An event was dispatched with a target that is not a node of the active host.
    #[error("event target is not a node of the active host")]
    EventTarget,

    /// A mounted node lost its place in the host tree.
    #[error("mounted node is detached from the host tree")]
    Detached,
}
