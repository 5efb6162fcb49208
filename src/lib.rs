#![doc(html_root_url = "https://docs.rs/reconcile-dom/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! A virtual DOM reconciler: Patches a live render target from one virtual tree to the next,
//! keeping native nodes and component instances alive wherever it can.
//!
//! See [`Differ`] for the entry points and [`Host`] for the render target.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod component;
pub mod deferred;
pub mod diff;
pub mod dom;
pub mod host;
pub mod lis;
pub mod memory;
mod mount;
pub mod options;
pub mod props;
pub mod vnode;

pub use component::{ClassInstance, Component, ComponentClass, FunctionComponent, FunctionHooks, Rendered, StateQueue};
pub use deferred::Deferred;
pub use diff::Differ;
pub use dom::DomHost;
pub use host::{Host, NodeId};
pub use memory::{MemoryHost, Mutation};
pub use options::Options;
pub use props::{props, EventHandler, PropMap, PropValue, Props};
pub use vnode::{element, shared_children, Children, Key, NodeRef, RefCallback, VNode, VNodeKind, VNodeRef};
