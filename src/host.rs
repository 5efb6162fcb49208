//! The native primitives the reconciler drives.

use crate::props::PropValue;
use core::fmt::{self, Display, Formatter};

/// Ownership-free handle to a native node, as an index into the [`Host`]'s node arena.
///
/// A [`VNode`](`crate::VNode`) only ever stores this handle, never the native node itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl Display for NodeId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// A live render target.
///
/// Implementations are expected to be forgiving: Failing native operations should be logged and skipped rather than panic,
/// as the differ continues with the rest of the tree either way.
pub trait Host {
	/// Creates a detached element. `namespaced` elements live in the SVG namespace.
	fn create_element(&mut self, tag: &str, namespaced: bool) -> NodeId;

	/// Creates a detached text node.
	fn create_text(&mut self, text: &str) -> NodeId;

	/// Inserts (or moves) `child` into `parent` before `reference`, or at the end if `reference` is [`None`].
	fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>);

	fn append_child(&mut self, parent: NodeId, child: NodeId) {
		self.insert_before(parent, child, None)
	}

	/// Swaps `old_child` for `new_child` in place.
	fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId);

	fn remove_child(&mut self, parent: NodeId, child: NodeId);

	fn parent_node(&self, node: NodeId) -> Option<NodeId>;

	fn has_child_nodes(&self, node: NodeId) -> bool;

	/// Replaces all children of `node` with a single text node (or nothing, if `text` is empty).
	///
	/// Returns the resulting first child, registered with this host.
	fn set_text_content(&mut self, node: NodeId, text: &str) -> Option<NodeId>;

	/// Overwrites the data of a text node.
	fn set_node_value(&mut self, node: NodeId, text: &str);

	/// Applies one element property.
	///
	/// `previous` may be equal to `next`. Skipping such no-op writes is this function's responsibility.
	fn apply_property(&mut self, node: NodeId, name: &str, previous: Option<&PropValue>, next: &PropValue, namespaced: bool, controlled: bool);

	/// Resets a property that can't be removed as an attribute, to `null` if `to_null` and to an empty value otherwise.
	fn reset_property(&mut self, node: NodeId, name: &str, to_null: bool);

	fn remove_attribute(&mut self, node: NodeId, name: &str);

	/// Unbinds the event handler previously applied as property `name`.
	fn remove_event(&mut self, node: NodeId, name: &str, delegated: bool);

	/// Sets (or with [`None`] removes) the class name. `namespaced` elements need it set as attribute.
	fn set_class_name(&mut self, node: NodeId, class_name: Option<&str>, namespaced: bool);

	/// Called once a detached node's handle won't be used anymore.
	fn release(&mut self, node: NodeId) {
		let _ = node;
	}
}
