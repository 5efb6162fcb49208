//! A headless [`Host`] that keeps its nodes in memory and records every mutation.
//!
//! Useful for server-side rendering into a [`String`] and to observe exactly what a diff did.

use crate::{
	host::{Host, NodeId},
	props::PropValue,
};
use core::{any::Any, fmt::Write};
use std::{collections::BTreeMap, rc::Rc};
use tracing::{error, trace};

/// One native operation performed on a [`MemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
	CreateElement { node: NodeId, tag: Rc<str> },
	CreateText { node: NodeId },
	/// `moved` is `true` iff `child` was attached somewhere before.
	InsertBefore { parent: NodeId, child: NodeId, reference: Option<NodeId>, moved: bool },
	ReplaceChild { parent: NodeId, new_child: NodeId, old_child: NodeId },
	RemoveChild { parent: NodeId, child: NodeId },
	SetTextContent { node: NodeId },
	SetNodeValue { node: NodeId },
	SetProperty { node: NodeId, name: Rc<str> },
	ResetProperty { node: NodeId, name: Rc<str> },
	RemoveAttribute { node: NodeId, name: Rc<str> },
	RemoveEvent { node: NodeId, name: Rc<str>, delegated: bool },
	SetClassName { node: NodeId },
}

impl Mutation {
	/// Whether this inserted an already attached node elsewhere.
	#[must_use]
	pub fn is_move(&self) -> bool {
		matches!(self, Self::InsertBefore { moved: true, .. })
	}
}

#[derive(Debug)]
enum Content {
	Element {
		tag: Rc<str>,
		namespaced: bool,
		properties: BTreeMap<Rc<str>, PropValue>,
		class_name: Option<Rc<str>>,
	},
	Text(String),
}

#[derive(Debug)]
struct MemoryNode {
	content: Content,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	released: bool,
}

/// Released [`NodeId`]s are handed out again for nodes created later.
#[derive(Debug, Default)]
pub struct MemoryHost {
	nodes: Vec<MemoryNode>,
	vacant: Vec<NodeId>,
	mutations: Vec<Mutation>,
}

impl MemoryHost {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a detached element to render into. This isn't recorded as mutation.
	pub fn create_container(&mut self, tag: &str) -> NodeId {
		self.push(Content::Element {
			tag: tag.into(),
			namespaced: false,
			properties: BTreeMap::new(),
			class_name: None,
		})
	}

	fn push(&mut self, content: Content) -> NodeId {
		let node = MemoryNode {
			content,
			parent: None,
			children: Vec::new(),
			released: false,
		};
		match self.vacant.pop() {
			Some(id) => {
				self.nodes[id.0 as usize] = node;
				id
			}
			None => {
				let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
				self.nodes.push(node);
				id
			}
		}
	}

	fn get(&self, node: NodeId) -> Option<&MemoryNode> {
		let found = self.nodes.get(node.0 as usize);
		if found.is_none() {
			error!("Unknown node {}.", node);
		}
		found
	}

	fn get_mut(&mut self, node: NodeId) -> Option<&mut MemoryNode> {
		let found = self.nodes.get_mut(node.0 as usize);
		if found.is_none() {
			error!("Unknown node {}.", node);
		}
		found
	}

	fn properties_mut(&mut self, node: NodeId) -> Option<&mut BTreeMap<Rc<str>, PropValue>> {
		match &mut self.get_mut(node)?.content {
			Content::Element { properties, .. } => Some(properties),
			Content::Text(_) => {
				error!("Expected element but found text at {}.", node);
				None
			}
		}
	}

	/// Takes `child` out of its parent's child list, if it has a parent.
	fn detach(&mut self, child: NodeId) -> bool {
		let parent = match self.get_mut(child).and_then(|child| child.parent.take()) {
			Some(parent) => parent,
			None => return false,
		};
		if let Some(parent) = self.get_mut(parent) {
			parent.children.retain(|&sibling| sibling != child);
		}
		true
	}

	#[must_use]
	pub fn children(&self, node: NodeId) -> &[NodeId] {
		match self.get(node) {
			Some(node) => &node.children,
			None => &[],
		}
	}

	#[must_use]
	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.get(node)?.parent
	}

	#[must_use]
	pub fn tag(&self, node: NodeId) -> Option<&str> {
		match &self.get(node)?.content {
			Content::Element { tag, .. } => Some(tag),
			Content::Text(_) => None,
		}
	}

	#[must_use]
	pub fn is_namespaced(&self, node: NodeId) -> bool {
		matches!(self.get(node).map(|node| &node.content), Some(Content::Element { namespaced: true, .. }))
	}

	#[must_use]
	pub fn text(&self, node: NodeId) -> Option<&str> {
		match &self.get(node)?.content {
			Content::Text(text) => Some(text),
			Content::Element { .. } => None,
		}
	}

	#[must_use]
	pub fn property(&self, node: NodeId, name: &str) -> Option<&PropValue> {
		match &self.get(node)?.content {
			Content::Element { properties, .. } => properties.get(name),
			Content::Text(_) => None,
		}
	}

	#[must_use]
	pub fn class_name(&self, node: NodeId) -> Option<&str> {
		match &self.get(node)?.content {
			Content::Element { class_name, .. } => class_name.as_deref(),
			Content::Text(_) => None,
		}
	}

	/// Whether `node` was released and its slot wasn't reused since.
	#[must_use]
	pub fn is_released(&self, node: NodeId) -> bool {
		self.get(node).map_or(false, |node| node.released)
	}

	/// Number of nodes that were created and not released yet, containers included.
	#[must_use]
	pub fn live_count(&self) -> usize {
		self.nodes.iter().filter(|node| !node.released).count()
	}

	#[must_use]
	pub fn mutations(&self) -> &[Mutation] {
		&self.mutations
	}

	pub fn take_mutations(&mut self) -> Vec<Mutation> {
		core::mem::take(&mut self.mutations)
	}

	/// Empties `node` behind the renderer's back, the way third-party scripts sometimes do.
	pub fn clear_externally(&mut self, node: NodeId) {
		let children = self.get_mut(node).map(|node| core::mem::take(&mut node.children)).unwrap_or_default();
		for child in children {
			if let Some(child) = self.get_mut(child) {
				child.parent = None;
			}
		}
	}

	/// Calls the `name` event handlers of `target` and its ancestors, innermost first.
	///
	/// Returns how many handlers were called.
	pub fn dispatch(&self, target: NodeId, name: &str, event: &dyn Any) -> usize {
		let mut called = 0;
		let mut current = Some(target);
		while let Some(node) = current {
			if let Some(PropValue::Event(handler)) = self.property(node, name) {
				trace!("Dispatching {} on {}.", name, node);
				handler.call(event);
				called += 1;
			}
			current = self.parent(node);
		}
		called
	}

	/// Serializes `node` and its subtree as markup.
	#[must_use]
	pub fn to_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		self.write_html(&mut html, node);
		html
	}

	/// Serializes the children of `node`.
	#[must_use]
	pub fn inner_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		for &child in self.children(node) {
			self.write_html(&mut html, child);
		}
		html
	}

	fn write_html(&self, html: &mut String, id: NodeId) {
		let node = match self.get(id) {
			Some(node) => node,
			None => return,
		};
		match &node.content {
			Content::Text(text) => escape(html, text, false),
			Content::Element { tag, properties, class_name, .. } => {
				html.push('<');
				html.push_str(tag);
				if let Some(class_name) = class_name {
					html.push_str(" class=\"");
					escape(html, class_name, true);
					html.push('"');
				}
				let mut inner = None;
				for (name, value) in properties {
					match value {
						PropValue::Null | PropValue::Bool(false) | PropValue::Event(_) => (),
						PropValue::Html(markup) => inner = Some(markup),
						PropValue::Bool(true) => {
							html.push(' ');
							html.push_str(name);
						}
						PropValue::Number(number) => {
							let _ = write!(html, " {}=\"{}\"", name, number);
						}
						PropValue::Str(value) => {
							html.push(' ');
							html.push_str(name);
							html.push_str("=\"");
							escape(html, value, true);
							html.push('"');
						}
					}
				}
				html.push('>');
				match inner {
					Some(markup) if node.children.is_empty() => html.push_str(markup),
					_ => {
						for &child in &node.children {
							self.write_html(html, child);
						}
					}
				}
				html.push_str("</");
				html.push_str(tag);
				html.push('>');
			}
		}
	}
}

fn escape(html: &mut String, text: &str, attribute: bool) {
	for c in text.chars() {
		match c {
			'&' => html.push_str("&amp;"),
			'<' => html.push_str("&lt;"),
			'>' => html.push_str("&gt;"),
			'"' if attribute => html.push_str("&quot;"),
			c => html.push(c),
		}
	}
}

impl Host for MemoryHost {
	fn create_element(&mut self, tag: &str, namespaced: bool) -> NodeId {
		let node = self.push(Content::Element {
			tag: tag.into(),
			namespaced,
			properties: BTreeMap::new(),
			class_name: None,
		});
		self.mutations.push(Mutation::CreateElement { node, tag: tag.into() });
		node
	}

	fn create_text(&mut self, text: &str) -> NodeId {
		let node = self.push(Content::Text(text.to_owned()));
		self.mutations.push(Mutation::CreateText { node });
		node
	}

	fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
		if self.get(parent).is_none() || self.get(child).is_none() {
			return;
		}
		let moved = self.detach(child);
		let index = match reference {
			Some(reference) => match self.children(parent).iter().position(|&sibling| sibling == reference) {
				Some(index) => index,
				None => {
					error!("Reference node {} is not a child of {}. Appending instead.", reference, parent);
					self.children(parent).len()
				}
			},
			None => self.children(parent).len(),
		};
		if let Some(node) = self.get_mut(parent) {
			node.children.insert(index, child);
		}
		if let Some(node) = self.get_mut(child) {
			node.parent = Some(parent);
		}
		self.mutations.push(Mutation::InsertBefore { parent, child, reference, moved });
	}

	fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId) {
		let index = match self.children(parent).iter().position(|&sibling| sibling == old_child) {
			Some(index) => index,
			None => return error!("Failed to replace {}: Not a child of {}.", old_child, parent),
		};
		self.detach(new_child);
		// Detaching can't have shifted `old_child` unless `new_child` was an earlier sibling.
		let index = self.children(parent).iter().position(|&sibling| sibling == old_child).unwrap_or(index);
		if let Some(node) = self.get_mut(parent) {
			node.children[index] = new_child;
		}
		if let Some(node) = self.get_mut(old_child) {
			node.parent = None;
		}
		if let Some(node) = self.get_mut(new_child) {
			node.parent = Some(parent);
		}
		self.mutations.push(Mutation::ReplaceChild { parent, new_child, old_child });
	}

	fn remove_child(&mut self, parent: NodeId, child: NodeId) {
		if self.parent(child) != Some(parent) {
			return error!("Failed to remove {}: Not a child of {}.", child, parent);
		}
		self.detach(child);
		self.mutations.push(Mutation::RemoveChild { parent, child });
	}

	fn parent_node(&self, node: NodeId) -> Option<NodeId> {
		self.parent(node)
	}

	fn has_child_nodes(&self, node: NodeId) -> bool {
		!self.children(node).is_empty()
	}

	fn set_text_content(&mut self, node: NodeId, text: &str) -> Option<NodeId> {
		self.get(node)?;
		self.clear_externally(node);
		self.mutations.push(Mutation::SetTextContent { node });
		if text.is_empty() {
			return None;
		}
		let child = self.push(Content::Text(text.to_owned()));
		if let Some(parent) = self.get_mut(node) {
			parent.children.push(child);
		}
		if let Some(child) = self.get_mut(child) {
			child.parent = Some(node);
		}
		Some(child)
	}

	fn set_node_value(&mut self, node: NodeId, text: &str) {
		match self.get_mut(node).map(|node| &mut node.content) {
			Some(Content::Text(data)) => {
				text.clone_into(data);
				self.mutations.push(Mutation::SetNodeValue { node });
			}
			Some(Content::Element { .. }) => error!("Expected text but found element at {}.", node),
			None => (),
		}
	}

	fn apply_property(&mut self, node: NodeId, name: &str, previous: Option<&PropValue>, next: &PropValue, namespaced: bool, controlled: bool) {
		let _ = (namespaced, controlled);
		if previous == Some(next) || (previous.is_none() && next.is_null()) {
			return;
		}
		let properties = match self.properties_mut(node) {
			Some(properties) => properties,
			None => return,
		};
		if next.is_null() {
			properties.remove(name);
		} else {
			properties.insert(name.into(), next.clone());
		}
		self.mutations.push(Mutation::SetProperty { node, name: name.into() });
	}

	fn reset_property(&mut self, node: NodeId, name: &str, to_null: bool) {
		if let Some(properties) = self.properties_mut(node) {
			properties.insert(name.into(), if to_null { PropValue::Null } else { PropValue::Str("".into()) });
			self.mutations.push(Mutation::ResetProperty { node, name: name.into() });
		}
	}

	fn remove_attribute(&mut self, node: NodeId, name: &str) {
		if let Some(properties) = self.properties_mut(node) {
			properties.remove(name);
			self.mutations.push(Mutation::RemoveAttribute { node, name: name.into() });
		}
	}

	fn remove_event(&mut self, node: NodeId, name: &str, delegated: bool) {
		if let Some(properties) = self.properties_mut(node) {
			properties.remove(name);
			self.mutations.push(Mutation::RemoveEvent { node, name: name.into(), delegated });
		}
	}

	fn set_class_name(&mut self, node: NodeId, class_name: Option<&str>, namespaced: bool) {
		let _ = namespaced;
		match self.get_mut(node).map(|node| &mut node.content) {
			Some(Content::Element { class_name: current, .. }) => {
				*current = class_name.map(Into::into);
				self.mutations.push(Mutation::SetClassName { node });
			}
			Some(Content::Text(_)) => error!("Expected element but found text at {}.", node),
			None => (),
		}
	}

	fn release(&mut self, node: NodeId) {
		match self.get_mut(node) {
			Some(entry) if entry.released => error!("Node {} released twice.", node),
			Some(entry) => {
				entry.released = true;
				self.vacant.push(node);
			}
			None => (),
		}
	}
}
