//! The browser [`Host`], on top of [`web_sys`].

use crate::{
	host::{Host, NodeId},
	props::{is_event, PropValue, INNER_HTML, STRICT_PROPS},
};
use hashbrown::HashMap;
use js_sys::{Object, Reflect};
use tracing::{error, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Property under which each registered native node carries its [`NodeId`].
const ID_PROPERTY: &str = "__reconcileDomId";

/// Drives live DOM nodes of one [`web_sys::Document`].
///
/// Native nodes are kept in an arena indexed by [`NodeId`]. Each one is tagged with its id, so that parents found by
/// walking the DOM can be resolved back.
///
/// Event listeners are wrapped in one [`Closure`] per node and event, and are dropped when unbound or when their node is released.
#[derive(Debug)]
pub struct DomHost {
	document: web_sys::Document,
	nodes: Vec<Option<web_sys::Node>>,
	vacant: Vec<NodeId>,
	listeners: HashMap<(NodeId, String), Closure<dyn Fn(web_sys::Event)>>,
}

impl DomHost {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self {
			document,
			nodes: Vec::new(),
			vacant: Vec::new(),
			listeners: HashMap::new(),
		}
	}

	/// Registers an existing native node, usually a container to render into.
	pub fn adopt(&mut self, node: web_sys::Node) -> NodeId {
		let id = match self.vacant.pop() {
			Some(id) => {
				self.nodes[id.0 as usize] = Some(node.clone());
				id
			}
			None => {
				let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
				self.nodes.push(Some(node.clone()));
				id
			}
		};
		if let Err(error) = Reflect::set(node.as_ref(), &JsValue::from_str(ID_PROPERTY), &JsValue::from(id.0)) {
			error!("Failed to tag node {}: {:?}", id, error);
		}
		id
	}

	#[must_use]
	pub fn get(&self, id: NodeId) -> Option<&web_sys::Node> {
		self.nodes.get(id.0 as usize).and_then(Option::as_ref)
	}

	fn node(&self, id: NodeId) -> Option<&web_sys::Node> {
		let node = self.get(id);
		if node.is_none() {
			error!("Unknown or released node {}.", id);
		}
		node
	}

	fn element(&self, id: NodeId) -> Option<&web_sys::Element> {
		let element = self.node(id)?.dyn_ref::<web_sys::Element>();
		if element.is_none() {
			error!("Expected element at {}.", id);
		}
		element
	}

	fn placeholder(&mut self) -> NodeId {
		let text = self.document.create_text_node("");
		self.adopt(text.into())
	}

	fn bind_event(&mut self, id: NodeId, name: &str, handler: crate::props::EventHandler) {
		self.unbind_event(id, name);
		let element = match self.element(id) {
			Some(element) => element.clone(),
			None => return,
		};
		let closure = Closure::wrap(Box::new(move |event: web_sys::Event| handler.call(&event)) as Box<dyn Fn(web_sys::Event)>);
		match element.add_event_listener_with_callback(&event_type(name), closure.as_ref().unchecked_ref()) {
			Ok(()) => {
				self.listeners.insert((id, name.to_owned()), closure);
			}
			Err(error) => error!("Failed to add event listener {:?}: {:?}", name, error),
		}
	}

	fn unbind_event(&mut self, id: NodeId, name: &str) {
		let closure = match self.listeners.remove(&(id, name.to_owned())) {
			Some(closure) => closure,
			None => return,
		};
		if let Some(node) = self.get(id) {
			if let Err(error) = node.remove_event_listener_with_callback(&event_type(name), closure.as_ref().unchecked_ref()) {
				error!("Failed to remove event listener {:?}: {:?}", name, error)
			}
		}
	}

	fn set_attribute(&self, id: NodeId, name: &str, value: &PropValue) {
		let element = match self.element(id) {
			Some(element) => element,
			None => return,
		};
		let result = match value {
			PropValue::Null | PropValue::Bool(false) => element.remove_attribute(name),
			PropValue::Bool(true) => element.set_attribute(name, ""),
			PropValue::Number(number) => element.set_attribute(name, &number.to_string()),
			PropValue::Str(value) | PropValue::Html(value) => element.set_attribute(name, value),
			PropValue::Event(_) => return warn!("Event handler {:?} can't be set as attribute. Ignoring it.", name),
		};
		if let Err(error) = result {
			error!("Failed to set attribute {:?}: {:?}", name, error)
		}
	}

	fn set_property(&self, id: NodeId, name: &str, value: &JsValue) {
		if let Some(node) = self.node(id) {
			if let Err(error) = Reflect::set(node.as_ref(), &JsValue::from_str(name), value) {
				error!("Failed to set property {:?}: {:?}", name, error)
			}
		}
	}
}

fn event_type(name: &str) -> String {
	name.trim_start_matches("on").to_lowercase()
}

fn to_js(value: &PropValue) -> JsValue {
	match value {
		PropValue::Null | PropValue::Event(_) => JsValue::NULL,
		&PropValue::Bool(value) => value.into(),
		&PropValue::Number(value) => value.into(),
		PropValue::Str(value) | PropValue::Html(value) => JsValue::from_str(value),
	}
}

impl Host for DomHost {
	fn create_element(&mut self, tag: &str, namespaced: bool) -> NodeId {
		let element = if namespaced {
			self.document.create_element_ns(Some(SVG_NAMESPACE), tag)
		} else {
			self.document.create_element(tag)
		};
		match element {
			Ok(element) => self.adopt(element.into()),
			Err(error) => {
				error!("Failed to create <{}>: {:?}. Using an empty text node instead.", tag, error);
				self.placeholder()
			}
		}
	}

	fn create_text(&mut self, text: &str) -> NodeId {
		let text = self.document.create_text_node(text);
		self.adopt(text.into())
	}

	fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
		let (parent, child) = match (self.node(parent), self.node(child)) {
			(Some(parent), Some(child)) => (parent, child),
			_ => return,
		};
		let reference = reference.and_then(|reference| self.node(reference));
		if let Err(error) = parent.insert_before(child, reference) {
			error!("Failed to insert node: {:?}", error)
		}
	}

	fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId) {
		if let (Some(parent), Some(new_child), Some(old_child)) = (self.node(parent), self.node(new_child), self.node(old_child)) {
			if let Err(error) = parent.replace_child(new_child, old_child) {
				error!("Failed to replace node: {:?}", error)
			}
		}
	}

	fn remove_child(&mut self, parent: NodeId, child: NodeId) {
		if let (Some(parent), Some(child)) = (self.node(parent), self.node(child)) {
			if let Err(error) = parent.remove_child(child) {
				error!("Failed to remove node: {:?}", error)
			}
		}
	}

	fn parent_node(&self, node: NodeId) -> Option<NodeId> {
		let parent = self.node(node)?.parent_node()?;
		let id = Reflect::get(parent.as_ref(), &JsValue::from_str(ID_PROPERTY)).ok()?.as_f64()?;
		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		let id = NodeId(id as u32);
		match self.get(id) {
			Some(registered) if registered.is_same_node(Some(&parent)) => Some(id),
			_ => {
				warn!("Parent of {} carries a stale id.", node);
				None
			}
		}
	}

	fn has_child_nodes(&self, node: NodeId) -> bool {
		self.node(node).map_or(false, web_sys::Node::has_child_nodes)
	}

	fn set_text_content(&mut self, node: NodeId, text: &str) -> Option<NodeId> {
		let first_child = {
			let node = self.node(node)?;
			node.set_text_content(if text.is_empty() { None } else { Some(text) });
			node.first_child()
		};
		first_child.map(|child| self.adopt(child))
	}

	fn set_node_value(&mut self, node: NodeId, text: &str) {
		if let Some(node) = self.node(node) {
			node.set_node_value(Some(text))
		}
	}

	fn apply_property(&mut self, node: NodeId, name: &str, previous: Option<&PropValue>, next: &PropValue, namespaced: bool, controlled: bool) {
		let _ = namespaced;
		let live_value = controlled && matches!(name, "value" | "checked");
		if previous == Some(next) && !live_value {
			return;
		}

		if is_event(name) {
			return match next {
				PropValue::Event(handler) => self.bind_event(node, name, handler.clone()),
				_ => self.unbind_event(node, name),
			};
		}

		if live_value || name == INNER_HTML || STRICT_PROPS.contains(&name) {
			trace!(name, "Setting property");
			self.set_property(node, name, &to_js(next))
		} else {
			self.set_attribute(node, name, next)
		}
	}

	fn reset_property(&mut self, node: NodeId, name: &str, to_null: bool) {
		let value = if to_null { JsValue::NULL } else { JsValue::from_str("") };
		self.set_property(node, name, &value)
	}

	fn remove_attribute(&mut self, node: NodeId, name: &str) {
		if let Some(element) = self.element(node) {
			if let Err(error) = element.remove_attribute(name) {
				error!("Failed to remove attribute {:?}: {:?}", name, error)
			}
		}
	}

	fn remove_event(&mut self, node: NodeId, name: &str, delegated: bool) {
		trace!(name, delegated, "Removing event listener");
		self.unbind_event(node, name)
	}

	fn set_class_name(&mut self, node: NodeId, class_name: Option<&str>, namespaced: bool) {
		let element = match self.element(node) {
			Some(element) => element,
			None => return,
		};
		match class_name {
			None => {
				if let Err(error) = element.remove_attribute("class") {
					error!("Failed to remove class: {:?}", error)
				}
			}
			Some(class_name) if namespaced => {
				if let Err(error) = element.set_attribute("class", class_name) {
					error!("Failed to set class: {:?}", error)
				}
			}
			Some(class_name) => element.set_class_name(class_name),
		}
	}

	fn release(&mut self, id: NodeId) {
		let bound: Vec<String> = self.listeners.keys().filter(|(node, _)| *node == id).map(|(_, name)| name.clone()).collect();
		for name in bound {
			self.unbind_event(id, &name);
		}

		match self.nodes.get_mut(id.0 as usize).and_then(Option::take) {
			Some(node) => {
				if let Err(error) = Reflect::delete_property(node.unchecked_ref::<Object>(), &JsValue::from_str(ID_PROPERTY)) {
					warn!("Failed to untag node {}: {:?}", id, error)
				}
				self.vacant.push(id);
			}
			None => error!("Node {} released twice.", id),
		}
	}
}
