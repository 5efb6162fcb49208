//! Creating native nodes for fresh subtrees and tearing removed ones down.

use crate::{
	component::{ClassInstance, Component, InstanceState, StateQueue},
	deferred::Deferred,
	diff::{handle_component_input, Differ},
	host::{Host, NodeId},
	props::{is_controlled, merge, Context},
	vnode::{unalias, ChildCell, Children, ComponentChild, ComponentKind, ComponentNode, ElementNode, NodeRef, PortalNode, VNodeKind, VNodeRef},
};
use std::rc::Rc;
use tracing::{error, trace, trace_span, warn};

impl<H: Host> Differ<H> {
	/// Creates the native nodes for `node` and its subtree, appending the result to `parent` if there is one.
	///
	/// Returns the native node now representing `node`.
	pub fn mount(&mut self, node: &VNodeRef, parent: Option<NodeId>, deferred: &mut Deferred, context: &Context, namespaced: bool) -> NodeId {
		if !self.descend() {
			let placeholder = self.host.create_text("");
			node.set_dom(Some(placeholder));
			if let Some(parent) = parent {
				self.host.append_child(parent, placeholder);
			}
			return placeholder;
		}

		let dom = match &node.kind {
			VNodeKind::Element(element) => {
				let span = trace_span!("Mounting element", tag = &*element.tag);
				let _enter = span.enter();
				self.mount_element(node, element, parent, deferred, context, namespaced)
			}

			VNodeKind::Component(component) => {
				let span = trace_span!("Mounting component", name = component.kind.name());
				let _enter = span.enter();
				self.mount_component(node, component, parent, deferred, context, namespaced)
			}

			VNodeKind::Text(text) => {
				#[cfg(feature = "dangerous-logging")]
				trace!(text = &**text, "Mounting text");
				let dom = self.host.create_text(text);
				self.attach(node, dom, parent)
			}

			VNodeKind::Void => {
				let dom = self.host.create_text("");
				self.attach(node, dom, parent)
			}

			VNodeKind::Portal(portal) => {
				let span = trace_span!("Mounting portal", container = %portal.container);
				let _enter = span.enter();
				self.mount_portal(node, portal, parent, deferred, context)
			}
		};

		self.ascend();
		dom
	}

	fn attach(&mut self, node: &VNodeRef, dom: NodeId, parent: Option<NodeId>) -> NodeId {
		node.set_dom(Some(dom));
		if let Some(parent) = parent {
			self.host.append_child(parent, dom);
		}
		dom
	}

	fn mount_element(&mut self, node: &VNodeRef, element: &ElementNode, parent: Option<NodeId>, deferred: &mut Deferred, context: &Context, namespaced: bool) -> NodeId {
		let namespaced = namespaced || &*element.tag == "svg";
		let dom = self.host.create_element(&element.tag, namespaced);
		node.set_dom(Some(dom));

		if let Some(class_name) = element.class_name.as_deref().filter(|class_name| !class_name.is_empty()) {
			self.host.set_class_name(dom, Some(class_name), namespaced);
		}

		self.mount_children(&element.children, dom, deferred, context, namespaced && &*element.tag != "foreignObject");

		if let Some(props) = &element.props {
			let controlled = is_controlled(&element.tag, props);
			for (name, value) in props.iter() {
				self.host.apply_property(dom, name, None, value, namespaced, controlled);
			}
		}

		if let Some(parent) = parent {
			self.host.append_child(parent, dom);
		}
		if let Some(node_ref) = &element.node_ref {
			self.mount_ref(dom, node_ref, deferred);
		}
		dom
	}

	fn mount_children(&mut self, children: &ChildCell, parent: NodeId, deferred: &mut Deferred, context: &Context, namespaced: bool) {
		let mut children = match children.try_borrow_mut() {
			Ok(children) => children,
			Err(_) => return error!("Child list is already being mounted further up the tree. Skipping it here."),
		};
		match &mut *children {
			Children::None => (),
			Children::Single(child) => {
				unalias(child);
				self.mount(child, Some(parent), deferred, context, namespaced);
			}
			Children::Multiple { nodes, .. } => self.mount_array_children(nodes, parent, deferred, context, namespaced),
		}
	}

	/// Mounts each of `nodes` at the end of `parent`, cloning those that are already mounted elsewhere.
	pub fn mount_array_children(&mut self, nodes: &mut [VNodeRef], parent: NodeId, deferred: &mut Deferred, context: &Context, namespaced: bool) {
		for node in nodes {
			unalias(node);
			self.mount(node, Some(parent), deferred, context, namespaced);
		}
	}

	fn mount_component(&mut self, node: &VNodeRef, component: &ComponentNode, parent: Option<NodeId>, deferred: &mut Deferred, context: &Context, namespaced: bool) -> NodeId {
		let props = Rc::clone(&component.props);
		match &component.kind {
			ComponentKind::Class(class) => {
				let mut instance: Box<dyn Component> = class.instantiate(&props, context);
				let mut state = Rc::new(instance.initial_state(&props));
				let mut queue = StateQueue::default();
				instance.will_mount(&mut queue);
				if let Some(patch) = queue.take() {
					state = merge(&state, &patch);
				}

				if let Some(before_render) = &self.options.before_render {
					before_render(&*instance)
				}
				let rendered = instance.render(&props, &state, context);
				if let Some(after_render) = &self.options.after_render {
					after_render(&*instance)
				}
				let child_context = match instance.child_context() {
					Some(entries) => merge(context, &entries),
					None => Rc::clone(context),
				};

				let input = handle_component_input(rendered, None, node);
				let instance = Rc::new(ClassInstance::new(
					class.name(),
					InstanceState {
						component: instance,
						props,
						state,
						context: Rc::clone(context),
						child_context: Rc::clone(&child_context),
						last_input: Rc::clone(&input),
					},
					namespaced,
				));
				instance.set_owner(node);
				component.set_child(ComponentChild::Instance(Rc::clone(&instance)));

				let dom = self.mount(&input, parent, deferred, &child_context, namespaced);
				node.set_dom(Some(dom));
				deferred.push(move || instance.did_mount());
				dom
			}

			ComponentKind::Function(function) => {
				let input = handle_component_input(function.call(&props, context), None, node);
				component.set_child(ComponentChild::Output(Rc::clone(&input)));

				let dom = self.mount(&input, parent, deferred, context, namespaced);
				node.set_dom(Some(dom));
				if let Some(hooks) = component.hooks.as_ref().filter(|hooks| hooks.did_mount.is_some()) {
					let hooks = Rc::clone(hooks);
					deferred.push(move || {
						if let Some(did_mount) = &hooks.did_mount {
							did_mount(Some(dom))
						}
					});
				}
				dom
			}
		}
	}

	fn mount_portal(&mut self, node: &VNodeRef, portal: &PortalNode, parent: Option<NodeId>, deferred: &mut Deferred, context: &Context) -> NodeId {
		self.mount_children(&portal.children, portal.container, deferred, context, false);
		let placeholder = self.host.create_text("");
		self.attach(node, placeholder, parent)
	}

	/// Schedules a callback ref to receive `dom` once the current pass is done.
	pub fn mount_ref(&mut self, dom: NodeId, node_ref: &NodeRef, deferred: &mut Deferred) {
		match node_ref {
			NodeRef::Callback(callback) => {
				let callback = callback.clone();
				deferred.push(move || callback.call(Some(dom)));
			}
			NodeRef::Named(name) => warn!("String ref {:?} is unsupported and will be ignored. Use a callback ref instead.", name),
		}
	}

	/// Runs teardown for `node`'s subtree and releases the native nodes strictly inside it.
	///
	/// `node`'s own native node stays untouched.
	pub fn unmount(&mut self, node: &VNodeRef) {
		match &node.kind {
			VNodeKind::Element(element) => {
				if let Some(NodeRef::Callback(callback)) = &element.node_ref {
					callback.call(None);
				}
				for child in snapshot(&element.children) {
					self.unmount(&child);
					if let Some(dom) = child.take_dom() {
						self.host.release(dom);
					}
				}
			}

			VNodeKind::Component(component) => {
				let child = component.child.borrow().clone();
				match child {
					ComponentChild::Instance(instance) => {
						trace!("Unmounting {}.", instance.name());
						instance.will_unmount();
						self.unmount(&instance.last_input());
					}
					ComponentChild::Output(output) => {
						if let Some(will_unmount) = component.hooks.as_ref().and_then(|hooks| hooks.will_unmount.as_ref()) {
							will_unmount(node.dom());
						}
						self.unmount(&output);
					}
					ComponentChild::Unmounted => warn!("Unmounting {} that was never mounted.", component.kind.name()),
				}
			}

			VNodeKind::Text(_) | VNodeKind::Void => (),

			VNodeKind::Portal(portal) => {
				for child in snapshot(&portal.children) {
					self.unmount(&child);
					if let Some(dom) = child.take_dom() {
						self.host.remove_child(portal.container, dom);
						self.host.release(dom);
					}
				}
			}
		}
	}

	/// Unmounts `node` and removes it from `parent`.
	pub fn remove(&mut self, node: &VNodeRef, parent: NodeId) {
		self.unmount(node);
		match node.take_dom() {
			Some(dom) => {
				self.host.remove_child(parent, dom);
				self.host.release(dom);
			}
			None => warn!("Removed node was never mounted."),
		}
	}

	/// Unmounts all of `nodes` and clears `parent` in one go.
	pub fn remove_all_children(&mut self, parent: NodeId, nodes: &[VNodeRef]) {
		trace!("Removing all {} children of {}.", nodes.len(), parent);
		for node in nodes {
			self.unmount(node);
		}
		self.host.set_text_content(parent, "");
		for node in nodes {
			if let Some(dom) = node.take_dom() {
				self.host.release(dom);
			}
		}
	}
}

fn snapshot(children: &ChildCell) -> Vec<VNodeRef> {
	match children.try_borrow() {
		Ok(children) => children.nodes().to_vec(),
		Err(_) => {
			error!("Child list is borrowed elsewhere. Skipping its teardown.");
			Vec::new()
		}
	}
}
