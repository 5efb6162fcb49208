use crate::{
	component::{ClassInstance, Rendered, StateQueue},
	deferred::Deferred,
	host::{Host, NodeId},
	lis::longest_increasing_subsequence,
	options::Options,
	props::{self, is_controlled, merge, Context, PropMap, Removal, State},
	vnode::{unalias, unalias_against, ChildCell, Children, ComponentChild, ComponentKind, ComponentNode, ElementNode, PortalNode, VNode, VNodeKind, VNodeRef},
};
use core::cell::{Ref, RefMut};
use hashbrown::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{error, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};

/// Reconciles virtual trees against a [`Host`].
///
/// # Correct Use
///
/// Each previous tree passed to [`Differ::patch`] must be the tree last mounted or patched at that position *by this instance*,
/// and must not be reused as previous tree afterwards. Next trees may share nodes with each other and with previous trees:
/// Nodes that already own a native node are cloned as needed.
#[derive(Debug)]
pub struct Differ<H: Host> {
	pub(crate) host: H,
	pub(crate) options: Options,
	depth: usize,
}

impl<H: Host> Differ<H> {
	#[must_use]
	pub fn new(host: H) -> Self {
		Self::with_options(host, Options::default())
	}

	#[must_use]
	pub fn with_options(host: H, options: Options) -> Self {
		Self { host, options, depth: 0 }
	}

	#[must_use]
	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	#[must_use]
	pub fn into_host(self) -> H {
		self.host
	}

	#[must_use]
	pub fn options(&self) -> &Options {
		&self.options
	}

	/// Enters one level of recursion, or returns `false` and logs an error if that would exceed [`Options::depth_limit`].
	pub(crate) fn descend(&mut self) -> bool {
		if self.depth >= self.options.depth_limit {
			error!("Depth limit ({}) reached. Not descending any further.", self.options.depth_limit);
			return false;
		}
		self.depth += 1;
		true
	}

	pub(crate) fn ascend(&mut self) {
		self.depth -= 1;
	}

	/// Mounts, patches or removes the tree rendered directly into `container`, then flushes the deferred callbacks.
	///
	/// Returns the tree to pass as `previous` on the next call.
	#[instrument(skip(self, previous, next))]
	pub fn render(&mut self, previous: Option<&VNodeRef>, next: Option<VNodeRef>, container: NodeId) -> Option<VNodeRef> {
		let mut deferred = Deferred::new();
		let context: Context = Rc::new(PropMap::new());
		let rendered = match (previous, next) {
			(None, None) => None,
			(None, Some(mut next)) => {
				unalias(&mut next);
				self.mount(&next, Some(container), &mut deferred, &context, false);
				Some(next)
			}
			(Some(previous), Some(mut next)) => {
				unalias_against(previous, &mut next);
				self.patch(previous, &next, container, &mut deferred, &context, false);
				Some(next)
			}
			(Some(previous), None) => {
				self.remove(previous, container);
				None
			}
		};
		trace!("Flushing {} deferred callback(s).", deferred.len());
		deferred.flush();
		rendered
	}

	/// Brings `next` into effect in place of `previous`, which is a child of `parent`.
	///
	/// Callbacks that must wait for the structural changes are pushed onto `deferred`, which the caller should flush afterwards.
	pub fn patch(&mut self, previous: &VNodeRef, next: &VNodeRef, parent: NodeId, deferred: &mut Deferred, context: &Context, namespaced: bool) {
		if Rc::ptr_eq(previous, next) {
			return trace!("Identical node. Skipping.");
		}
		if !self.descend() {
			return;
		}

		match (&previous.kind, &next.kind) {
			_ if next.recreate => {
				let span = trace_span!("Recreating node");
				let _enter = span.enter();
				self.replace_with_new_node(previous, next, parent, deferred, context, namespaced)
			}

			(VNodeKind::Element(a), VNodeKind::Element(b)) => {
				let span = trace_span!("Patching element", tag = &*b.tag);
				let _enter = span.enter();
				if a.tag == b.tag {
					self.patch_element(previous, next, a, b, parent, deferred, context, namespaced)
				} else {
					self.replace_with_new_node(previous, next, parent, deferred, context, namespaced)
				}
			}

			(VNodeKind::Component(a), VNodeKind::Component(b)) if a.kind.is_class() == b.kind.is_class() => {
				let span = trace_span!("Patching component", name = b.kind.name());
				let _enter = span.enter();
				self.patch_component(previous, next, a, b, parent, deferred, context, namespaced)
			}

			(VNodeKind::Text(a), VNodeKind::Text(b)) => self.patch_text(previous, next, a, b, parent),

			(VNodeKind::Void, VNodeKind::Void) => next.set_dom(previous.dom()),

			(VNodeKind::Portal(a), VNodeKind::Portal(b)) => {
				let span = trace_span!("Patching portal", previous_container = %a.container, next_container = %b.container);
				let _enter = span.enter();
				self.patch_portal(previous, next, a, b, deferred, context)
			}

			_ => {
				let span = trace_span!("Replacing node of different kind");
				let _enter = span.enter();
				self.replace_with_new_node(previous, next, parent, deferred, context, namespaced)
			}
		}

		self.ascend()
	}

	fn replace_with_new_node(&mut self, previous: &VNodeRef, next: &VNodeRef, parent: NodeId, deferred: &mut Deferred, context: &Context, namespaced: bool) {
		let old = previous.dom();
		self.unmount(previous);
		let new = self.mount(next, None, deferred, context, namespaced);
		match old {
			Some(old) => {
				self.host.replace_child(parent, new, old);
				self.host.release(old);
				previous.set_dom(None);
			}
			None => {
				warn!("Replaced node was never mounted. Appending instead.");
				self.host.append_child(parent, new)
			}
		}
	}

	#[allow(clippy::too_many_arguments)]
	fn patch_element(&mut self, previous: &VNodeRef, next: &VNodeRef, a: &ElementNode, b: &ElementNode, parent: NodeId, deferred: &mut Deferred, context: &Context, namespaced: bool) {
		let dom = match previous.dom() {
			Some(dom) => dom,
			None => {
				error!("Expected previous <{}> to be mounted. Recreating it.", a.tag);
				return self.replace_with_new_node(previous, next, parent, deferred, context, namespaced);
			}
		};
		next.set_dom(Some(dom));
		let namespaced = namespaced || &*b.tag == "svg";

		if !props::same(a.props.as_ref(), b.props.as_ref()) {
			self.patch_props(dom, &b.tag, a.props.as_deref(), b.props.as_deref(), namespaced);
		}

		if !Rc::ptr_eq(&a.children, &b.children) {
			self.patch_children(&a.children, &b.children, dom, deferred, context, namespaced && &*b.tag != "foreignObject");
		}

		if a.class_name != b.class_name {
			self.host.set_class_name(dom, b.class_name.as_deref().filter(|class_name| !class_name.is_empty()), namespaced);
		}

		if a.node_ref != b.node_ref {
			if let Some(node_ref) = &b.node_ref {
				self.mount_ref(dom, node_ref, deferred);
			}
		}
	}

	fn patch_props(&mut self, dom: NodeId, tag: &str, previous: Option<&PropMap>, next: Option<&PropMap>, namespaced: bool) {
		if let Some(next) = next {
			let controlled = is_controlled(tag, next);
			for (name, value) in next {
				#[cfg(feature = "dangerous-logging")]
				trace!(name = &**name, ?value, "Applying property");
				self.host.apply_property(dom, name, previous.and_then(|previous| previous.get(name)), value, namespaced, controlled);
			}
		}

		for (name, value) in previous.into_iter().flatten() {
			if value.is_null() || next.map_or(false, |next| next.contains_key(name)) {
				continue;
			}
			trace!(name = &**name, "Removing property");
			match Removal::classify(tag, name) {
				Removal::Reset { to_null } => self.host.reset_property(dom, name, to_null),
				Removal::Style | Removal::Attribute => self.host.remove_attribute(dom, name),
				Removal::Event { delegated } => self.host.remove_event(dom, name, delegated),
				Removal::InnerHtml => {
					self.host.set_text_content(dom, "");
				}
			}
		}
	}

	/// Patches one child list cell against another.
	///
	/// The next cell is written to when next children have to be cloned to avoid aliasing.
	pub(crate) fn patch_children(&mut self, previous: &ChildCell, next: &ChildCell, parent: NodeId, deferred: &mut Deferred, context: &Context, namespaced: bool) {
		let (previous, mut next): (Ref<Children>, RefMut<Children>) = match (previous.try_borrow(), next.try_borrow_mut()) {
			(Ok(previous), Ok(next)) => (previous, next),
			_ => return error!("Child list is already being diffed further up the tree. Skipping it here."),
		};

		match (&*previous, &mut *next) {
			(Children::None, Children::None) => (),
			(Children::None, Children::Single(node)) => {
				unalias(node);
				self.mount(node, Some(parent), deferred, context, namespaced);
			}
			(Children::None, Children::Multiple { nodes, .. }) => self.mount_array_children(nodes, parent, deferred, context, namespaced),

			(Children::Single(previous), Children::None) => self.remove(previous, parent),
			(Children::Single(previous), Children::Single(node)) => {
				unalias_against(previous, node);
				self.patch(previous, node, parent, deferred, context, namespaced)
			}
			(Children::Single(previous), Children::Multiple { nodes, .. }) => {
				self.remove(previous, parent);
				self.mount_array_children(nodes, parent, deferred, context, namespaced)
			}

			(Children::Multiple { nodes, .. }, Children::None) => self.remove_all_children(parent, nodes),
			(Children::Multiple { nodes, .. }, Children::Single(node)) => {
				self.remove_all_children(parent, nodes);
				unalias(node);
				self.mount(node, Some(parent), deferred, context, namespaced);
			}
			(Children::Multiple { nodes: a, keyed: a_keyed }, Children::Multiple { nodes: b, keyed: b_keyed }) => {
				if a.is_empty() {
					self.mount_array_children(b, parent, deferred, context, namespaced)
				} else if b.is_empty() {
					self.remove_all_children(parent, a)
				} else if *a_keyed && *b_keyed {
					warn_duplicate_keys(b);
					self.patch_keyed_children(a, b, parent, deferred, context, namespaced)
				} else {
					self.patch_non_keyed_children(a, b, parent, deferred, context, namespaced)
				}
			}
		}
	}

	#[instrument(skip(self, a, b, deferred, context), fields(a.len = a.len(), b.len = b.len()))]
	fn patch_non_keyed_children(&mut self, a: &[VNodeRef], b: &mut [VNodeRef], parent: NodeId, deferred: &mut Deferred, context: &Context, namespaced: bool) {
		let common = a.len().min(b.len());
		for (previous, next) in a.iter().zip(b.iter_mut()) {
			unalias_against(previous, next);
			self.patch(previous, next, parent, deferred, context, namespaced);
		}

		if a.len() < b.len() {
			self.mount_array_children(&mut b[common..], parent, deferred, context, namespaced)
		} else {
			for previous in &a[common..] {
				self.remove(previous, parent)
			}
		}
	}

	fn patch_keyed_pair(&mut self, previous: &VNodeRef, next: &mut VNodeRef, parent: NodeId, deferred: &mut Deferred, context: &Context, namespaced: bool) {
		unalias_against(previous, next);
		self.patch(previous, next, parent, deferred, context, namespaced)
	}

	/// Mounts `node` detached and inserts it before `reference`, or at the end.
	fn insert_new(&mut self, node: &mut VNodeRef, parent: NodeId, reference: Option<NodeId>, deferred: &mut Deferred, context: &Context, namespaced: bool) {
		unalias(node);
		let dom = self.mount(node, None, deferred, context, namespaced);
		self.host.insert_before(parent, dom, reference)
	}

	#[allow(clippy::too_many_lines)]
	#[instrument(skip(self, a, b, deferred, context), fields(a.len = a.len(), b.len = b.len()))]
	fn patch_keyed_children(&mut self, a: &[VNodeRef], b: &mut [VNodeRef], parent: NodeId, deferred: &mut Deferred, context: &Context, namespaced: bool) {
		let (mut a_start, mut b_start) = (0, 0);
		let (mut a_end, mut b_end) = (a.len(), b.len());

		while a_start < a_end && b_start < b_end && a[a_start].key == b[b_start].key {
			self.patch_keyed_pair(&a[a_start], &mut b[b_start], parent, deferred, context, namespaced);
			a_start += 1;
			b_start += 1;
		}
		while a_start < a_end && b_start < b_end && a[a_end - 1].key == b[b_end - 1].key {
			self.patch_keyed_pair(&a[a_end - 1], &mut b[b_end - 1], parent, deferred, context, namespaced);
			a_end -= 1;
			b_end -= 1;
		}

		if a_start == a_end {
			let reference = b.get(b_end).and_then(|node| node.dom());
			for node in &mut b[b_start..b_end] {
				self.insert_new(node, parent, reference, deferred, context, namespaced)
			}
			return;
		}
		if b_start == b_end {
			for previous in &a[a_start..a_end] {
				self.remove(previous, parent)
			}
			return;
		}

		let a_left = a_end - a_start;
		let b_left = b_end - b_start;
		let mut sources: Vec<Option<usize>> = vec![None; b_left];
		let mut consumed = vec![false; a_left];
		let mut moved = false;
		let mut position = 0;
		let mut patched = 0;

		let key_index = if self.options.matches_by_scan(a_left, b_left) {
			trace!("Matching keys by scanning.");
			None
		} else {
			trace!("Matching keys through index.");
			let mut key_index = HashMap::with_capacity(b_left);
			for j in b_start..b_end {
				if let Some(key) = &b[j].key {
					key_index.insert(key.clone(), j);
				}
			}
			Some(key_index)
		};

		for i in a_start..a_end {
			if patched >= b_left {
				break;
			}
			let found = match &key_index {
				None => (b_start..b_end).find(|&j| sources[j - b_start].is_none() && a[i].key == b[j].key),
				Some(key_index) => a[i].key.as_ref().and_then(|key| key_index.get(key)).copied().filter(|&j| sources[j - b_start].is_none()),
			};
			let j = match found {
				Some(j) => j,
				None => continue,
			};

			sources[j - b_start] = Some(i);
			if position > j {
				moved = true;
			} else {
				position = j;
			}
			self.patch_keyed_pair(&a[i], &mut b[j], parent, deferred, context, namespaced);
			consumed[i - a_start] = true;
			patched += 1;
		}

		if patched == 0 && a_left == a.len() {
			trace!("No keys in common. Replacing all children.");
			self.remove_all_children(parent, a);
			return self.mount_array_children(b, parent, deferred, context, namespaced);
		}

		for (previous, _) in a[a_start..a_end].iter().zip(consumed).filter(|&(_, consumed)| !consumed) {
			self.remove(previous, parent)
		}

		if moved {
			let keep = longest_increasing_subsequence(&sources);
			trace!("Keeping {} of {} matched node(s) in place.", keep.len(), patched);
			let mut keep = keep.iter().rev().peekable();
			for offset in (0..b_left).rev() {
				let position = offset + b_start;
				let reference = b.get(position + 1).and_then(|node| node.dom());
				if sources[offset].is_none() {
					self.insert_new(&mut b[position], parent, reference, deferred, context, namespaced)
				} else if keep.peek() == Some(&&offset) {
					keep.next();
				} else {
					match b[position].dom() {
						Some(dom) => self.host.insert_before(parent, dom, reference),
						None => error!("Matched keyed node {:?} has no native node to move.", b[position].key),
					}
				}
			}
		} else if patched != b_left {
			for offset in (0..b_left).rev() {
				if sources[offset].is_none() {
					let position = offset + b_start;
					let reference = b.get(position + 1).and_then(|node| node.dom());
					self.insert_new(&mut b[position], parent, reference, deferred, context, namespaced)
				}
			}
		}
	}

	fn patch_text(&mut self, previous: &VNodeRef, next: &VNodeRef, a: &Rc<str>, b: &Rc<str>, parent: NodeId) {
		#[cfg(feature = "dangerous-logging")]
		let span = trace_span!("Patching text", previous = &**a, next = &**b);
		#[cfg(not(feature = "dangerous-logging"))]
		let span = trace_span!("Patching text");
		let _enter = span.enter();

		if !self.host.has_child_nodes(parent) {
			warn!("Text node was removed from {} externally. Recreating it.", parent);
			let dom = self.host.set_text_content(parent, b);
			if let Some(detached) = previous.dom() {
				self.host.release(detached);
			}
			return next.set_dom(dom);
		}

		next.set_dom(previous.dom());
		if !Rc::ptr_eq(a, b) && a != b {
			match previous.dom() {
				Some(dom) => self.host.set_node_value(dom, b),
				None => error!("Expected previous text to be mounted."),
			}
		}
	}

	fn patch_portal(&mut self, previous: &VNodeRef, next: &VNodeRef, a: &PortalNode, b: &PortalNode, deferred: &mut Deferred, context: &Context) {
		if !Rc::ptr_eq(&a.children, &b.children) {
			self.patch_children(&a.children, &b.children, a.container, deferred, context, false);
		}
		next.set_dom(previous.dom());

		if a.container != b.container {
			let relocated = match b.children.try_borrow().as_deref() {
				Ok(Children::Single(node)) => node.dom(),
				_ => None,
			};
			if let Some(dom) = relocated {
				trace!("Moving portal content to new container.");
				self.host.remove_child(a.container, dom);
				self.host.append_child(b.container, dom);
			}
		}
	}

	#[allow(clippy::too_many_arguments)]
	fn patch_component(&mut self, previous: &VNodeRef, next: &VNodeRef, a: &ComponentNode, b: &ComponentNode, parent: NodeId, deferred: &mut Deferred, context: &Context, namespaced: bool) {
		if !a.kind.same_type(&b.kind) || previous.key != next.key {
			return self.replace_with_new_node(previous, next, parent, deferred, context, namespaced);
		}

		match &b.kind {
			ComponentKind::Class(_) => {
				let instance = match a.instance() {
					Some(instance) => instance,
					None => {
						error!("Expected previous {} to be mounted. Recreating it.", a.kind.name());
						return self.replace_with_new_node(previous, next, parent, deferred, context, namespaced);
					}
				};
				instance.set_updating(true);
				let state = instance.state();
				self.update_class_instance(&instance, state, next, Rc::clone(&b.props), parent, deferred, context, namespaced, false, false);
				instance.set_owner(next);
				instance.set_updating(false);
			}

			ComponentKind::Function(function) => {
				let last_input = match a.output() {
					Some(last_input) => last_input,
					None => {
						error!("Expected previous {} to be mounted. Recreating it.", a.kind.name());
						return self.replace_with_new_node(previous, next, parent, deferred, context, namespaced);
					}
				};
				next.set_dom(previous.dom());
				b.set_child(ComponentChild::Output(Rc::clone(&last_input)));

				let hooks = b.hooks.as_deref();
				let should_update = hooks.and_then(|hooks| hooks.should_update.as_ref()).map_or(true, |should_update| should_update(&a.props, &b.props));
				if !should_update {
					trace!("Update skipped by hook.");
					return last_input.set_owner(next);
				}

				if let Some(will_update) = hooks.and_then(|hooks| hooks.will_update.as_ref()) {
					will_update(&a.props, &b.props)
				}
				match function.call(&b.props, context) {
					Rendered::Unchanged => last_input.set_owner(next),
					rendered => {
						let next_input = handle_component_input(rendered, Some(&last_input), next);
						self.patch(&last_input, &next_input, parent, deferred, context, namespaced);
						next.set_dom(next_input.dom());
						b.set_child(ComponentChild::Output(next_input));
						if let Some(did_update) = hooks.and_then(|hooks| hooks.did_update.as_ref()) {
							did_update(&a.props, &b.props)
						}
					}
				}
			}
		}
	}

	/// Updates a class instance towards `next_props` and `next_state` and re-renders it unless it declines to.
	///
	/// `next` becomes the node holding the instance. Its native node is updated to that of the instance's output.
	#[allow(clippy::too_many_arguments)]
	pub(crate) fn update_class_instance(
		&mut self,
		instance: &Rc<ClassInstance>,
		next_state: State,
		next: &VNodeRef,
		next_props: props::Props,
		parent: NodeId,
		deferred: &mut Deferred,
		context: &Context,
		namespaced: bool,
		force: bool,
		from_state_change: bool,
	) {
		if let VNodeKind::Component(component) = &next.kind {
			component.set_child(ComponentChild::Instance(Rc::clone(instance)));
		}
		if instance.is_unmounted() {
			return error!("Can only update a mounted component, but {} was unmounted. Ignoring the update.", instance.name());
		}

		let (previous_props, previous_state, last_input) = {
			let inner = instance.inner.borrow();
			(Rc::clone(&inner.props), Rc::clone(&inner.state), Rc::clone(&inner.last_input))
		};

		if (!Rc::ptr_eq(&previous_props, &next_props) || next_props.is_empty()) && !from_state_change {
			let mut queue = StateQueue::default();
			instance.inner.borrow_mut().component.will_receive_props(&next_props, context, &mut queue);
			if let Some(patch) = queue.take() {
				instance.queue_pending(patch);
			}
		}
		let next_state = instance.merge_pending(next_state);

		let render = force || instance.inner.borrow_mut().component.should_update(&next_props, &next_state, context);
		if !render {
			trace!("Update skipped by `should_update`.");
			let mut inner = instance.inner.borrow_mut();
			inner.props = next_props;
			inner.state = next_state;
			inner.context = Rc::clone(context);
			drop(inner);
			last_input.set_owner(next);
			return next.set_dom(last_input.dom());
		}

		let (rendered, child_context) = {
			let mut inner = instance.inner.borrow_mut();
			let inner = &mut *inner;
			inner.component.will_update(&next_props, &next_state, context);
			inner.props = Rc::clone(&next_props);
			inner.state = next_state;
			inner.context = Rc::clone(context);

			if let Some(before_render) = &self.options.before_render {
				before_render(&*inner.component)
			}
			let rendered = inner.component.render(&inner.props, &inner.state, context);
			if let Some(after_render) = &self.options.after_render {
				after_render(&*inner.component)
			}

			let child_context = match inner.component.child_context() {
				Some(entries) => merge(context, &entries),
				None => Rc::clone(context),
			};
			inner.child_context = Rc::clone(&child_context);
			(rendered, child_context)
		};

		if let Rendered::Unchanged = rendered {
			trace!("Render output unchanged.");
			last_input.set_owner(next);
			return next.set_dom(last_input.dom());
		}

		let next_input = handle_component_input(rendered, Some(&last_input), next);
		instance.inner.borrow_mut().last_input = Rc::clone(&next_input);
		self.patch(&last_input, &next_input, parent, deferred, &child_context, namespaced);

		let mut queue = StateQueue::default();
		instance.inner.borrow_mut().component.did_update(&previous_props, &previous_state, &mut queue);
		if let Some(patch) = queue.take() {
			instance.queue_pending(patch);
		}
		if let Some(after_update) = &self.options.after_update {
			after_update(next)
		}
		next.set_dom(next_input.dom());
	}

	/// Merges `patch` into the state of a mounted class instance and re-renders it in place.
	///
	/// While the instance is updating, the change is kept pending for its next update instead.
	#[instrument(skip(self, patch, deferred))]
	pub fn set_state(&mut self, instance: &Rc<ClassInstance>, patch: PropMap, deferred: &mut Deferred) {
		if instance.is_unmounted() {
			return error!("Can't set the state of unmounted {}. Ignoring it.", instance.name());
		}
		if instance.is_updating() {
			trace!("Instance is updating. Keeping the state change pending.");
			return instance.queue_pending(patch);
		}
		let state = merge(&instance.state(), &patch);
		self.apply_state(instance, state, deferred, false)
	}

	/// Re-renders a mounted class instance in place, bypassing [`Component::should_update`](`crate::Component::should_update`).
	#[instrument(skip(self, deferred))]
	pub fn force_update(&mut self, instance: &Rc<ClassInstance>, deferred: &mut Deferred) {
		if instance.is_unmounted() {
			return error!("Can't force an update of unmounted {}. Ignoring it.", instance.name());
		}
		if instance.is_updating() {
			return warn!("Can't force an update of {} while it is updating. Ignoring it.", instance.name());
		}
		let state = instance.state();
		self.apply_state(instance, state, deferred, true)
	}

	fn apply_state(&mut self, instance: &Rc<ClassInstance>, state: State, deferred: &mut Deferred, force: bool) {
		let owner = match instance.owner() {
			Some(owner) => owner,
			None => return error!("{} has no owning node. Ignoring the update.", instance.name()),
		};
		let last_dom = instance.last_input().dom();
		let parent = match last_dom.and_then(|dom| self.host.parent_node(dom)) {
			Some(parent) => parent,
			None => return error!("{} isn't attached to a parent node. Ignoring the update.", instance.name()),
		};

		let props = instance.props();
		let context = instance.context();
		instance.set_updating(true);
		self.update_class_instance(instance, state, &owner, props, parent, deferred, &context, instance.namespaced.get(), force, true);
		instance.set_updating(false);

		let dom = owner.dom();
		if dom != last_dom {
			trace!("Propagating new native node up the owner chain.");
			let mut node = owner;
			while let Some(owner) = node.owner() {
				if !owner.is_component() {
					break;
				}
				owner.set_dom(dom);
				node = owner;
			}
		}
	}
}

/// Turns render output into a node that can be mounted, or patched against `previous`, owned by `owner`.
pub(crate) fn handle_component_input(rendered: Rendered, previous: Option<&VNodeRef>, owner: &VNodeRef) -> VNodeRef {
	let node = match rendered {
		Rendered::Node(mut node) => {
			match previous {
				Some(previous) => unalias_against(previous, &mut node),
				None => unalias(&mut node),
			}
			node
		}
		Rendered::Text(text) => Rc::new(VNode::text(text)),
		Rendered::Nothing => Rc::new(VNode::void()),
		Rendered::Unchanged => {
			warn!("There is no previous output to keep. Rendering nothing instead.");
			Rc::new(VNode::void())
		}
	};
	node.set_owner(owner);
	node
}

fn warn_duplicate_keys(nodes: &[VNodeRef]) {
	if cfg!(debug_assertions) && STATIC_MAX_LEVEL >= Level::WARN {
		let mut seen = HashSet::with_capacity(nodes.len());
		for key in nodes.iter().filter_map(|node| node.key.as_ref()) {
			if !seen.insert(key) {
				warn!("Duplicate key {:?} in keyed list. Sibling order is unspecified.", key);
			}
		}
	}
}
