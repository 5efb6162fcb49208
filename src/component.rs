//! Stateful (class) and stateless (function) components.

use crate::{
	host::NodeId,
	props::{merge, Context, PropMap, PropValue, Props, State},
	vnode::{VNode, VNodeRef},
};
use core::{
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
};
use std::rc::{Rc, Weak};

/// What a render function produced.
#[derive(Debug, Clone)]
pub enum Rendered {
	Node(VNodeRef),
	/// Rendered as text node.
	Text(Rc<str>),
	/// Rendered as [`VNode::void`].
	Nothing,
	/// No visual change: The previous output stays as-is and isn't diffed.
	Unchanged,
}
impl From<VNode> for Rendered {
	fn from(node: VNode) -> Self {
		Self::Node(Rc::new(node))
	}
}
impl From<VNodeRef> for Rendered {
	fn from(node: VNodeRef) -> Self {
		Self::Node(node)
	}
}

/// Collects state changes requested from within lifecycle hooks.
///
/// Changes queued before rendering are merged into the state being rendered.
/// Changes queued while the instance is updating are kept pending until its next update.
#[derive(Debug, Default)]
pub struct StateQueue(Option<PropMap>);
impl StateQueue {
	pub fn set(&mut self, name: impl Into<Rc<str>>, value: impl Into<PropValue>) {
		self.0.get_or_insert_with(PropMap::new).insert(name.into(), value.into());
	}

	pub fn extend(&mut self, patch: PropMap) {
		self.0.get_or_insert_with(PropMap::new).extend(patch);
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_none()
	}

	pub(crate) fn take(&mut self) -> Option<PropMap> {
		self.0.take()
	}
}

/// Behaviour of a class component.
///
/// Every hook other than [`Component::render`] is optional.
/// [`Component::should_update`] returning `true` by default is the same as not guarding updates at all.
pub trait Component {
	fn initial_state(&mut self, props: &Props) -> PropMap {
		let _ = props;
		PropMap::new()
	}

	fn will_mount(&mut self, state: &mut StateQueue) {
		let _ = state;
	}

	fn render(&mut self, props: &Props, state: &State, context: &Context) -> Rendered;

	fn did_mount(&mut self) {}

	/// Called before an update with new props. State queued here is merged before [`Component::should_update`].
	fn will_receive_props(&mut self, next_props: &Props, context: &Context, state: &mut StateQueue) {
		let _ = (next_props, context, state);
	}

	fn should_update(&mut self, next_props: &Props, next_state: &State, context: &Context) -> bool {
		let _ = (next_props, next_state, context);
		true
	}

	fn will_update(&mut self, next_props: &Props, next_state: &State, context: &Context) {
		let _ = (next_props, next_state, context);
	}

	/// Called after the new output was patched in. State queued here is applied on the instance's next update.
	fn did_update(&mut self, previous_props: &Props, previous_state: &State, state: &mut StateQueue) {
		let _ = (previous_props, previous_state, state);
	}

	fn will_unmount(&mut self) {}

	/// Context entries provided to descendants, over the ambient context.
	fn child_context(&self) -> Option<PropMap> {
		None
	}
}

/// Identity and factory of a class component.
pub struct ComponentClass {
	name: &'static str,
	create: Box<dyn Fn(&Props, &Context) -> Box<dyn Component>>,
}
impl ComponentClass {
	pub fn new(name: &'static str, create: impl 'static + Fn(&Props, &Context) -> Box<dyn Component>) -> Rc<Self> {
		Rc::new(Self { name, create: Box::new(create) })
	}

	#[must_use]
	pub fn name(&self) -> &'static str {
		self.name
	}

	pub(crate) fn instantiate(&self, props: &Props, context: &Context) -> Box<dyn Component> {
		(self.create)(props, context)
	}
}
impl Debug for ComponentClass {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentClass").field("name", &self.name).finish_non_exhaustive()
	}
}

/// A stateless component. Its identity is the [`Rc`] it's created in.
pub struct FunctionComponent {
	name: &'static str,
	render: Box<dyn Fn(&Props, &Context) -> Rendered>,
}
impl FunctionComponent {
	pub fn new(name: &'static str, render: impl 'static + Fn(&Props, &Context) -> Rendered) -> Rc<Self> {
		Rc::new(Self { name, render: Box::new(render) })
	}

	#[must_use]
	pub fn name(&self) -> &'static str {
		self.name
	}

	pub(crate) fn call(&self, props: &Props, context: &Context) -> Rendered {
		(self.render)(props, context)
	}
}
impl Debug for FunctionComponent {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("FunctionComponent").field("name", &self.name).finish_non_exhaustive()
	}
}

type PropsHook = Box<dyn Fn(&Props, &Props)>;
type NodeHook = Box<dyn Fn(Option<NodeId>)>;

/// Optional lifecycle hooks attached to a function component node.
#[derive(Default)]
pub struct FunctionHooks {
	/// `(previous, next)`. Returning `false` skips re-rendering.
	pub should_update: Option<Box<dyn Fn(&Props, &Props) -> bool>>,
	pub will_update: Option<PropsHook>,
	pub did_update: Option<PropsHook>,
	pub did_mount: Option<NodeHook>,
	pub will_unmount: Option<NodeHook>,
}
impl Debug for FunctionHooks {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("FunctionHooks")
			.field("should_update", &self.should_update.is_some())
			.field("will_update", &self.will_update.is_some())
			.field("did_update", &self.did_update.is_some())
			.field("did_mount", &self.did_mount.is_some())
			.field("will_unmount", &self.will_unmount.is_some())
			.finish()
	}
}

pub(crate) struct InstanceState {
	pub(crate) component: Box<dyn Component>,
	pub(crate) props: Props,
	pub(crate) state: State,
	pub(crate) context: Context,
	pub(crate) child_context: Context,
	pub(crate) last_input: VNodeRef,
}

/// A mounted class component.
///
/// The differ keeps one of these per mounted class component node and hands the same instance on to each next node
/// that reuses it.
pub struct ClassInstance {
	name: &'static str,
	pub(crate) inner: RefCell<InstanceState>,
	pending: RefCell<Option<PropMap>>,
	updating: Cell<bool>,
	unmounted: Cell<bool>,
	pub(crate) namespaced: Cell<bool>,
	owner: RefCell<Weak<VNode>>,
}
impl Debug for ClassInstance {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClassInstance")
			.field("name", &self.name)
			.field("updating", &self.updating.get())
			.field("unmounted", &self.unmounted.get())
			.field("pending", &self.pending.borrow().is_some())
			.finish_non_exhaustive()
	}
}
impl ClassInstance {
	pub(crate) fn new(name: &'static str, state: InstanceState, namespaced: bool) -> Self {
		Self {
			name,
			inner: RefCell::new(state),
			pending: RefCell::new(None),
			updating: Cell::new(false),
			unmounted: Cell::new(false),
			namespaced: Cell::new(namespaced),
			owner: RefCell::new(Weak::new()),
		}
	}

	#[must_use]
	pub fn name(&self) -> &'static str {
		self.name
	}

	#[must_use]
	pub fn props(&self) -> Props {
		Rc::clone(&self.inner.borrow().props)
	}

	#[must_use]
	pub fn state(&self) -> State {
		Rc::clone(&self.inner.borrow().state)
	}

	#[must_use]
	pub fn context(&self) -> Context {
		Rc::clone(&self.inner.borrow().context)
	}

	/// The context this instance hands to its descendants.
	#[must_use]
	pub fn child_context(&self) -> Context {
		Rc::clone(&self.inner.borrow().child_context)
	}

	/// The last rendered output.
	#[must_use]
	pub fn last_input(&self) -> VNodeRef {
		Rc::clone(&self.inner.borrow().last_input)
	}

	#[must_use]
	pub fn is_updating(&self) -> bool {
		self.updating.get()
	}

	#[must_use]
	pub fn is_unmounted(&self) -> bool {
		self.unmounted.get()
	}

	#[must_use]
	pub fn has_pending_state(&self) -> bool {
		self.pending.borrow().is_some()
	}

	/// The component node currently owning this instance.
	#[must_use]
	pub fn owner(&self) -> Option<VNodeRef> {
		self.owner.borrow().upgrade()
	}

	pub(crate) fn set_owner(&self, owner: &VNodeRef) {
		*self.owner.borrow_mut() = Rc::downgrade(owner);
	}

	pub(crate) fn set_updating(&self, updating: bool) {
		self.updating.set(updating)
	}

	pub(crate) fn queue_pending(&self, patch: PropMap) {
		let mut pending = self.pending.borrow_mut();
		match &mut *pending {
			Some(pending) => pending.extend(patch),
			None => *pending = Some(patch),
		}
	}

	pub(crate) fn take_pending(&self) -> Option<PropMap> {
		self.pending.borrow_mut().take()
	}

	/// Merges pending state into `state`, if there is any.
	pub(crate) fn merge_pending(&self, state: State) -> State {
		match self.take_pending() {
			Some(pending) => merge(&state, &pending),
			None => state,
		}
	}

	pub(crate) fn did_mount(&self) {
		if !self.unmounted.get() {
			self.inner.borrow_mut().component.did_mount();
		}
	}

	pub(crate) fn will_unmount(&self) {
		self.inner.borrow_mut().component.will_unmount();
		self.unmounted.set(true);
	}
}

#[cfg(test)]
mod tests {
	use super::{ClassInstance, Component, InstanceState, Rendered};
	use crate::{
		props::{props, Context, PropMap, Props, State},
		vnode::VNode,
	};
	use std::{cell::Cell, rc::Rc};

	struct Empty(Rc<Cell<usize>>);
	impl Component for Empty {
		fn render(&mut self, _: &Props, _: &State, _: &Context) -> Rendered {
			Rendered::Nothing
		}

		fn did_mount(&mut self) {
			self.0.set(self.0.get() + 1)
		}
	}

	fn instance(mounts: &Rc<Cell<usize>>) -> ClassInstance {
		let empty = Rc::new(PropMap::new());
		ClassInstance::new(
			"Empty",
			InstanceState {
				component: Box::new(Empty(Rc::clone(mounts))),
				props: Rc::clone(&empty),
				state: Rc::clone(&empty),
				context: Rc::clone(&empty),
				child_context: empty,
				last_input: Rc::new(VNode::void()),
			},
			false,
		)
	}

	#[test]
	fn pending_state_accumulates() {
		let instance = instance(&Rc::default());
		assert!(!instance.has_pending_state());

		instance.queue_pending((*props([("a", 1)])).clone());
		instance.queue_pending((*props([("b", 2), ("a", 3)])).clone());
		assert!(instance.has_pending_state());

		let state = instance.merge_pending(props([("c", 0)]));
		assert_eq!(*state, *props([("a", 3), ("b", 2), ("c", 0)]));
		assert!(!instance.has_pending_state());

		let unchanged = props([("d", 4)]);
		assert!(Rc::ptr_eq(&instance.merge_pending(Rc::clone(&unchanged)), &unchanged));
	}

	#[test]
	fn unmounted_instance_skips_did_mount() {
		let mounts = Rc::default();
		let instance = instance(&mounts);
		instance.did_mount();
		assert_eq!(mounts.get(), 1);

		instance.will_unmount();
		assert!(instance.is_unmounted());
		instance.did_mount();
		assert_eq!(mounts.get(), 1);
	}
}
