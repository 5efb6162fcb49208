//! The virtual tree.
//!
//! [`VNode`]s are immutable snapshots once built, except for the handles the differ maintains on them:
//! The native [`NodeId`] they currently represent, the rendered output or instance of components and the owner back-reference.

use crate::{
	component::{ClassInstance, ComponentClass, FunctionComponent, FunctionHooks},
	host::NodeId,
	props::{PropValue, Props},
};
use core::{
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
};
use std::rc::{Rc, Weak};
use tracing::error;

pub type VNodeRef = Rc<VNode>;

/// Ordering identity among siblings in a keyed list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
	Int(i64),
	Str(Rc<str>),
}
impl From<i64> for Key {
	fn from(key: i64) -> Self {
		Self::Int(key)
	}
}
impl From<i32> for Key {
	fn from(key: i32) -> Self {
		Self::Int(key.into())
	}
}
impl From<&str> for Key {
	fn from(key: &str) -> Self {
		Self::Str(key.into())
	}
}
impl From<String> for Key {
	fn from(key: String) -> Self {
		Self::Str(key.into())
	}
}

#[derive(Clone)]
pub struct RefCallback(Rc<dyn Fn(Option<NodeId>)>);
impl RefCallback {
	pub fn new(callback: impl 'static + Fn(Option<NodeId>)) -> Self {
		Self(Rc::new(callback))
	}

	pub fn call(&self, node: Option<NodeId>) {
		(self.0)(node)
	}
}
impl PartialEq for RefCallback {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}
impl Debug for RefCallback {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("RefCallback").field(&Rc::as_ptr(&self.0).cast::<()>()).finish()
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeRef {
	/// Called with the native node once it's in place, and with [`None`] on teardown.
	Callback(RefCallback),
	/// String refs. Unsupported: These are reported and ignored.
	Named(Rc<str>),
}

/// Children of an element or portal. The shape doubles as cardinality tag.
#[derive(Debug, Clone)]
pub enum Children {
	None,
	Single(VNodeRef),
	/// `keyed` lists are diffed by [`VNode::key`] if the previous list is keyed too.
	Multiple { nodes: Vec<VNodeRef>, keyed: bool },
}
impl Default for Children {
	fn default() -> Self {
		Self::None
	}
}
impl Children {
	/// A list that is keyed iff it's non-empty and every node has a key.
	pub fn list(nodes: impl IntoIterator<Item = impl Into<VNodeRef>>) -> Self {
		let nodes: Vec<VNodeRef> = nodes.into_iter().map(Into::into).collect();
		let keyed = !nodes.is_empty() && nodes.iter().all(|node| node.key.is_some());
		Self::Multiple { nodes, keyed }
	}

	/// Like [`Children::list`], but never keyed.
	pub fn unkeyed(nodes: impl IntoIterator<Item = impl Into<VNodeRef>>) -> Self {
		Self::Multiple {
			nodes: nodes.into_iter().map(Into::into).collect(),
			keyed: false,
		}
	}

	#[must_use]
	pub fn nodes(&self) -> &[VNodeRef] {
		match self {
			Self::None => &[],
			Self::Single(node) => core::slice::from_ref(node),
			Self::Multiple { nodes, .. } => nodes,
		}
	}
}

pub(crate) type ChildCell = Rc<RefCell<Children>>;

#[derive(Debug)]
pub struct ElementNode {
	pub tag: Rc<str>,
	pub props: Option<Props>,
	pub class_name: Option<Rc<str>>,
	pub(crate) children: ChildCell,
	pub node_ref: Option<NodeRef>,
}

#[derive(Debug, Clone)]
pub enum ComponentKind {
	Class(Rc<ComponentClass>),
	Function(Rc<FunctionComponent>),
}
impl ComponentKind {
	#[must_use]
	pub fn is_class(&self) -> bool {
		matches!(self, Self::Class(_))
	}

	/// Identity comparison. Two components are the same type only if they are the same [`Rc`].
	#[must_use]
	pub fn same_type(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Class(a), Self::Class(b)) => Rc::ptr_eq(a, b),
			(Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}

	#[must_use]
	pub fn name(&self) -> &'static str {
		match self {
			Self::Class(class) => class.name(),
			Self::Function(function) => function.name(),
		}
	}
}

#[derive(Debug, Clone)]
pub(crate) enum ComponentChild {
	Unmounted,
	Instance(Rc<ClassInstance>),
	Output(VNodeRef),
}

#[derive(Debug)]
pub struct ComponentNode {
	pub kind: ComponentKind,
	pub props: Props,
	/// Lifecycle hooks of function components. Ignored for class components.
	pub hooks: Option<Rc<FunctionHooks>>,
	pub(crate) child: RefCell<ComponentChild>,
}
impl ComponentNode {
	pub(crate) fn instance(&self) -> Option<Rc<ClassInstance>> {
		match &*self.child.borrow() {
			ComponentChild::Instance(instance) => Some(Rc::clone(instance)),
			ComponentChild::Unmounted | ComponentChild::Output(_) => None,
		}
	}

	pub(crate) fn output(&self) -> Option<VNodeRef> {
		match &*self.child.borrow() {
			ComponentChild::Output(output) => Some(Rc::clone(output)),
			ComponentChild::Unmounted | ComponentChild::Instance(_) => None,
		}
	}

	pub(crate) fn set_child(&self, child: ComponentChild) {
		*self.child.borrow_mut() = child;
	}
}

#[derive(Debug)]
pub struct PortalNode {
	/// The foreign container the children are rendered into.
	pub container: NodeId,
	pub(crate) children: ChildCell,
}

#[derive(Debug)]
pub enum VNodeKind {
	Element(ElementNode),
	Component(ComponentNode),
	Text(Rc<str>),
	/// Content-free marker, mounted as empty text node.
	Void,
	Portal(PortalNode),
}

pub struct VNode {
	pub kind: VNodeKind,
	pub key: Option<Key>,
	/// Opts out of reuse: A recreating node is never patched, only replaced.
	pub recreate: bool,
	dom: Cell<Option<NodeId>>,
	owner: RefCell<Weak<VNode>>,
}
impl Debug for VNode {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("VNode")
			.field("kind", &self.kind)
			.field("key", &self.key)
			.field("recreate", &self.recreate)
			.field("dom", &self.dom.get())
			.finish_non_exhaustive()
	}
}

impl VNode {
	fn new(kind: VNodeKind) -> Self {
		Self {
			kind,
			key: None,
			recreate: false,
			dom: Cell::new(None),
			owner: RefCell::new(Weak::new()),
		}
	}

	pub fn text(text: impl Into<Rc<str>>) -> Self {
		Self::new(VNodeKind::Text(text.into()))
	}

	#[must_use]
	pub fn void() -> Self {
		Self::new(VNodeKind::Void)
	}

	/// Renders `children` into the foreign `container`. A [`Children::Single`] child follows the portal if it's moved to another container.
	#[must_use]
	pub fn portal(container: NodeId, children: Children) -> Self {
		Self::new(VNodeKind::Portal(PortalNode {
			container,
			children: Rc::new(RefCell::new(children)),
		}))
	}

	#[must_use]
	pub fn class_component(class: &Rc<ComponentClass>, props: Props) -> Self {
		Self::component(ComponentKind::Class(Rc::clone(class)), props)
	}

	#[must_use]
	pub fn function_component(function: &Rc<FunctionComponent>, props: Props) -> Self {
		Self::component(ComponentKind::Function(Rc::clone(function)), props)
	}

	fn component(kind: ComponentKind, props: Props) -> Self {
		Self::new(VNodeKind::Component(ComponentNode {
			kind,
			props,
			hooks: None,
			child: RefCell::new(ComponentChild::Unmounted),
		}))
	}

	#[must_use]
	pub fn with_key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	#[must_use]
	pub fn recreating(mut self) -> Self {
		self.recreate = true;
		self
	}

	/// Attaches function component hooks. No effect on other kinds of node.
	#[must_use]
	pub fn with_hooks(mut self, hooks: FunctionHooks) -> Self {
		if let VNodeKind::Component(component) = &mut self.kind {
			component.hooks = Some(Rc::new(hooks));
		}
		self
	}

	/// The native node this node currently represents.
	#[must_use]
	pub fn dom(&self) -> Option<NodeId> {
		self.dom.get()
	}

	pub(crate) fn set_dom(&self, dom: Option<NodeId>) {
		self.dom.set(dom)
	}

	pub(crate) fn take_dom(&self) -> Option<NodeId> {
		self.dom.take()
	}

	/// The component node that rendered this node, if this is a component's output.
	#[must_use]
	pub fn owner(&self) -> Option<VNodeRef> {
		self.owner.borrow().upgrade()
	}

	pub(crate) fn set_owner(&self, owner: &VNodeRef) {
		*self.owner.borrow_mut() = Rc::downgrade(owner);
	}

	#[must_use]
	pub fn is_component(&self) -> bool {
		matches!(self.kind, VNodeKind::Component(_))
	}

	/// The class instance behind a mounted class component node.
	#[must_use]
	pub fn instance(&self) -> Option<Rc<ClassInstance>> {
		match &self.kind {
			VNodeKind::Component(component) => component.instance(),
			_ => None,
		}
	}

	/// The last rendered output of a mounted component node.
	#[must_use]
	pub fn rendered(&self) -> Option<VNodeRef> {
		match &self.kind {
			VNodeKind::Component(component) => component.output().or_else(|| component.instance().map(|instance| instance.last_input())),
			_ => None,
		}
	}

	/// A snapshot of this node's children. Empty for nodes without children.
	#[must_use]
	pub fn children(&self) -> Vec<VNodeRef> {
		match &self.kind {
			VNodeKind::Element(ElementNode { children, .. }) | VNodeKind::Portal(PortalNode { children, .. }) => children.borrow().nodes().to_vec(),
			VNodeKind::Component(_) | VNodeKind::Text(_) | VNodeKind::Void => Vec::new(),
		}
	}

	fn child_cell(&self) -> Option<&ChildCell> {
		match &self.kind {
			VNodeKind::Element(ElementNode { children, .. }) | VNodeKind::Portal(PortalNode { children, .. }) => Some(children),
			VNodeKind::Component(_) | VNodeKind::Text(_) | VNodeKind::Void => None,
		}
	}

	/// Structural clone without any native handle, for nodes that would otherwise be mounted twice.
	///
	/// Properties and the class name are shared. The child list is copied, so that alias clones written into it
	/// don't show up in the original.
	#[must_use]
	pub fn direct_clone(&self) -> VNodeRef {
		let kind = match &self.kind {
			VNodeKind::Element(element) => VNodeKind::Element(ElementNode {
				tag: Rc::clone(&element.tag),
				props: element.props.clone(),
				class_name: element.class_name.clone(),
				children: copy_children(&element.children),
				node_ref: element.node_ref.clone(),
			}),
			VNodeKind::Component(component) => VNodeKind::Component(ComponentNode {
				kind: component.kind.clone(),
				props: Rc::clone(&component.props),
				hooks: component.hooks.clone(),
				child: RefCell::new(ComponentChild::Unmounted),
			}),
			VNodeKind::Text(text) => VNodeKind::Text(Rc::clone(text)),
			VNodeKind::Void => VNodeKind::Void,
			VNodeKind::Portal(portal) => VNodeKind::Portal(PortalNode {
				container: portal.container,
				children: copy_children(&portal.children),
			}),
		};
		Rc::new(Self {
			kind,
			key: self.key.clone(),
			recreate: self.recreate,
			dom: Cell::new(None),
			owner: RefCell::new(Weak::new()),
		})
	}
}

/// Replaces `node` with a [`VNode::direct_clone`] if it already owns a native node,
/// or if its child list is already mounted under another element.
pub(crate) fn unalias(node: &mut VNodeRef) {
	if node.dom().is_some() || node.child_cell().map_or(false, is_mounted) {
		*node = node.direct_clone();
	}
}

/// Like [`unalias`] for a `next` node that is about to be patched against `previous`.
///
/// A child list shared with `previous` is the same native content and is left as-is.
pub(crate) fn unalias_against(previous: &VNodeRef, next: &mut VNodeRef) {
	if Rc::ptr_eq(previous, next) {
		return;
	}
	let shares_children = match (previous.child_cell(), next.child_cell()) {
		(Some(a), Some(b)) => Rc::ptr_eq(a, b),
		_ => false,
	};
	if next.dom().is_some() || (!shares_children && next.child_cell().map_or(false, is_mounted)) {
		*next = next.direct_clone();
	}
}

/// A list that is borrowed right now is treated as mounted.
fn is_mounted(children: &ChildCell) -> bool {
	children.try_borrow().map_or(true, |children| children.nodes().iter().any(|node| node.dom().is_some()))
}

fn copy_children(children: &ChildCell) -> ChildCell {
	let copy = match children.try_borrow() {
		Ok(children) => children.clone(),
		Err(_) => {
			error!("Child list is borrowed while cloning its element. Cloning without children.");
			Children::None
		}
	};
	Rc::new(RefCell::new(copy))
}

/// Starts an [`ElementNode`].
pub fn element(tag: impl Into<Rc<str>>) -> ElementBuilder {
	ElementBuilder {
		tag: tag.into(),
		key: None,
		recreate: false,
		props: None,
		class_name: None,
		children: Children::None,
		node_ref: None,
	}
}

#[derive(Debug)]
#[must_use]
pub struct ElementBuilder {
	tag: Rc<str>,
	key: Option<Key>,
	recreate: bool,
	props: Option<crate::props::PropMap>,
	class_name: Option<Rc<str>>,
	children: Children,
	node_ref: Option<NodeRef>,
}
impl ElementBuilder {
	pub fn key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	pub fn recreating(mut self) -> Self {
		self.recreate = true;
		self
	}

	pub fn prop(mut self, name: impl Into<Rc<str>>, value: impl Into<PropValue>) -> Self {
		self.props.get_or_insert_with(Default::default).insert(name.into(), value.into());
		self
	}

	pub fn class_name(mut self, class_name: impl Into<Rc<str>>) -> Self {
		self.class_name = Some(class_name.into());
		self
	}

	pub fn child(mut self, child: impl Into<VNodeRef>) -> Self {
		self.children = Children::Single(child.into());
		self
	}

	/// Shorthand for a single text child.
	pub fn text(self, text: impl Into<Rc<str>>) -> Self {
		self.child(VNode::text(text))
	}

	pub fn children(mut self, children: Children) -> Self {
		self.children = children;
		self
	}

	pub fn node_ref(mut self, node_ref: NodeRef) -> Self {
		self.node_ref = Some(node_ref);
		self
	}

	pub fn build(self) -> VNode {
		self.build_with_props(None)
	}

	/// Builds with a shared props snapshot instead of the individually added ones.
	pub fn build_with_props(self, props: Option<Props>) -> VNode {
		let mut node = VNode::new(VNodeKind::Element(ElementNode {
			tag: self.tag,
			props: props.or_else(|| self.props.map(Rc::new)),
			class_name: self.class_name,
			children: Rc::new(RefCell::new(self.children)),
			node_ref: self.node_ref,
		}));
		node.key = self.key;
		node.recreate = self.recreate;
		node
	}
}
impl From<ElementBuilder> for VNode {
	fn from(builder: ElementBuilder) -> Self {
		builder.build()
	}
}
impl From<ElementBuilder> for VNodeRef {
	fn from(builder: ElementBuilder) -> Self {
		Rc::new(builder.build())
	}
}

/// Shares one child list between elements, which lets the differ skip it by reference.
pub fn shared_children(children: Children) -> SharedChildren {
	SharedChildren(Rc::new(RefCell::new(children)))
}

#[derive(Debug, Clone)]
pub struct SharedChildren(ChildCell);
impl ElementBuilder {
	pub fn shared_children(self, children: &SharedChildren) -> SharedElementBuilder {
		SharedElementBuilder {
			builder: self,
			children: Rc::clone(&children.0),
		}
	}
}

#[derive(Debug)]
#[must_use]
pub struct SharedElementBuilder {
	builder: ElementBuilder,
	children: ChildCell,
}
impl SharedElementBuilder {
	pub fn build(self) -> VNode {
		self.build_with_props(None)
	}

	pub fn build_with_props(self, props: Option<Props>) -> VNode {
		let mut node = self.builder.build_with_props(props);
		if let VNodeKind::Element(element) = &mut node.kind {
			element.children = self.children;
		}
		node
	}
}
