//! Element and component property values.

use core::{
	any::Any,
	fmt::{self, Debug, Formatter},
};
use std::{collections::BTreeMap, rc::Rc};

/// Property bag, ordered so that property application is deterministic.
pub type PropMap = BTreeMap<Rc<str>, PropValue>;

/// Shared property snapshot. Reference equality of two [`Props`] means "unchanged".
pub type Props = Rc<PropMap>;

/// Component state, shaped like [`Props`].
pub type State = Props;

/// Ambient context handed down the tree, shaped like [`Props`].
pub type Context = Props;

/// Properties that can't be removed as attributes and are reset through the property instead.
pub const STRICT_PROPS: [&str; 4] = ["defaultChecked", "defaultValue", "value", "volume"];

/// Events a host may bind once at the root instead of on each element.
pub const DELEGATED_EVENTS: [&str; 9] = ["onClick", "onDblClick", "onKeyDown", "onKeyPress", "onKeyUp", "onMouseDown", "onMouseMove", "onMouseUp", "onSubmit"];

/// Raw markup content. Removing it clears the element's text content.
pub const INNER_HTML: &str = "innerHTML";

#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&dyn Any)>);
impl EventHandler {
	pub fn new(handler: impl 'static + Fn(&dyn Any)) -> Self {
		Self(Rc::new(handler))
	}

	pub fn call(&self, event: &dyn Any) {
		(self.0)(event)
	}
}
impl PartialEq for EventHandler {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}
impl Debug for EventHandler {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("EventHandler").field(&Rc::as_ptr(&self.0).cast::<()>()).finish()
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
	Null,
	Bool(bool),
	Number(f64),
	Str(Rc<str>),
	Event(EventHandler),
	/// Raw markup, see [`INNER_HTML`].
	Html(Rc<str>),
}
impl PropValue {
	#[must_use]
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) | Self::Html(s) => Some(s),
			_ => None,
		}
	}
}
impl From<&str> for PropValue {
	fn from(value: &str) -> Self {
		Self::Str(value.into())
	}
}
impl From<String> for PropValue {
	fn from(value: String) -> Self {
		Self::Str(value.into())
	}
}
impl From<Rc<str>> for PropValue {
	fn from(value: Rc<str>) -> Self {
		Self::Str(value)
	}
}
impl From<bool> for PropValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl From<f64> for PropValue {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}
impl From<i32> for PropValue {
	fn from(value: i32) -> Self {
		Self::Number(value.into())
	}
}
impl From<EventHandler> for PropValue {
	fn from(value: EventHandler) -> Self {
		Self::Event(value)
	}
}

/// Builds a [`Props`] snapshot.
pub fn props<K: Into<Rc<str>>, V: Into<PropValue>>(entries: impl IntoIterator<Item = (K, V)>) -> Props {
	Rc::new(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
}

/// `patch` entries win over `base` entries.
#[must_use]
pub fn merge(base: &PropMap, patch: &PropMap) -> Props {
	let mut merged = base.clone();
	merged.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));
	Rc::new(merged)
}

pub(crate) fn same(a: Option<&Props>, b: Option<&Props>) -> bool {
	match (a, b) {
		(None, None) => true,
		(Some(a), Some(b)) => Rc::ptr_eq(a, b),
		_ => false,
	}
}

/// Property names starting with `on` are event bindings.
#[must_use]
pub fn is_event(name: &str) -> bool {
	name.len() > 2 && name.starts_with("on")
}

/// Whether a form element's value is owned by its props rather than by the user.
pub(crate) fn is_controlled(tag: &str, props: &PropMap) -> bool {
	if !matches!(tag, "input" | "select" | "textarea") {
		return false;
	}
	let non_null = |name: &str| props.get(name).map_or(false, |value| !value.is_null());
	match props.get("type").and_then(PropValue::as_str) {
		Some("checkbox" | "radio") => non_null("checked"),
		_ => non_null("value"),
	}
}

/// How a property that disappeared from an element is taken off the native node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Removal {
	Reset { to_null: bool },
	Style,
	Event { delegated: bool },
	InnerHtml,
	Attribute,
}
impl Removal {
	pub(crate) fn classify(tag: &str, name: &str) -> Self {
		if STRICT_PROPS.contains(&name) {
			// An empty string is a valid option value, so `<select>`s are reset to `null`.
			Self::Reset { to_null: tag == "select" }
		} else if name == "style" {
			Self::Style
		} else if DELEGATED_EVENTS.contains(&name) {
			Self::Event { delegated: true }
		} else if is_event(name) {
			Self::Event { delegated: false }
		} else if name == INNER_HTML {
			Self::InnerHtml
		} else {
			Self::Attribute
		}
	}
}
