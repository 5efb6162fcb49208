mod common;

use common::{count, setup};
use reconcile_dom::{element, props, shared_children, Children, Differ, EventHandler, MemoryHost, Mutation, NodeRef, Options, PropValue, RefCallback, VNode, VNodeRef};
use std::{
	cell::{Cell, RefCell},
	rc::Rc,
};

#[test]
fn identical_tree_is_a_no_op() {
	let (mut differ, container) = setup();
	let tree: VNodeRef = element("div").class_name("greeting").text("Hello!").into();
	let previous = differ.render(None, Some(tree), container);
	differ.host_mut().take_mutations();

	let next = differ.render(previous.as_ref(), previous.clone(), container);
	assert!(differ.host().mutations().is_empty());
	assert!(Rc::ptr_eq(&previous.unwrap(), &next.unwrap()));
}

#[test]
fn mounts_into_container() {
	let (mut differ, container) = setup();
	let tree: VNodeRef = element("p")
		.class_name("intro")
		.prop("title", "Greeting")
		.children(Children::unkeyed(vec![VNode::text("Hello, "), element("b").text("world").build()]))
		.into();
	differ.render(None, Some(tree), container);

	assert_eq!(differ.host().inner_html(container), r#"<p class="intro" title="Greeting">Hello, <b>world</b></p>"#);
}

#[test]
fn compatible_element_keeps_native_node() {
	let (mut differ, container) = setup();
	let previous = differ.render(None, Some(element("div").text("a").into()), container).unwrap();
	let dom = previous.dom();
	differ.host_mut().take_mutations();

	let next = differ.render(Some(&previous), Some(element("div").text("b").into()), container).unwrap();
	assert_eq!(next.dom(), dom);
	assert_eq!(differ.host().mutations(), [Mutation::SetNodeValue { node: next.children()[0].dom().unwrap() }]);
	assert_eq!(differ.host().inner_html(container), "<div>b</div>");
}

#[test]
fn different_tag_replaces() {
	let (mut differ, container) = setup();
	let previous = differ.render(None, Some(element("div").text("a").into()), container).unwrap();
	let old = previous.dom().unwrap();
	differ.host_mut().take_mutations();

	let next = differ.render(Some(&previous), Some(element("span").text("a").into()), container).unwrap();
	let new = next.dom().unwrap();
	assert_ne!(new, old);
	assert!(differ.host().mutations().contains(&Mutation::ReplaceChild { parent: container, new_child: new, old_child: old }));
	assert!(differ.host().is_released(old));
	assert_eq!(differ.host().inner_html(container), "<span>a</span>");
}

#[test]
fn different_kind_replaces() {
	let (mut differ, container) = setup();
	let previous = differ.render(None, Some(VNode::text("plain").into()), container).unwrap();
	let old = previous.dom().unwrap();

	let next = differ.render(Some(&previous), Some(element("em").text("plain").into()), container).unwrap();
	assert_ne!(next.dom().unwrap(), old);
	assert_eq!(differ.host().inner_html(container), "<em>plain</em>");
}

#[test]
fn recreating_node_is_never_patched() {
	let (mut differ, container) = setup();
	let previous = differ.render(None, Some(element("div").text("a").into()), container).unwrap();
	let old = previous.dom().unwrap();

	let next = differ.render(Some(&previous), Some(element("div").recreating().text("a").into()), container).unwrap();
	assert_ne!(next.dom().unwrap(), old);
	assert_eq!(differ.host().inner_html(container), "<div>a</div>");
}

#[test]
fn unchanged_property_values_are_skipped() {
	let (mut differ, container) = setup();
	let previous = differ.render(None, Some(element("a").prop("href", "/home").into()), container).unwrap();
	differ.host_mut().take_mutations();

	// Different props snapshot, same values.
	differ.render(Some(&previous), Some(element("a").prop("href", "/home").into()), container);
	assert!(differ.host().mutations().is_empty());
}

#[test]
fn removed_properties_by_kind() {
	let (mut differ, container) = setup();
	let handler = EventHandler::new(|_| ());
	let previous = differ
		.render(
			None,
			Some(
				element("input")
					.prop("title", "t")
					.prop("style", "color: red")
					.prop("value", "v")
					.prop("onClick", handler.clone())
					.prop("onFocus", handler)
					.prop("hidden", PropValue::Null)
					.into(),
			),
			container,
		)
		.unwrap();
	let dom = previous.dom().unwrap();
	differ.host_mut().take_mutations();

	differ.render(Some(&previous), Some(element("input").into()), container);
	let mutations = differ.host_mut().take_mutations();
	assert!(mutations.contains(&Mutation::RemoveAttribute { node: dom, name: "title".into() }));
	assert!(mutations.contains(&Mutation::RemoveAttribute { node: dom, name: "style".into() }));
	assert!(mutations.contains(&Mutation::ResetProperty { node: dom, name: "value".into() }));
	assert!(mutations.contains(&Mutation::RemoveEvent {
		node: dom,
		name: "onClick".into(),
		delegated: true,
	}));
	assert!(mutations.contains(&Mutation::RemoveEvent {
		node: dom,
		name: "onFocus".into(),
		delegated: false,
	}));
	// Null values were never applied and aren't removed.
	assert_eq!(mutations.len(), 5);
	assert_eq!(differ.host().property(dom, "value"), Some(&PropValue::Str("".into())));
}

#[test]
fn select_value_resets_to_null() {
	let (mut differ, container) = setup();
	let previous = differ.render(None, Some(element("select").prop("value", "b").into()), container).unwrap();
	let dom = previous.dom().unwrap();

	differ.render(Some(&previous), Some(element("select").into()), container);
	assert_eq!(differ.host().property(dom, "value"), Some(&PropValue::Null));
}

#[test]
fn removed_inner_html_clears_content() {
	let (mut differ, container) = setup();
	let previous = differ.render(None, Some(element("div").prop("innerHTML", PropValue::Html("<i>raw</i>".into())).into()), container).unwrap();
	assert_eq!(differ.host().inner_html(container), "<div><i>raw</i></div>");
	let dom = previous.dom().unwrap();
	differ.host_mut().take_mutations();

	differ.render(Some(&previous), Some(element("div").into()), container);
	assert!(differ.host().mutations().contains(&Mutation::SetTextContent { node: dom }));
}

#[test]
fn class_name_changes() {
	let (mut differ, container) = setup();
	let previous = differ.render(None, Some(element("div").class_name("a").into()), container).unwrap();
	let dom = previous.dom().unwrap();

	let next = differ.render(Some(&previous), Some(element("div").class_name("b").into()), container).unwrap();
	assert_eq!(differ.host().class_name(dom), Some("b"));

	differ.render(Some(&next), Some(element("div").into()), container);
	assert_eq!(differ.host().class_name(dom), None);
}

#[test]
fn svg_namespace_ends_inside_foreign_object() {
	let (mut differ, container) = setup();
	let tree: VNodeRef = element("svg")
		.children(Children::unkeyed(vec![
			element("circle"),
			element("foreignObject").child(element("div")),
		]))
		.into();
	let tree = differ.render(None, Some(tree), container).unwrap();

	let host = differ.host();
	let children = tree.children();
	assert!(host.is_namespaced(tree.dom().unwrap()));
	assert!(host.is_namespaced(children[0].dom().unwrap()));
	assert!(host.is_namespaced(children[1].dom().unwrap()));
	assert!(!host.is_namespaced(children[1].children()[0].dom().unwrap()));
}

#[test]
fn shared_children_are_skipped() {
	let (mut differ, container) = setup();
	let shared = shared_children(Children::Single(VNode::text("s").into()));
	let previous = differ.render(None, Some(element("div").shared_children(&shared).build().into()), container).unwrap();
	let dom = previous.dom().unwrap();
	differ.host_mut().take_mutations();

	differ.render(Some(&previous), Some(element("div").prop("title", "t").shared_children(&shared).build().into()), container);
	assert_eq!(differ.host().mutations(), [Mutation::SetProperty { node: dom, name: "title".into() }]);
}

#[test]
fn shared_children_between_siblings() {
	let (mut differ, container) = setup();
	let shared = shared_children(Children::Single(VNode::text("a").into()));
	let siblings = || -> VNodeRef {
		element("section")
			.children(Children::unkeyed(vec![
				Rc::new(element("div").shared_children(&shared).build()),
				Rc::new(element("div").shared_children(&shared).build()),
			]))
			.into()
	};

	let previous = differ.render(None, Some(siblings()), container).unwrap();
	assert_eq!(differ.host().inner_html(container), "<section><div>a</div><div>a</div></section>");
	let texts: Vec<_> = previous.children().iter().map(|div| div.children()[0].dom()).collect();
	assert_ne!(texts[0], texts[1]);

	let again = differ.render(Some(&previous), Some(siblings()), container).unwrap();
	assert_eq!(differ.host().inner_html(container), "<section><div>a</div><div>a</div></section>");

	let fresh: VNodeRef = element("section")
		.children(Children::unkeyed(vec![Rc::new(element("div").text("b").build()), Rc::new(element("div").text("b").build())]))
		.into();
	differ.render(Some(&again), Some(fresh), container);
	assert_eq!(differ.host().inner_html(container), "<section><div>b</div><div>b</div></section>");
}

#[test]
fn aliased_nodes_are_cloned() {
	let (mut differ, container) = setup();
	let item: VNodeRef = element("li").text("x").into();
	let tree = differ.render(None, Some(element("ul").children(Children::unkeyed(vec![item.clone(), item.clone()])).into()), container).unwrap();

	let children = tree.children();
	assert_eq!(children.len(), 2);
	assert_ne!(children[0].dom(), children[1].dom());
	assert_eq!(differ.host().inner_html(container), "<ul><li>x</li><li>x</li></ul>");
}

#[test]
fn aliased_root_is_cloned() {
	let (mut differ, container) = setup();
	let (mut other, other_container) = setup();
	let tree: VNodeRef = element("div").text("a").into();
	other.render(None, Some(Rc::clone(&tree)), other_container);

	let mounted = differ.render(None, Some(Rc::clone(&tree)), container).unwrap();
	assert!(!Rc::ptr_eq(&mounted, &tree));
	assert_eq!(differ.host().inner_html(container), "<div>a</div>");
}

#[test]
fn text_emptied_externally_is_recreated() {
	let (mut differ, container) = setup();
	let previous = differ.render(None, Some(element("div").text("a").into()), container).unwrap();
	let dom = previous.dom().unwrap();
	let detached = previous.children()[0].dom().unwrap();
	differ.host_mut().clear_externally(dom);

	let next = differ.render(Some(&previous), Some(element("div").text("b").into()), container).unwrap();
	assert_eq!(differ.host().inner_html(container), "<div>b</div>");
	assert_eq!(next.children()[0].dom(), differ.host().children(dom).first().copied());
	assert!(differ.host().is_released(detached));
}

#[test]
fn callback_refs() {
	let (mut differ, container) = setup();
	let seen = Rc::new(RefCell::new(Vec::new()));
	let node_ref = {
		let seen = Rc::clone(&seen);
		NodeRef::Callback(RefCallback::new(move |node| seen.borrow_mut().push(node)))
	};

	let tree = differ.render(None, Some(element("input").node_ref(node_ref).into()), container).unwrap();
	let dom = tree.dom();
	assert_eq!(*seen.borrow(), [dom]);

	differ.render(Some(&tree), None, container);
	assert_eq!(*seen.borrow(), [dom, None]);
	assert!(differ.host().children(container).is_empty());
}

#[test]
fn changed_ref_is_only_mounted() {
	let (mut differ, container) = setup();
	let calls = Rc::new(RefCell::new(Vec::new()));
	let named = |name: &'static str| {
		let calls = Rc::clone(&calls);
		NodeRef::Callback(RefCallback::new(move |node| calls.borrow_mut().push((name, node.is_some()))))
	};

	let previous = differ.render(None, Some(element("input").node_ref(named("first")).into()), container).unwrap();
	let next = differ.render(Some(&previous), Some(element("input").node_ref(named("second")).into()), container).unwrap();
	assert_eq!(*calls.borrow(), [("first", true), ("second", true)]);

	differ.render(Some(&next), None, container);
	assert_eq!(*calls.borrow(), [("first", true), ("second", true), ("second", false)]);
}

#[test]
fn refs_fire_after_children() {
	let (mut differ, container) = setup();
	let order = Rc::new(RefCell::new(Vec::new()));
	let named = |name: &'static str| {
		let order = Rc::clone(&order);
		NodeRef::Callback(RefCallback::new(move |node| {
			if node.is_some() {
				order.borrow_mut().push(name)
			}
		}))
	};

	differ.render(None, Some(element("div").node_ref(named("parent")).child(element("span").node_ref(named("child"))).into()), container);
	assert_eq!(*order.borrow(), ["child", "parent"]);
}

#[test]
fn named_refs_are_ignored() {
	let (mut differ, container) = setup();
	differ.render(None, Some(element("div").node_ref(NodeRef::Named("legacy".into())).into()), container);
	assert_eq!(differ.host().inner_html(container), "<div></div>");
}

#[test]
fn events_dispatch_and_bubble() {
	let (mut differ, container) = setup();
	let clicks = Rc::new(Cell::new(0));
	let handler = {
		let clicks = Rc::clone(&clicks);
		EventHandler::new(move |_| clicks.set(clicks.get() + 1))
	};
	let tree = differ
		.render(None, Some(element("form").prop("onClick", handler.clone()).child(element("button").prop("onClick", handler)).into()), container)
		.unwrap();

	let button = tree.children()[0].dom().unwrap();
	assert_eq!(differ.host().dispatch(button, "onClick", &()), 2);
	assert_eq!(clicks.get(), 2);
}

#[test]
fn portal_renders_into_container_and_follows_it() {
	let (mut differ, container) = setup();
	let first = differ.host_mut().create_container("aside");
	let second = differ.host_mut().create_container("aside");

	let portal = |target| -> VNodeRef { element("div").child(VNode::portal(target, Children::Single(element("span").text("p").into()))).into() };

	let previous = differ.render(None, Some(portal(first)), container).unwrap();
	assert_eq!(differ.host().inner_html(container), "<div></div>");
	assert_eq!(differ.host().inner_html(first), "<span>p</span>");

	let next = differ.render(Some(&previous), Some(portal(second)), container).unwrap();
	assert_eq!(differ.host().inner_html(first), "");
	assert_eq!(differ.host().inner_html(second), "<span>p</span>");

	differ.render(Some(&next), Some(element("div").into()), container);
	assert_eq!(differ.host().inner_html(second), "");
}

#[test]
fn depth_limit_stops_descending() {
	let mut host = MemoryHost::new();
	let container = host.create_container("main");
	let mut differ = Differ::with_options(host, Options { depth_limit: 2, ..Options::default() });

	let tree: VNodeRef = element("div").child(element("div").child(element("div").child(element("div")))).into();
	differ.render(None, Some(tree), container);
	assert_eq!(differ.host().inner_html(container), "<div><div></div></div>");
}

#[test]
fn removal_releases_subtree() {
	let (mut differ, container) = setup();
	let tree = differ.render(None, Some(element("div").child(element("span").text("x")).into()), container).unwrap();
	let div = tree.dom().unwrap();
	let span = tree.children()[0].dom().unwrap();
	let live = differ.host().live_count();

	differ.render(Some(&tree), None, container);
	assert!(differ.host().is_released(div));
	assert!(differ.host().is_released(span));
	assert_eq!(differ.host().live_count(), live - 3);
	assert_eq!(count(differ.host().mutations(), |mutation| matches!(mutation, Mutation::RemoveChild { .. })), 1);
}

#[test]
fn props_from_pairs() {
	let props = props([("a", 1), ("b", 2)]);
	assert_eq!(props.get("a"), Some(&PropValue::Number(1.0)));
}
