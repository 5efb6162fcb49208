#![allow(dead_code)]

use reconcile_dom::{element, Children, Differ, MemoryHost, Mutation, NodeId, VNodeRef};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
	static INIT: Once = Once::new();
	INIT.call_once(|| {
		let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_test_writer().try_init();
	});
}

pub fn setup() -> (Differ<MemoryHost>, NodeId) {
	init_tracing();
	let mut host = MemoryHost::new();
	let container = host.create_container("main");
	(Differ::new(host), container)
}

/// `<li>{key}</li>`, keyed by its text.
pub fn item(key: &str) -> VNodeRef {
	element("li").key(key).text(key).into()
}

pub fn keyed_list(keys: &[&str]) -> VNodeRef {
	element("ul").children(Children::list(keys.iter().map(|key| item(key)))).into()
}

pub fn unkeyed_list(texts: &[&str]) -> VNodeRef {
	element("ul").children(Children::unkeyed(texts.iter().map(|text| element("li").text(*text)))).into()
}

pub fn moves(mutations: &[Mutation]) -> usize {
	mutations.iter().filter(|mutation| mutation.is_move()).count()
}

pub fn count(mutations: &[Mutation], predicate: impl Fn(&Mutation) -> bool) -> usize {
	mutations.iter().filter(|mutation| predicate(mutation)).count()
}
