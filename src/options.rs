use crate::{component::Component, vnode::VNodeRef};
use core::fmt::{self, Debug, Formatter};

/// Differ configuration, including the hooks that observe every class component render.
pub struct Options {
	/// Called with each class component right before it renders.
	pub before_render: Option<Box<dyn Fn(&dyn Component)>>,
	/// Called with each class component right after it rendered.
	pub after_render: Option<Box<dyn Fn(&dyn Component)>>,
	/// Called with the owning node after a class component's new output was patched in.
	pub after_update: Option<Box<dyn Fn(&VNodeRef)>>,
	/// Maximum nesting of [`Differ::patch`](`crate::Differ::patch`). Deeper subtrees are left alone and an error is logged.
	pub depth_limit: usize,
	/// Keyed lists with at most this many unmatched next nodes are matched by nested scan instead of through a key map.
	pub linear_scan_max_len: usize,
	/// Same as [`Options::linear_scan_max_len`], but for the product of unmatched previous and next nodes.
	pub linear_scan_max_product: usize,
}
impl Default for Options {
	fn default() -> Self {
		Self {
			before_render: None,
			after_render: None,
			after_update: None,
			depth_limit: 1024,
			linear_scan_max_len: 4,
			linear_scan_max_product: 16,
		}
	}
}
impl Options {
	/// Whether the unmatched middle of a keyed list, `a_left` previous and `b_left` next nodes, is matched by nested scan.
	pub(crate) fn matches_by_scan(&self, a_left: usize, b_left: usize) -> bool {
		b_left <= self.linear_scan_max_len || a_left.saturating_mul(b_left) <= self.linear_scan_max_product
	}
}
impl Debug for Options {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Options")
			.field("before_render", &self.before_render.is_some())
			.field("after_render", &self.after_render.is_some())
			.field("after_update", &self.after_update.is_some())
			.field("depth_limit", &self.depth_limit)
			.field("linear_scan_max_len", &self.linear_scan_max_len)
			.field("linear_scan_max_product", &self.linear_scan_max_product)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::Options;

	#[test]
	fn scan_thresholds() {
		let options = Options::default();
		assert!(options.matches_by_scan(5, 3));
		assert!(options.matches_by_scan(2, 2));
		assert!(!options.matches_by_scan(5, 5));
		assert!(!options.matches_by_scan(usize::MAX, usize::MAX));
	}

	#[test]
	fn huge_product_saturates() {
		let options = Options {
			linear_scan_max_len: 0,
			linear_scan_max_product: usize::MAX,
			..Options::default()
		};
		assert!(options.matches_by_scan(usize::MAX, 2));
	}
}
