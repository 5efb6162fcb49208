use core::fmt::{self, Debug, Formatter};

/// Callbacks that must only run once the structural work they depend on is done.
///
/// Refs and mount notifications are pushed here in visitation order while diffing.
/// Whoever created the queue flushes it after the diff returns.
#[derive(Default)]
#[must_use]
pub struct Deferred(Vec<Box<dyn FnOnce()>>);
impl Deferred {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, callback: impl 'static + FnOnce()) {
		self.0.push(Box::new(callback))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Runs all queued callbacks in the order they were pushed.
	///
	/// Callbacks can't push onto this queue, so it's empty afterwards.
	pub fn flush(&mut self) {
		for callback in self.0.drain(..) {
			callback()
		}
	}
}
impl Debug for Deferred {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Deferred").field(&self.0.len()).finish()
	}
}
