//! Frame-coalesced scheduling with at most one outstanding render per entity.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::entity::EntityId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

/// Callbacks waiting for the next animation frame, fired in request order.
#[derive(Debug, Default)]
pub struct FrameQueue {
	next: u64,
	queued: IndexMap<FrameHandle, EntityId>,
}

impl FrameQueue {
	pub fn request(&mut self, id: EntityId) -> FrameHandle {
		let handle = FrameHandle(self.next);
		self.next += 1;
		self.queued.insert(handle, id);
		handle
	}

	/// `false` when the handle already fired or was cancelled.
	pub fn cancel(&mut self, handle: FrameHandle) -> bool {
		self.queued.shift_remove(&handle).is_some()
	}

	/// Everything due this frame. Requests made while the batch runs wait for the next one.
	pub fn take_due(&mut self) -> Vec<(FrameHandle, EntityId)> {
		self.queued.drain(..).collect()
	}

	pub fn len(&self) -> usize {
		self.queued.len()
	}

	pub fn is_empty(&self) -> bool {
		self.queued.is_empty()
	}
}

/// The pending-render registry: entity → outstanding frame and the data to render.
#[derive(Debug)]
pub struct PendingRenders<J> {
	entries: HashMap<EntityId, (FrameHandle, J)>,
}

impl<J> Default for PendingRenders<J> {
	fn default() -> Self {
		Self {
			entries: HashMap::new(),
		}
	}
}

impl<J> PendingRenders<J> {
	/// Cancels any outstanding frame for `id`, then requests a new one.
	/// Returns `true` if an earlier request was superseded.
	pub fn schedule(&mut self, frames: &mut FrameQueue, id: EntityId, job: J) -> bool {
		let superseded = self.cancel(frames, &id);
		let handle = frames.request(id.clone());
		self.entries.insert(id, (handle, job));
		superseded
	}

	pub fn cancel(&mut self, frames: &mut FrameQueue, id: &EntityId) -> bool {
		match self.entries.remove(id) {
			Some((handle, _)) => {
				frames.cancel(handle);
				true
			}
			None => false,
		}
	}

	/// Claims the job for a fired frame, if `handle` is still the current one for `id`.
	pub fn take(&mut self, id: &EntityId, handle: FrameHandle) -> Option<J> {
		match self.entries.get(id) {
			Some((current, _)) if *current == handle => self.entries.remove(id).map(|(_, job)| job),
			_ => None,
		}
	}

	pub fn contains(&self, id: &EntityId) -> bool {
		self.entries.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
