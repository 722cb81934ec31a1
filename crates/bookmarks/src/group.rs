//! Category-keyed bookmark groups and their change notifications.
//!
//! Two group flavors mirror the two bookmark domains: [`AssetGroup`] holds
//! path-addressable entries keyed by kind tag, [`ObjectGroup`] holds loose
//! references plus collections keyed by container name. Both report
//! empty/non-empty transitions and persist-worthy mutations through a
//! shared [`EventSink`] so the (excluded) UI layer can show/hide the group
//! and schedule a save.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use pinboard_guid::GuidRef;

use crate::asset::AssetBookmark;
use crate::collection::ObjectCollection;

/// Notifications emitted by groups toward the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupEvent {
	/// The group transitioned from empty to non-empty.
	BecameVisible,
	/// The group transitioned (or was forced) to empty.
	BecameHidden,
	/// Contents changed in a way the host should persist now.
	PersistRequested,
}

/// Shared event sink handed to every group.
///
/// Cheap to clone; all clones dispatch into the same callback. The
/// callback receives the emitting group's key.
#[derive(Clone)]
pub struct EventSink {
	inner: Rc<RefCell<Box<dyn FnMut(&str, GroupEvent)>>>,
}

impl EventSink {
	/// Creates a sink dispatching into `observer`.
	pub fn new(observer: impl FnMut(&str, GroupEvent) + 'static) -> Self {
		Self {
			inner: Rc::new(RefCell::new(Box::new(observer))),
		}
	}

	/// A sink that drops every event.
	pub fn disconnected() -> Self {
		Self::new(|_, _| {})
	}

	/// Swaps the observer behind every clone of this sink.
	pub fn replace(&self, observer: impl FnMut(&str, GroupEvent) + 'static) {
		*self.inner.borrow_mut() = Box::new(observer);
	}

	pub(crate) fn emit(&self, key: &str, event: GroupEvent) {
		let mut observer = self.inner.borrow_mut();
		(*observer)(key, event);
	}
}

impl Default for EventSink {
	fn default() -> Self {
		Self::disconnected()
	}
}

impl fmt::Debug for EventSink {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("EventSink(..)")
	}
}

/// A group of path-addressable bookmarks sharing one kind tag.
///
/// An empty group is hidden from the view, but its key mapping stays in
/// memory until explicitly cleared by the model.
#[derive(Debug)]
pub struct AssetGroup {
	key: String,
	items: Vec<AssetBookmark>,
	open: bool,
	events: EventSink,
}

impl AssetGroup {
	/// Creates an empty group for `key`.
	pub fn new(key: impl Into<String>, events: EventSink) -> Self {
		Self {
			key: key.into(),
			items: Vec::new(),
			open: true,
			events,
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn items(&self) -> &[AssetBookmark] {
		&self.items
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Open/closed display flag.
	pub fn is_open(&self) -> bool {
		self.open
	}

	pub fn set_open(&mut self, open: bool) {
		self.open = open;
	}

	/// Appends `asset` unless an entry with the same id exists.
	///
	/// Returns false without mutation on a duplicate (idempotent pin).
	pub fn add(&mut self, asset: AssetBookmark) -> bool {
		if self.items.contains(&asset) {
			return false;
		}
		let was_empty = self.items.is_empty();
		self.items.push(asset);
		if was_empty {
			self.events.emit(&self.key, GroupEvent::BecameVisible);
		}
		true
	}

	/// Removes the entry at `index`, if any.
	pub fn remove(&mut self, index: usize) -> Option<AssetBookmark> {
		if index >= self.items.len() {
			return None;
		}
		let removed = self.items.remove(index);
		if self.items.is_empty() {
			self.events.emit(&self.key, GroupEvent::BecameHidden);
		}
		self.events.emit(&self.key, GroupEvent::PersistRequested);
		Some(removed)
	}

	/// Clears the group and forces the hidden state.
	pub fn remove_all(&mut self) {
		self.items.clear();
		self.events.emit(&self.key, GroupEvent::BecameHidden);
		self.events.emit(&self.key, GroupEvent::PersistRequested);
	}

	/// Moves the entry at `from` to position `to`.
	pub fn move_item(&mut self, from: usize, to: usize) -> bool {
		if from >= self.items.len() || to >= self.items.len() {
			return false;
		}
		if from != to {
			let item = self.items.remove(from);
			self.items.insert(to, item);
			self.events.emit(&self.key, GroupEvent::PersistRequested);
		}
		true
	}

	/// Stable sort by display name, ordinal byte-wise comparison.
	pub fn sort_ascending(&mut self) {
		self.items.sort_by(|a, b| a.name.cmp(&b.name));
	}

	/// Stable sort by display name, descending.
	pub fn sort_descending(&mut self) {
		self.items.sort_by(|a, b| b.name.cmp(&a.name));
	}
}

/// A group of loose references and collections sharing one container.
#[derive(Debug)]
pub struct ObjectGroup<H> {
	key: String,
	refs: Vec<GuidRef<H>>,
	collections: Vec<ObjectCollection<H>>,
	open: bool,
	events: EventSink,
}

impl<H> ObjectGroup<H> {
	/// Creates an empty group for `key`.
	pub fn new(key: impl Into<String>, events: EventSink) -> Self {
		Self {
			key: key.into(),
			refs: Vec::new(),
			collections: Vec::new(),
			open: true,
			events,
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn refs(&self) -> &[GuidRef<H>] {
		&self.refs
	}

	pub fn collections(&self) -> &[ObjectCollection<H>] {
		&self.collections
	}

	pub fn len(&self) -> usize {
		self.refs.len() + self.collections.len()
	}

	pub fn is_empty(&self) -> bool {
		self.refs.is_empty() && self.collections.is_empty()
	}

	/// Open/closed display flag.
	pub fn is_open(&self) -> bool {
		self.open
	}

	pub fn set_open(&mut self, open: bool) {
		self.open = open;
	}

	/// Appends `reference` unless one with the same guid exists.
	pub fn add_ref(&mut self, reference: GuidRef<H>) -> bool {
		if self.refs.contains(&reference) {
			return false;
		}
		let was_empty = self.is_empty();
		self.refs.push(reference);
		if was_empty {
			self.events.emit(&self.key, GroupEvent::BecameVisible);
		}
		true
	}

	/// Appends `collection` unless one with the same name exists.
	pub fn add_collection(&mut self, collection: ObjectCollection<H>) -> bool {
		if self.collections.iter().any(|c| c.name() == collection.name()) {
			return false;
		}
		let was_empty = self.is_empty();
		self.collections.push(collection);
		if was_empty {
			self.events.emit(&self.key, GroupEvent::BecameVisible);
		}
		true
	}

	/// Removes the loose reference at `index`, if any.
	pub fn remove_ref(&mut self, index: usize) -> Option<GuidRef<H>> {
		if index >= self.refs.len() {
			return None;
		}
		let removed = self.refs.remove(index);
		if self.is_empty() {
			self.events.emit(&self.key, GroupEvent::BecameHidden);
		}
		self.events.emit(&self.key, GroupEvent::PersistRequested);
		Some(removed)
	}

	/// Removes the collection at `index` as a whole unit, if any.
	pub fn remove_collection(&mut self, index: usize) -> Option<ObjectCollection<H>> {
		if index >= self.collections.len() {
			return None;
		}
		let removed = self.collections.remove(index);
		if self.is_empty() {
			self.events.emit(&self.key, GroupEvent::BecameHidden);
		}
		self.events.emit(&self.key, GroupEvent::PersistRequested);
		Some(removed)
	}

	/// Clears both lists and forces the hidden state.
	pub fn remove_all(&mut self) {
		self.refs.clear();
		self.collections.clear();
		self.events.emit(&self.key, GroupEvent::BecameHidden);
		self.events.emit(&self.key, GroupEvent::PersistRequested);
	}

	/// Moves the loose reference at `from` to position `to`.
	pub fn move_ref(&mut self, from: usize, to: usize) -> bool {
		if from >= self.refs.len() || to >= self.refs.len() {
			return false;
		}
		if from != to {
			let reference = self.refs.remove(from);
			self.refs.insert(to, reference);
			self.events.emit(&self.key, GroupEvent::PersistRequested);
		}
		true
	}

	/// Stable sort of both lists by display name, ordinal comparison.
	pub fn sort_ascending(&mut self) {
		self.refs.sort_by(|a, b| a.cached_name().cmp(b.cached_name()));
		self.collections.sort_by(|a, b| a.name().cmp(b.name()));
	}

	/// Stable sort of both lists by display name, descending.
	pub fn sort_descending(&mut self) {
		self.refs.sort_by(|a, b| b.cached_name().cmp(a.cached_name()));
		self.collections.sort_by(|a, b| b.name().cmp(a.name()));
	}
}
