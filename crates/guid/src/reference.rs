//! Stable references: persisted guid + cached labels + live-handle cache.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::guid::Guid;
use crate::registry::{GuidRegistry, WatchGuard};

/// Live objects that can be pinned by guid.
///
/// The host's object model implements this at the seam; the core never
/// touches host types directly. Display metadata is captured once at pin
/// time and kept as the last-known label, never refreshed automatically.
pub trait Anchored {
	/// Stable identity of the object.
	fn guid(&self) -> Guid;
	/// Current display name.
	fn display_name(&self) -> String;
	/// Name of the container (scene, document, workspace) holding the object.
	fn container_name(&self) -> String;
}

/// Persisted form of a [`GuidRef`]: the guid plus its cached labels.
///
/// Equality and hashing are by guid only; the labels are display hints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidData {
	pub guid: Guid,
	#[serde(default)]
	pub cached_name: String,
	#[serde(default)]
	pub cached_container: String,
}

impl PartialEq for GuidData {
	fn eq(&self, other: &Self) -> bool {
		self.guid == other.guid
	}
}

impl Eq for GuidData {}

impl Hash for GuidData {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.guid.hash(state);
	}
}

/// A reference to a live object that survives destroy/recreate cycles.
///
/// Holds the object's [`Guid`] plus display metadata cached at pin time,
/// and a transient handle cache that the registry keeps honest: the first
/// [`resolve`](GuidRef::resolve) installs a watcher whose "added" callback
/// refills the cache and whose "removed" callback clears it. The cached
/// labels are untouched by invalidation; they remain the last-known name.
///
/// A reference subscribes to the first registry it resolves against and
/// stays attached to it for its lifetime; the watcher is cancelled when the
/// reference is dropped.
pub struct GuidRef<H> {
	guid: Guid,
	cached_name: String,
	cached_container: String,
	live: Rc<Cell<Option<H>>>,
	watch: RefCell<Option<WatchGuard<H>>>,
}

impl<H> GuidRef<H> {
	/// Pins a live object, capturing its guid and current labels.
	pub fn of(target: &impl Anchored) -> Self {
		Self::from_data(GuidData {
			guid: target.guid(),
			cached_name: target.display_name(),
			cached_container: target.container_name(),
		})
	}

	/// Restores a reference from persisted data without any live resolution.
	pub fn from_data(data: GuidData) -> Self {
		Self {
			guid: data.guid,
			cached_name: data.cached_name,
			cached_container: data.cached_container,
			live: Rc::new(Cell::new(None)),
			watch: RefCell::new(None),
		}
	}

	/// The persisted form: guid + cached labels, transient cache dropped.
	pub fn to_data(&self) -> GuidData {
		GuidData {
			guid: self.guid,
			cached_name: self.cached_name.clone(),
			cached_container: self.cached_container.clone(),
		}
	}

	/// Stable identity of the referenced object.
	pub fn guid(&self) -> Guid {
		self.guid
	}

	/// Last-known display name, captured at pin time.
	pub fn cached_name(&self) -> &str {
		&self.cached_name
	}

	/// Last-known container name, captured at pin time.
	pub fn cached_container(&self) -> &str {
		&self.cached_container
	}

	/// Returns true while the transient handle cache is populated.
	pub fn is_cached(&self) -> bool {
		let handle = self.live.take();
		let cached = handle.is_some();
		self.live.set(handle);
		cached
	}
}

impl<H: Clone + 'static> GuidRef<H> {
	/// Resolves to the current live handle, or `None` while absent.
	///
	/// Serves from the transient cache when populated; otherwise asks the
	/// registry, installing the add/remove watcher on first contact so a
	/// miss today still turns into a cached handle the moment the object
	/// registers.
	pub fn resolve(&self, registry: &GuidRegistry<H>) -> Option<H> {
		if let Some(handle) = self.peek() {
			return Some(handle);
		}
		if self.watch.borrow().is_some() {
			// Watcher already installed and the cache is empty: absent.
			return None;
		}
		let cache = Rc::clone(&self.live);
		let invalidate = Rc::clone(&self.live);
		let (found, guard) = registry.resolve(
			self.guid,
			move |handle: &H| cache.set(Some(handle.clone())),
			move || invalidate.set(None),
		);
		*self.watch.borrow_mut() = Some(guard);
		if let Some(handle) = &found {
			self.live.set(Some(handle.clone()));
		}
		found
	}

	fn peek(&self) -> Option<H> {
		let handle = self.live.take();
		if let Some(h) = &handle {
			self.live.set(Some(h.clone()));
		}
		handle
	}
}

impl<H> PartialEq for GuidRef<H> {
	fn eq(&self, other: &Self) -> bool {
		self.guid == other.guid
	}
}

impl<H> Eq for GuidRef<H> {}

impl<H> Hash for GuidRef<H> {
	fn hash<S: Hasher>(&self, state: &mut S) {
		self.guid.hash(state);
	}
}

impl<H> fmt::Debug for GuidRef<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GuidRef")
			.field("guid", &self.guid)
			.field("cached_name", &self.cached_name)
			.field("cached_container", &self.cached_container)
			.field("cached", &self.is_cached())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::registry::GuidRegistry;

	struct Node {
		guid: Guid,
		name: &'static str,
		container: &'static str,
	}

	impl Anchored for Node {
		fn guid(&self) -> Guid {
			self.guid
		}

		fn display_name(&self) -> String {
			self.name.to_string()
		}

		fn container_name(&self) -> String {
			self.container.to_string()
		}
	}

	fn node(name: &'static str) -> Node {
		Node {
			guid: Guid::random(),
			name,
			container: "Main",
		}
	}

	#[test]
	fn captures_labels_at_pin_time() {
		let target = node("Player");
		let reference: GuidRef<u32> = GuidRef::of(&target);
		assert_eq!(reference.guid(), target.guid);
		assert_eq!(reference.cached_name(), "Player");
		assert_eq!(reference.cached_container(), "Main");
	}

	#[test]
	fn resolve_caches_and_invalidates() {
		let registry = GuidRegistry::new();
		let target = node("Player");
		registry.register(target.guid, 11u32);

		let reference = GuidRef::of(&target);
		assert_eq!(reference.resolve(&registry), Some(11));
		assert!(reference.is_cached());

		registry.unregister(target.guid);
		assert!(!reference.is_cached());
		assert_eq!(reference.resolve(&registry), None);
		// Labels survive invalidation as the last-known display hint.
		assert_eq!(reference.cached_name(), "Player");
	}

	#[test]
	fn late_registration_fills_cache_through_watcher() {
		let registry = GuidRegistry::new();
		let target = node("Enemy");
		let reference = GuidRef::of(&target);

		assert_eq!(reference.resolve(&registry), None);
		registry.register(target.guid, 42u32);
		// No new registry call needed; the watcher refilled the cache.
		assert!(reference.is_cached());
		assert_eq!(reference.resolve(&registry), Some(42));
	}

	#[test]
	fn replacement_swaps_cached_handle() {
		let registry = GuidRegistry::new();
		let target = node("Camera");
		let reference = GuidRef::of(&target);
		registry.register(target.guid, 1u32);
		assert_eq!(reference.resolve(&registry), Some(1));
		registry.register(target.guid, 2u32);
		assert_eq!(reference.resolve(&registry), Some(2));
	}

	#[test]
	fn drop_cancels_watcher() {
		let registry = GuidRegistry::new();
		let target = node("Light");
		let reference = GuidRef::of(&target);
		assert_eq!(reference.resolve(&registry), None);
		drop(reference);
		// Registering afterwards must not touch freed state.
		registry.register(target.guid, 5u32);
		assert_eq!(registry.get(target.guid), Some(5));
	}

	#[test]
	fn equality_ignores_cached_metadata() {
		let guid = Guid::random();
		let a: GuidRef<u32> = GuidRef::from_data(GuidData {
			guid,
			cached_name: "Old Name".into(),
			cached_container: "A".into(),
		});
		let b: GuidRef<u32> = GuidRef::from_data(GuidData {
			guid,
			cached_name: "New Name".into(),
			cached_container: "B".into(),
		});
		assert_eq!(a, b);
	}

	#[test]
	fn data_round_trip_drops_transient_state() {
		let registry = GuidRegistry::new();
		let target = node("Prop");
		registry.register(target.guid, 9u32);
		let reference = GuidRef::of(&target);
		reference.resolve(&registry);
		assert!(reference.is_cached());

		let restored: GuidRef<u32> = GuidRef::from_data(reference.to_data());
		assert_eq!(restored, reference);
		assert!(!restored.is_cached());
		assert_eq!(restored.cached_name(), "Prop");
	}
}
