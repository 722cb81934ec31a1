//! Top-level bookmark model: pinning, grouping, persistence.
//!
//! [`Pinboard`] owns the two group maps and the active-tab flag, routes
//! pins into the right group, and moves the whole set in and out of the
//! preference store and export files through the document codec. It holds
//! a clone of the host's [`GuidRegistry`] for resolution; bindings are
//! still pushed by the live objects' owners, never by the model.

use std::path::Path;

use indexmap::IndexMap;

use pinboard_guid::{Anchored, GuidRef, GuidRegistry};

use crate::asset::AssetBookmark;
use crate::codec::{DataWrapper, FORMAT_VERSION};
use crate::collection::ObjectCollection;
use crate::error::Result;
use crate::group::{AssetGroup, EventSink, GroupEvent, ObjectGroup};
use crate::store::{self, KeyScheme, PrefStore};

/// The whole bookmark set of one host product.
///
/// Group maps keep insertion order, so captured documents are stable
/// across repeated save/load cycles.
#[derive(Debug)]
pub struct Pinboard<H> {
	registry: GuidRegistry<H>,
	asset_groups: IndexMap<String, AssetGroup>,
	object_groups: IndexMap<String, ObjectGroup<H>>,
	asset_tab_active: bool,
	keys: KeyScheme,
	events: EventSink,
}

impl<H: Clone> Pinboard<H> {
	/// Creates an empty pinboard for `product`, resolving through `registry`.
	pub fn new(product: &str, registry: GuidRegistry<H>) -> Self {
		Self {
			registry,
			asset_groups: IndexMap::new(),
			object_groups: IndexMap::new(),
			asset_tab_active: false,
			keys: KeyScheme::new(product),
			events: EventSink::disconnected(),
		}
	}

	/// The registry this pinboard resolves through.
	pub fn registry(&self) -> &GuidRegistry<H> {
		&self.registry
	}

	/// The preference-store key scheme for this product.
	pub fn keys(&self) -> &KeyScheme {
		&self.keys
	}

	/// Installs the group observer, replacing any previous one.
	///
	/// The observer hears visibility transitions and persist requests from
	/// every group, keyed by the group's key.
	pub fn set_observer(&self, observer: impl FnMut(&str, GroupEvent) + 'static) {
		self.events.replace(observer);
	}

	/// Whether the asset tab was the last one used.
	pub fn asset_tab_active(&self) -> bool {
		self.asset_tab_active
	}

	pub fn set_asset_tab_active(&mut self, active: bool) {
		self.asset_tab_active = active;
	}

	/// Looks up the asset group for `key`.
	pub fn asset_group(&self, key: &str) -> Option<&AssetGroup> {
		self.asset_groups.get(key)
	}

	/// Looks up the object group for `key`.
	pub fn object_group(&self, key: &str) -> Option<&ObjectGroup<H>> {
		self.object_groups.get(key)
	}

	/// Iterates asset groups in insertion order.
	pub fn asset_groups(&self) -> impl Iterator<Item = &AssetGroup> {
		self.asset_groups.values()
	}

	/// Iterates object groups in insertion order.
	pub fn object_groups(&self) -> impl Iterator<Item = &ObjectGroup<H>> {
		self.object_groups.values()
	}

	/// Pins an asset entry into the group named by its kind tag.
	///
	/// Returns false on a duplicate id (idempotent pin). A successful pin
	/// opens the group and switches to the asset tab.
	pub fn pin_asset(&mut self, asset: AssetBookmark) -> bool {
		let key = asset.kind.clone();
		let name = asset.name.clone();
		let group = self.asset_group_mut(&key);
		let added = group.add(asset);
		if added {
			group.set_open(true);
			self.asset_tab_active = true;
			tracing::info!(group = %key, asset = %name, "asset bookmarked");
		}
		added
	}

	/// Pins a live object into the group named by its container.
	pub fn pin_object(&mut self, target: &impl Anchored) -> bool {
		let reference = GuidRef::of(target);
		let key = reference.cached_container().to_string();
		let name = reference.cached_name().to_string();
		let added = self.object_group_mut(&key).add_ref(reference);
		if added {
			self.asset_tab_active = false;
			tracing::info!(group = %key, object = %name, "object bookmarked");
		}
		added
	}

	/// Pins a prepared collection into the group named by its container.
	///
	/// Returns false if the group already holds a collection of that name.
	pub fn pin_collection(&mut self, collection: ObjectCollection<H>) -> bool {
		let key = collection.container().to_string();
		let name = collection.name().to_string();
		let added = self.object_group_mut(&key).add_collection(collection);
		if added {
			self.asset_tab_active = false;
			tracing::info!(group = %key, collection = %name, "collection bookmarked");
		}
		added
	}

	/// Flattens the whole set into its persisted document.
	pub fn capture(&self) -> DataWrapper {
		let mut data = DataWrapper::new();
		for group in self.object_groups.values() {
			data.references
				.extend(group.refs().iter().map(GuidRef::to_data));
			data.collections
				.extend(group.collections().iter().map(ObjectCollection::to_data));
		}
		for (key, group) in &self.asset_groups {
			data.assets.extend(group.items().iter().cloned());
			if !group.is_open() {
				data.closed_group_keys.push(key.clone());
			}
		}
		data.asset_tab_active = self.asset_tab_active;
		data
	}

	/// Merges a persisted document into the current set.
	///
	/// Unseen group keys get fresh groups; everything else flows through
	/// the groups' `add` dedup, so applying the same document twice leaves
	/// the set unchanged.
	pub fn apply(&mut self, data: DataWrapper) {
		if data.version > FORMAT_VERSION {
			tracing::warn!(
				version = data.version,
				"bookmark document from a newer format, unknown fields were dropped"
			);
		}
		for asset in data.assets {
			let key = asset.kind.clone();
			self.asset_group_mut(&key).add(asset);
		}
		for reference in data.references {
			let reference = GuidRef::from_data(reference);
			let key = reference.cached_container().to_string();
			self.object_group_mut(&key).add_ref(reference);
		}
		for collection in data.collections {
			let collection = ObjectCollection::from_data(collection);
			let key = collection.container().to_string();
			self.object_group_mut(&key).add_collection(collection);
		}
		for key in &data.closed_group_keys {
			if let Some(group) = self.asset_groups.get_mut(key) {
				group.set_open(false);
			}
		}
		self.asset_tab_active = data.asset_tab_active;
	}

	/// Writes the current set under the pinned key of `store`.
	pub fn save_prefs(&self, store: &mut dyn PrefStore) -> Result<()> {
		let blob = self.capture().encode()?;
		store.set(&self.keys.pinned(), blob);
		tracing::debug!("bookmarks saved to preference store");
		Ok(())
	}

	/// Merges the pinned document from `store`, if one exists.
	///
	/// Returns false when the key is empty; a fresh install, not an error.
	pub fn load_prefs(&mut self, store: &dyn PrefStore) -> Result<bool> {
		let Some(blob) = store.get(&self.keys.pinned()) else {
			return Ok(false);
		};
		let data = DataWrapper::decode(&blob)?;
		self.apply(data);
		Ok(true)
	}

	/// Exports the current set to `path`.
	pub fn export_file(&self, path: &Path) -> Result<()> {
		store::export_to_file(path, &self.capture())
	}

	/// Imports and merges a previously exported file.
	///
	/// The file is fully read and decoded before the model is touched, so
	/// a failure leaves the in-memory set exactly as it was.
	pub fn import_file(&mut self, path: &Path) -> Result<()> {
		let data = store::import_from_file(path)?;
		self.apply(data);
		Ok(())
	}

	/// Empties every asset group and drops their key mappings.
	pub fn clear_assets(&mut self) {
		for group in self.asset_groups.values_mut() {
			group.remove_all();
		}
		self.asset_groups.clear();
	}

	/// Empties every object group and drops their key mappings.
	pub fn clear_objects(&mut self) {
		for group in self.object_groups.values_mut() {
			group.remove_all();
		}
		self.object_groups.clear();
	}

	/// Clears both domains.
	pub fn clear_all(&mut self) {
		self.clear_assets();
		self.clear_objects();
	}

	/// Sorts every group's contents and the group order itself, ascending.
	pub fn sort_all_ascending(&mut self) {
		for group in self.asset_groups.values_mut() {
			group.sort_ascending();
		}
		for group in self.object_groups.values_mut() {
			group.sort_ascending();
		}
		self.asset_groups.sort_keys();
		self.object_groups.sort_keys();
	}

	/// Sorts every group's contents and the group order itself, descending.
	pub fn sort_all_descending(&mut self) {
		for group in self.asset_groups.values_mut() {
			group.sort_descending();
		}
		for group in self.object_groups.values_mut() {
			group.sort_descending();
		}
		self.asset_groups.sort_by(|a, _, b, _| b.cmp(a));
		self.object_groups.sort_by(|a, _, b, _| b.cmp(a));
	}

	fn asset_group_mut(&mut self, key: &str) -> &mut AssetGroup {
		let events = self.events.clone();
		self.asset_groups
			.entry(key.to_string())
			.or_insert_with(|| AssetGroup::new(key, events))
	}

	fn object_group_mut(&mut self, key: &str) -> &mut ObjectGroup<H> {
		let events = self.events.clone();
		self.object_groups
			.entry(key.to_string())
			.or_insert_with(|| ObjectGroup::new(key, events))
	}
}
