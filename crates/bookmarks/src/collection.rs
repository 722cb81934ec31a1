//! Named, atomic collections of stable references.

use pinboard_guid::{Anchored, GuidData, GuidRef, GuidRegistry};
use serde::{Deserialize, Serialize};

/// Persisted form of an [`ObjectCollection`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionData {
	pub name: String,
	#[serde(default)]
	pub container: String,
	#[serde(default)]
	pub members: Vec<GuidData>,
}

/// A named group of stable references treated as a single unit.
///
/// Members are deduplicated by guid; the collection is added, removed and
/// resolved wholesale, never member-by-member.
#[derive(Debug)]
pub struct ObjectCollection<H> {
	name: String,
	container: String,
	members: Vec<GuidRef<H>>,
}

impl<H> ObjectCollection<H> {
	/// Creates an empty collection.
	pub fn new(name: impl Into<String>, container: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			container: container.into(),
			members: Vec::new(),
		}
	}

	/// Pins a set of live objects as one collection.
	///
	/// The container tag is taken from the first object.
	pub fn gather<T: Anchored>(name: impl Into<String>, targets: &[T]) -> Self {
		let container = targets
			.first()
			.map(|t| t.container_name())
			.unwrap_or_default();
		let mut collection = Self::new(name, container);
		for target in targets {
			collection.push(GuidRef::of(target));
		}
		collection
	}

	/// Restores a collection from persisted data; resolution stays lazy.
	pub fn from_data(data: CollectionData) -> Self {
		let mut collection = Self::new(data.name, data.container);
		for member in data.members {
			collection.push(GuidRef::from_data(member));
		}
		collection
	}

	/// The persisted form of this collection.
	pub fn to_data(&self) -> CollectionData {
		CollectionData {
			name: self.name.clone(),
			container: self.container.clone(),
			members: self.members.iter().map(GuidRef::to_data).collect(),
		}
	}

	/// Appends a reference unless a member with the same guid exists.
	pub fn push(&mut self, reference: GuidRef<H>) -> bool {
		if self.members.iter().any(|m| m.guid() == reference.guid()) {
			return false;
		}
		self.members.push(reference);
		true
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn container(&self) -> &str {
		&self.container
	}

	pub fn members(&self) -> &[GuidRef<H>] {
		&self.members
	}

	pub fn len(&self) -> usize {
		self.members.len()
	}

	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}
}

impl<H: Clone + 'static> ObjectCollection<H> {
	/// A collection is broken while any member resolves to absent.
	///
	/// What to do about a broken collection (prompt for removal, disable
	/// select/focus) is the UI layer's call; the core only answers.
	pub fn is_broken(&self, registry: &GuidRegistry<H>) -> bool {
		self.members
			.iter()
			.any(|member| member.resolve(registry).is_none())
	}

	/// Resolves every member, or `None` if any is absent.
	///
	/// The collection acts as a single unit: it is never partially
	/// resolved.
	pub fn resolve_all(&self, registry: &GuidRegistry<H>) -> Option<Vec<H>> {
		self.members
			.iter()
			.map(|member| member.resolve(registry))
			.collect()
	}
}
