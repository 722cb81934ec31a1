//! Path-addressable bookmark entries.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A pinned, path-addressable item that needs no live-object resolution.
///
/// Equality and hashing are by `id` only; the remaining fields are display
/// and navigation hints. Immutable after creation except by removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetBookmark {
	/// Stable identity: a path hash or GUID string assigned by the host.
	pub id: String,
	/// Path the host uses to locate the item.
	#[serde(default)]
	pub path: String,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Category tag; doubles as the group key.
	#[serde(default, rename = "type")]
	pub kind: String,
}

impl AssetBookmark {
	/// Builds an entry from its parts.
	pub fn new(
		id: impl Into<String>,
		path: impl Into<String>,
		name: impl Into<String>,
		kind: impl Into<String>,
	) -> Self {
		Self {
			id: id.into(),
			path: path.into(),
			name: name.into(),
			kind: kind.into(),
		}
	}
}

impl PartialEq for AssetBookmark {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for AssetBookmark {}

impl Hash for AssetBookmark {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}
