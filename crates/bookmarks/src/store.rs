//! Preference-store abstraction, key derivation, and export files.

use std::collections::HashMap;
use std::path::Path;

use crate::codec::DataWrapper;
use crate::error::{BookmarkError, Result};

/// The host's string key/value preference store.
///
/// The model keeps everything under keys derived by [`KeyScheme`]; the
/// host decides where the strings actually live.
pub trait PrefStore {
	/// Returns the value stored under `key`, if any.
	fn get(&self, key: &str) -> Option<String>;
	/// Stores `value` under `key`, replacing any previous value.
	fn set(&mut self, key: &str, value: String);
	/// Deletes the entry under `key`, if any.
	fn remove(&mut self, key: &str);

	/// Returns true if `key` currently holds a value.
	fn contains(&self, key: &str) -> bool {
		self.get(key).is_some()
	}
}

/// In-memory store for tests and ephemeral hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: HashMap<String, String>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl PrefStore for MemoryStore {
	fn get(&self, key: &str) -> Option<String> {
		self.entries.get(key).cloned()
	}

	fn set(&mut self, key: &str, value: String) {
		self.entries.insert(key.to_string(), value);
	}

	fn remove(&mut self, key: &str) {
		self.entries.remove(key);
	}
}

/// Derives the preference-store keys for one host product.
///
/// All keys share a deterministic host-identifying prefix so multiple
/// products can share one store without colliding.
#[derive(Debug, Clone)]
pub struct KeyScheme {
	prefix: String,
}

impl KeyScheme {
	/// Builds the scheme for `product`.
	pub fn new(product: &str) -> Self {
		Self {
			prefix: format!("{product}_PINBOARD_"),
		}
	}

	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	/// Key of the single pinned-bookmarks document.
	pub fn pinned(&self) -> String {
		format!("{}pinned", self.prefix)
	}

	/// Key of one viewpoint slot within a container.
	pub fn viewpoint(&self, container: &str, slot: u8) -> String {
		format!("{}{}_{}", self.prefix, container, slot)
	}
}

/// Writes `data` to `path` as the same JSON document the store holds.
pub fn export_to_file(path: &Path, data: &DataWrapper) -> Result<()> {
	let blob = data.encode()?;
	std::fs::write(path, blob).map_err(|error| BookmarkError::Io {
		path: path.to_path_buf(),
		error,
	})?;
	tracing::info!(path = %path.display(), "bookmarks exported");
	Ok(())
}

/// Reads a bookmark document back from `path`.
///
/// The whole file is read and decoded before anything else happens, so a
/// failure here leaves no partial state behind.
pub fn import_from_file(path: &Path) -> Result<DataWrapper> {
	let blob = std::fs::read_to_string(path).map_err(|error| BookmarkError::Io {
		path: path.to_path_buf(),
		error,
	})?;
	let data = DataWrapper::decode(&blob)?;
	tracing::info!(path = %path.display(), "bookmarks imported");
	Ok(data)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn key_scheme_is_deterministic() {
		let keys = KeyScheme::new("MyProject");
		assert_eq!(keys.pinned(), "MyProject_PINBOARD_pinned");
		assert_eq!(keys.viewpoint("Main", 3), "MyProject_PINBOARD_Main_3");
	}

	#[test]
	fn memory_store_basics() {
		let mut store = MemoryStore::new();
		assert!(!store.contains("k"));
		store.set("k", "v".to_string());
		assert_eq!(store.get("k"), Some("v".to_string()));
		store.remove("k");
		assert!(store.get("k").is_none());
	}

	#[test]
	fn file_round_trip_matches_store_blob() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("bookmarks.json");

		let mut data = DataWrapper::new();
		data.assets.push(crate::asset::AssetBookmark::new("a", "/a", "A", "Model"));
		export_to_file(&path, &data).unwrap();

		let restored = import_from_file(&path).unwrap();
		assert_eq!(restored, data);
		// The file carries exactly the blob a preference store would hold.
		assert_eq!(std::fs::read_to_string(&path).unwrap(), data.encode().unwrap());
	}

	#[test]
	fn import_missing_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("nope.json");
		assert!(matches!(
			import_from_file(&missing),
			Err(BookmarkError::Io { .. })
		));
	}
}
