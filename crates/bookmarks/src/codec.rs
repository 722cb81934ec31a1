//! The versioned bookmark document and its tolerant codec.
//!
//! One flat document carries the entire bookmark set: loose references,
//! collections, asset entries, the closed-group keys and the active-tab
//! flag. The same JSON shape is stored under the preference-store key and
//! written to export files, so the two round-trip against each other
//! losslessly.
//!
//! Decoding is tolerant section by section: a malformed or missing section
//! falls back to its empty default without failing the sections around it.
//! Only a blob that is not a JSON object at all fails the whole load.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use pinboard_guid::GuidData;

use crate::asset::AssetBookmark;
use crate::collection::CollectionData;
use crate::error::{BookmarkError, Result};

/// Current schema version written by [`DataWrapper::new`].
///
/// Documents from before the version field decode as version 0.
pub const FORMAT_VERSION: u32 = 1;

/// The flat persisted form of the whole bookmark set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataWrapper {
	pub version: u32,
	pub references: Vec<GuidData>,
	pub collections: Vec<CollectionData>,
	pub assets: Vec<AssetBookmark>,
	#[serde(rename = "closedGroupKeys")]
	pub closed_group_keys: Vec<String>,
	#[serde(rename = "activeTabFlag")]
	pub asset_tab_active: bool,
}

impl DataWrapper {
	/// An empty document stamped with the current schema version.
	pub fn new() -> Self {
		Self {
			version: FORMAT_VERSION,
			..Self::default()
		}
	}

	/// Returns true if the document carries no bookmarks at all.
	pub fn is_empty(&self) -> bool {
		self.references.is_empty() && self.collections.is_empty() && self.assets.is_empty()
	}

	/// Encodes the document as its canonical JSON blob.
	pub fn encode(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}

	/// Decodes a JSON blob, section by section.
	///
	/// Each section fails independently: a malformed sub-list is dropped
	/// (with a warning) and decodes as empty rather than aborting the whole
	/// load. Fails only if the blob is not a JSON object.
	pub fn decode(blob: &str) -> Result<Self> {
		let value: Value = serde_json::from_str(blob)?;
		let Value::Object(map) = value else {
			return Err(BookmarkError::NotAnObject);
		};
		Ok(Self {
			version: section(&map, "version"),
			references: section(&map, "references"),
			collections: section(&map, "collections"),
			assets: section(&map, "assets"),
			closed_group_keys: section(&map, "closedGroupKeys"),
			asset_tab_active: section(&map, "activeTabFlag"),
		})
	}
}

fn section<T: DeserializeOwned + Default>(map: &Map<String, Value>, key: &str) -> T {
	let Some(value) = map.get(key) else {
		return T::default();
	};
	match serde_json::from_value(value.clone()) {
		Ok(parsed) => parsed,
		Err(error) => {
			tracing::warn!(key, %error, "dropping malformed bookmark section");
			T::default()
		}
	}
}

#[cfg(test)]
mod tests {
	use pinboard_guid::Guid;
	use pretty_assertions::assert_eq;

	use super::*;

	fn sample() -> DataWrapper {
		let mut data = DataWrapper::new();
		data.references.push(GuidData {
			guid: Guid::from_bytes([1; 16]),
			cached_name: "Player".into(),
			cached_container: "Main".into(),
		});
		data.collections.push(CollectionData {
			name: "Lights".into(),
			container: "Main".into(),
			members: vec![GuidData {
				guid: Guid::from_bytes([2; 16]),
				cached_name: "Key Light".into(),
				cached_container: "Main".into(),
			}],
		});
		data.assets.push(AssetBookmark::new("a1", "/m/a.obj", "A", "Model"));
		data.closed_group_keys.push("Model".into());
		data.asset_tab_active = true;
		data
	}

	#[test]
	fn encode_decode_round_trip() {
		let data = sample();
		let blob = data.encode().unwrap();
		let back = DataWrapper::decode(&blob).unwrap();
		assert_eq!(back, data);
	}

	#[test]
	fn round_trip_is_byte_stable() {
		let blob = sample().encode().unwrap();
		let again = DataWrapper::decode(&blob).unwrap().encode().unwrap();
		assert_eq!(again, blob);
	}

	#[test]
	fn empty_blob_decodes_to_defaults() {
		let data = DataWrapper::decode("{}").unwrap();
		assert_eq!(data, DataWrapper::default());
		assert_eq!(data.version, 0);
	}

	#[test]
	fn malformed_section_fails_independently() {
		// references is garbage; assets should still come through.
		let blob = r#"{
			"version": 1,
			"references": [{"guid": 42}],
			"assets": [{"id": "a1", "path": "/x", "name": "X", "type": "Model"}]
		}"#;
		let data = DataWrapper::decode(blob).unwrap();
		assert!(data.references.is_empty());
		assert_eq!(data.assets.len(), 1);
		assert_eq!(data.version, 1);
	}

	#[test]
	fn unknown_fields_are_ignored() {
		let blob = r#"{"version": 1, "futureSection": [1, 2, 3]}"#;
		let data = DataWrapper::decode(blob).unwrap();
		assert_eq!(data.version, 1);
		assert!(data.is_empty());
	}

	#[test]
	fn non_object_blob_is_an_error() {
		assert!(matches!(
			DataWrapper::decode("[1, 2]"),
			Err(BookmarkError::NotAnObject)
		));
		assert!(matches!(
			DataWrapper::decode("not json"),
			Err(BookmarkError::Codec(_))
		));
	}
}
