#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Bookmark data model for a single-threaded interactive host.
//!
//! Built on [`pinboard_guid`]: path-addressable asset entries and
//! guid-backed object references, grouped by category, persisted as one
//! versioned JSON document to a key/value preference store and to export
//! files. Rendering, icons, drag-and-drop and the host's open/ping/select
//! actions live outside this crate; the model only reports visibility
//! transitions and persist requests through callbacks.
//!
//! # Module map
//!
//! - [`asset`] - path-addressable bookmark entries
//! - [`collection`] - named, atomic groups of stable references
//! - [`group`] - category-keyed groups and their change events
//! - [`codec`] - the versioned document and its tolerant codec
//! - [`store`] - preference-store seam, key derivation, export files
//! - [`model`] - the top-level pin/save/load/sort orchestration
//! - [`viewpoint`] - slot-based viewpoint bookmarks

pub mod asset;
pub mod codec;
pub mod collection;
pub mod error;
pub mod group;
pub mod model;
pub mod store;
pub mod viewpoint;

pub use asset::AssetBookmark;
pub use codec::{DataWrapper, FORMAT_VERSION};
pub use collection::{CollectionData, ObjectCollection};
pub use error::{BookmarkError, Result};
pub use group::{AssetGroup, EventSink, GroupEvent, ObjectGroup};
pub use model::Pinboard;
pub use store::{KeyScheme, MemoryStore, PrefStore};
pub use viewpoint::{MAX_SLOT, PREVIOUS_VIEW_SLOT, Preview, ShelfEvent, Viewpoint, ViewpointShelf};
