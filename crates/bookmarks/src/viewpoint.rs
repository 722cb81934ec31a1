//! Slot-based viewpoint bookmarks.
//!
//! A viewpoint is a saved camera pose (pivot, rotation, zoom, 2D flag)
//! with an optional preview image, stored per container in numbered
//! slots. Slot 0 is reserved: every recall first saves the caller's
//! current pose there, so "return to previous view" is itself a recall of
//! slot 0. Capturing the preview pixels is the host's business; the core
//! only carries the bytes.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{BookmarkError, Result};
use crate::store::{KeyScheme, PrefStore};

/// Slot that always holds the pose from before the last recall.
pub const PREVIOUS_VIEW_SLOT: u8 = 0;

/// Highest addressable slot.
pub const MAX_SLOT: u8 = 9;

/// A saved camera pose with an optional preview image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewpoint {
	pub pivot: [f32; 3],
	/// Orientation quaternion (x, y, z, w).
	pub rotation: [f32; 4],
	/// Zoom/orbit size.
	pub size: f32,
	#[serde(rename = "in2DMode")]
	pub in_2d_mode: bool,
	pub preview: Option<Preview>,
}

impl Default for Viewpoint {
	fn default() -> Self {
		Self {
			pivot: [0.0; 3],
			rotation: [0.0, 0.0, 0.0, 1.0],
			size: 10.0,
			in_2d_mode: false,
			preview: None,
		}
	}
}

/// Preview image payload: PNG bytes carried as base64 text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
	pub width: u32,
	pub height: u32,
	pub data: String,
}

impl Preview {
	/// Wraps already-encoded PNG bytes.
	pub fn from_png(width: u32, height: u32, bytes: &[u8]) -> Self {
		Self {
			width,
			height,
			data: STANDARD.encode(bytes),
		}
	}

	/// Decodes the PNG bytes back out.
	pub fn png(&self) -> Result<Vec<u8>> {
		STANDARD.decode(&self.data).map_err(BookmarkError::Preview)
	}
}

/// Event emitted by a [`ViewpointShelf`] to its observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShelfEvent {
	/// A viewpoint was written to `slot`.
	Saved { slot: u8 },
	/// The viewpoint in `slot` was recalled.
	Recalled { slot: u8 },
	/// Every slot of the container was cleared.
	Cleared,
}

/// One container's numbered viewpoint slots in the preference store.
pub struct ViewpointShelf {
	keys: KeyScheme,
	container: String,
	observer: Option<Box<dyn FnMut(ShelfEvent)>>,
}

impl fmt::Debug for ViewpointShelf {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ViewpointShelf")
			.field("container", &self.container)
			.field("observed", &self.observer.is_some())
			.finish()
	}
}

impl ViewpointShelf {
	/// Creates the shelf for `container`.
	pub fn new(keys: KeyScheme, container: impl Into<String>) -> Self {
		Self {
			keys,
			container: container.into(),
			observer: None,
		}
	}

	pub fn container(&self) -> &str {
		&self.container
	}

	/// Installs the shelf observer, replacing any previous one.
	pub fn set_observer(&mut self, observer: impl FnMut(ShelfEvent) + 'static) {
		self.observer = Some(Box::new(observer));
	}

	/// Returns true if `slot` holds a viewpoint.
	pub fn contains(&self, store: &dyn PrefStore, slot: u8) -> bool {
		slot <= MAX_SLOT && store.contains(&self.key(slot))
	}

	/// Returns true if a previous view is available to return to.
	pub fn has_previous(&self, store: &dyn PrefStore) -> bool {
		self.contains(store, PREVIOUS_VIEW_SLOT)
	}

	/// Writes `viewpoint` into `slot`.
	pub fn save(&mut self, store: &mut dyn PrefStore, slot: u8, viewpoint: &Viewpoint) -> Result<()> {
		self.check_slot(slot)?;
		let blob = serde_json::to_string(viewpoint)?;
		store.set(&self.key(slot), blob);
		if slot != PREVIOUS_VIEW_SLOT {
			tracing::info!(container = %self.container, slot, "viewpoint bookmarked");
		}
		self.notify(ShelfEvent::Saved { slot });
		Ok(())
	}

	/// Recalls the viewpoint in `slot`, if any.
	///
	/// On a hit, `current` is first saved into the previous-view slot so
	/// the move can be undone with [`recall_previous`](Self::recall_previous).
	/// A stored blob that no longer parses is treated as an empty slot.
	pub fn recall(
		&mut self,
		store: &mut dyn PrefStore,
		slot: u8,
		current: &Viewpoint,
	) -> Result<Option<Viewpoint>> {
		self.check_slot(slot)?;
		let Some(blob) = store.get(&self.key(slot)) else {
			return Ok(None);
		};
		let loaded: Viewpoint = match serde_json::from_str(&blob) {
			Ok(viewpoint) => viewpoint,
			Err(error) => {
				tracing::warn!(container = %self.container, slot, %error, "dropping malformed viewpoint");
				return Ok(None);
			}
		};
		self.save(store, PREVIOUS_VIEW_SLOT, current)?;
		self.notify(ShelfEvent::Recalled { slot });
		Ok(Some(loaded))
	}

	/// Swaps back to the pose from before the last recall.
	pub fn recall_previous(
		&mut self,
		store: &mut dyn PrefStore,
		current: &Viewpoint,
	) -> Result<Option<Viewpoint>> {
		self.recall(store, PREVIOUS_VIEW_SLOT, current)
	}

	/// Deletes every slot of this container.
	pub fn clear(&mut self, store: &mut dyn PrefStore) {
		for slot in 0..=MAX_SLOT {
			store.remove(&self.key(slot));
		}
		tracing::info!(container = %self.container, "viewpoint shelf cleared");
		self.notify(ShelfEvent::Cleared);
	}

	fn key(&self, slot: u8) -> String {
		self.keys.viewpoint(&self.container, slot)
	}

	fn check_slot(&self, slot: u8) -> Result<()> {
		if slot > MAX_SLOT {
			return Err(BookmarkError::InvalidSlot { slot, max: MAX_SLOT });
		}
		Ok(())
	}

	fn notify(&mut self, event: ShelfEvent) {
		if let Some(observer) = &mut self.observer {
			observer(event);
		}
	}
}
