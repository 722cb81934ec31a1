//! Error types for bookmark persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when persisting or restoring bookmarks.
#[derive(Debug, Error)]
pub enum BookmarkError {
	/// Error reading or writing an export file.
	#[error("I/O error accessing {path}: {error}")]
	Io {
		/// Path of the file that failed.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The document blob could not be encoded or was not JSON at all.
	#[error("malformed bookmark document: {0}")]
	Codec(#[from] serde_json::Error),

	/// The document blob was JSON but not an object.
	#[error("bookmark document must be a JSON object")]
	NotAnObject,

	/// A viewpoint slot outside the shelf range.
	#[error("invalid viewpoint slot {slot} (max {max})")]
	InvalidSlot {
		/// The slot that was requested.
		slot: u8,
		/// Highest addressable slot.
		max: u8,
	},

	/// A preview image payload that was not valid base64.
	#[error("invalid preview image payload: {0}")]
	Preview(base64::DecodeError),
}

/// Result type for bookmark operations.
pub type Result<T> = std::result::Result<T, BookmarkError>;
