//! Error types for guid text decoding.

use thiserror::Error;

/// Errors that can occur when decoding the canonical guid text form.
#[derive(Debug, Error)]
pub enum GuidError {
	/// The text was not valid base64.
	#[error("invalid guid text: {0}")]
	Decode(#[from] base64::DecodeError),

	/// The decoded payload was not 16 bytes.
	#[error("guid payload must be 16 bytes, got {0}")]
	Length(usize),
}

/// Result type for guid operations.
pub type Result<T> = std::result::Result<T, GuidError>;
