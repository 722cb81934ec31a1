//! The guid value type and its byte/text codecs.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::GuidError;

/// 128-bit globally-unique identifier for live-object identity.
///
/// Compared and hashed by raw bytes, independent of any in-memory pointer
/// or index. The canonical text form is the standard base64 encoding of
/// the 16 bytes; it is the only representation that appears in persisted
/// documents. Byte encode/decode are plain functions so the type stays
/// independent of any particular serialization framework.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Guid([u8; 16]);

impl Guid {
	/// The all-zero guid, used as the "never assigned" sentinel.
	pub const NIL: Guid = Guid([0; 16]);

	/// Generates a fresh random guid.
	pub fn random() -> Self {
		Guid(*uuid::Uuid::new_v4().as_bytes())
	}

	/// Builds a guid from its raw bytes.
	pub const fn from_bytes(bytes: [u8; 16]) -> Self {
		Guid(bytes)
	}

	/// Consumes the guid, returning its raw bytes.
	pub const fn into_bytes(self) -> [u8; 16] {
		self.0
	}

	/// Borrows the raw bytes.
	pub const fn as_bytes(&self) -> &[u8; 16] {
		&self.0
	}

	/// Returns true for the all-zero sentinel.
	pub fn is_nil(&self) -> bool {
		*self == Self::NIL
	}

	/// Encodes the canonical base64 text form.
	pub fn to_base64(&self) -> String {
		STANDARD.encode(self.0)
	}

	/// Decodes the canonical base64 text form.
	pub fn from_base64(text: &str) -> Result<Self, GuidError> {
		let bytes = STANDARD.decode(text)?;
		let bytes: [u8; 16] = bytes
			.try_into()
			.map_err(|rest: Vec<u8>| GuidError::Length(rest.len()))?;
		Ok(Guid(bytes))
	}
}

impl fmt::Display for Guid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_base64())
	}
}

impl fmt::Debug for Guid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Guid({})", self.to_base64())
	}
}

impl FromStr for Guid {
	type Err = GuidError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_base64(s)
	}
}

impl From<Guid> for String {
	fn from(guid: Guid) -> Self {
		guid.to_base64()
	}
}

impl TryFrom<String> for Guid {
	type Error = GuidError;

	fn try_from(text: String) -> Result<Self, Self::Error> {
		Self::from_base64(&text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn base64_round_trip() {
		let guid = Guid::random();
		let text = guid.to_base64();
		assert_eq!(Guid::from_base64(&text).unwrap(), guid);
	}

	#[test]
	fn byte_round_trip() {
		let bytes = [7u8; 16];
		assert_eq!(Guid::from_bytes(bytes).into_bytes(), bytes);
	}

	#[test]
	fn rejects_wrong_length() {
		// Valid base64, but only 4 bytes of payload.
		let err = Guid::from_base64("AAAAAA==").unwrap_err();
		assert!(matches!(err, GuidError::Length(4)));
	}

	#[test]
	fn rejects_bad_text() {
		assert!(matches!(
			Guid::from_base64("not base64!"),
			Err(GuidError::Decode(_))
		));
	}

	#[test]
	fn nil_sentinel() {
		assert!(Guid::NIL.is_nil());
		assert!(!Guid::random().is_nil());
	}

	#[test]
	fn random_guids_differ() {
		assert_ne!(Guid::random(), Guid::random());
	}

	#[test]
	fn serde_uses_text_form() {
		let guid = Guid::from_bytes([1u8; 16]);
		let json = serde_json::to_string(&guid).unwrap();
		assert_eq!(json, format!("\"{}\"", guid.to_base64()));
		let back: Guid = serde_json::from_str(&json).unwrap();
		assert_eq!(back, guid);
	}
}
