#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Durable object identity for a single-threaded interactive host.
//!
//! Live objects announce themselves to a [`GuidRegistry`] under a stable
//! 128-bit [`Guid`]; a [`GuidRef`] holds such a guid across destroy/recreate
//! cycles and lazily resolves it back to the current live handle. Bindings
//! are pushed by the objects' owners at creation/destruction time; the
//! registry never scans for anything.
//!
//! The registry is an explicit, constructible value rather than a process
//! global, so tests can run any number of independent registries.

pub mod error;
pub mod guid;
pub mod reference;
pub mod registry;

pub use error::{GuidError, Result};
pub use guid::Guid;
pub use reference::{Anchored, GuidData, GuidRef};
pub use registry::{DuplicatePolicy, GuidRegistry, RegisterOutcome, WatchGuard};
