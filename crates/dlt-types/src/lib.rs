//! Foundation types for dlt-merge.
//!
//! This crate provides the record model shared by the store and the merge
//! engine. Every other dlt crate depends on `dlt-types`.
//!
//! # Key Types
//!
//! - [`PackageKind`] — The four record kinds of a tracker document
//! - [`RecordId`] — A record's identity: kind plus its key(s)
//! - [`Record`] — An identity paired with its provenance field map

pub mod kind;
pub mod record;

pub use kind::PackageKind;
pub use record::{is_commit_hash, Fields, Record, RecordId};
pub use record::{FIELD_FILENAME, FIELD_REFS, FIELD_VERSION};
