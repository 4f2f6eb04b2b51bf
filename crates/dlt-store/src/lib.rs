//! Package metadata store for dlt-merge.
//!
//! A store owns one download directory and its `dltracker.json` metadata
//! document: a nested mapping with one top-level entry per record kind
//! (semver, tag, git, url). This crate covers the full store lifecycle:
//!
//! - [`PackageStore::open`] — load the document if present (with a
//!   consistency audit), or reconstruct it by scanning the directory's
//!   artifact filenames.
//! - [`PackageStore::add_record`] — insert a record, validating required
//!   fields per kind and indexing a git commit record's symbolic refs so
//!   they resolve as soon as the owning commit is present.
//! - [`PackageStore::serialize`] — persist the document back to disk.
//!
//! # Design Rules
//!
//! 1. Tag records never store a filename — it is always derived from the
//!    referenced semver record at lookup time.
//! 2. Symbolic git refs are stored as `{ "commit": <hash> }` entries and
//!    joined with their commit record's fields at lookup time.
//! 3. The audit only runs against a document that was actually loaded
//!    from disk; a reconstructed document is consistent by construction.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod document;
pub mod error;
pub mod filename;
pub mod store;

pub use document::Document;
pub use error::{AuditProblem, StoreError, StoreResult};
pub use filename::ParsedFilename;
pub use store::{PackageStore, MAP_FILENAME};
