//! Merge engine for dlt-merge.
//!
//! Unions two or more download directories — each holding package
//! artifacts plus a `dltracker.json` metadata document — into a single
//! consistent destination. The last directory in the argument list is
//! the destination; the others are folded into it strictly left to
//! right.
//!
//! # Pieces
//!
//! - [`merge_record`] — pure field-union of two records with the same
//!   identity; any disagreeing field is a hard conflict.
//! - [`project`] — turns one source directory's document into an
//!   ordered list of pending records against the destination store:
//!   semver, then url, then git commits, then tags (whose filenames are
//!   resolved through the referenced semver records).
//! - [`merge`] — the orchestrator: validate, open, fold, persist, and
//!   (with [`MergeOptions::move_files`]) remove the source directories.
//!
//! Everything runs on one logical thread: directories, and records
//! within a directory, are processed strictly sequentially. That order
//! is a correctness requirement — records that other records reference
//! must be inserted first — and makes every merge deterministic.

pub mod error;
pub mod merge;
pub mod notify;
pub mod options;
pub mod project;
pub mod record_merge;

pub use error::{MergeError, MergeResult};
pub use merge::merge;
pub use notify::{NoticeLevel, Notify, NullNotify};
pub use options::MergeOptions;
pub use project::project;
pub use record_merge::merge_record;
