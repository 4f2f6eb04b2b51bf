//! Artifact file transfer primitives for dlt-merge.
//!
//! Two operations, both taking a source *file* and a destination
//! *directory*:
//!
//! - [`copy_file`] — exclusive-create copy; never overwrites, and a
//!   failure mid-copy removes the partial destination file.
//! - [`move_file`] — hard-link-then-unlink within one filesystem, with
//!   a copy-then-unlink fallback when source and destination are on
//!   different devices. A move that cannot remove its source rolls the
//!   destination back rather than leaving a duplicate behind.
//!
//! # Design Rules
//!
//! 1. Argument-shape violations fail with
//!    [`TransferError::InvalidArgument`] before any I/O.
//! 2. [`TransferError::AlreadyExists`] is a distinguished variant so
//!    callers can tolerate a destination collision specifically.
//! 3. Other OS-level errors pass through with their original
//!    `io::ErrorKind` preserved.

pub mod error;
pub mod ops;

pub use error::{TransferError, TransferResult};
pub use ops::{copy_file, move_file};
