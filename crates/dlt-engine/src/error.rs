use serde_json::Value;

use dlt_store::StoreError;
use dlt_transfer::TransferError;
use dlt_types::RecordId;

/// Errors from the merge engine.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The merge call itself was malformed (too few paths, an empty
    /// path, a duplicate path).
    #[error("{0}")]
    InvalidArgument(String),

    /// Two records with the same identity disagree on a field's value.
    #[error(
        "merge conflict on {id}: field '{field}' is {incoming} in the source \
         but {existing} at the destination"
    )]
    Conflict {
        id: RecordId,
        field: String,
        incoming: Value,
        existing: Value,
    },

    /// A tag record references a semver record that is present neither
    /// at the destination nor in the tag's own source document.
    #[error("tag {name}@{tag} references version {version}, which is nowhere to be found")]
    MissingSemverForTag {
        name: String,
        tag: String,
        version: String,
    },

    /// A projected record lacks a field the fold requires.
    #[error("record {id} is missing required field '{field}'")]
    MissingField { id: RecordId, field: &'static str },

    /// Error from the package metadata store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Error from the artifact transfer primitive.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// I/O error outside the store and transfer layers (directory
    /// resolution and removal).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MergeError {
    /// Returns `true` for argument-shape errors, for which a CLI wants
    /// to append usage help.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

/// Result alias for merge engine operations.
pub type MergeResult<T> = Result<T, MergeError>;
