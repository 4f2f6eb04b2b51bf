use std::fmt;
use std::path::PathBuf;

use dlt_types::RecordId;

/// One problem found by a store's consistency audit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuditProblem {
    /// A record names an artifact file that is not in the directory.
    MissingFile { id: RecordId, filename: String },
    /// A record that must carry a filename does not.
    MissingFilename { id: RecordId },
    /// A tag record references a semver version that is not present.
    DanglingTag {
        name: String,
        tag: String,
        version: String,
    },
    /// A symbolic git ref points at a commit record that is not present.
    DanglingRef {
        repo: String,
        ref_name: String,
        commit: String,
    },
}

impl fmt::Display for AuditProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFile { id, filename } => {
                write!(f, "{id}: file '{filename}' not found in directory")
            }
            Self::MissingFilename { id } => write!(f, "{id}: no filename recorded"),
            Self::DanglingTag { name, tag, version } => {
                write!(f, "tag {name}@{tag}: no semver record for version {version}")
            }
            Self::DanglingRef {
                repo,
                ref_name,
                commit,
            } => write!(f, "git ref {repo}#{ref_name}: no commit record {commit}"),
        }
    }
}

/// Errors from package store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store directory does not exist.
    #[error("no such directory: {}", .0.display())]
    NotFound(PathBuf),

    /// The loaded document failed its consistency audit and must be
    /// repaired out-of-band before it can be used.
    #[error(
        "tracker data at '{}' needs repair ({} problem(s) found)",
        .dir.display(),
        .problems.len()
    )]
    NeedsRepair {
        dir: PathBuf,
        problems: Vec<AuditProblem>,
    },

    /// The metadata document could not be parsed.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A record is missing a field its kind requires.
    #[error("record {id} is missing required field '{field}'")]
    MissingField { id: RecordId, field: &'static str },

    /// A tag record references a semver version the store does not hold.
    #[error("tag {name}@{tag} references unknown version {version}")]
    UnknownVersion {
        name: String,
        tag: String,
        version: String,
    },

    /// A symbolic ref record references a commit the store does not hold.
    #[error("git ref {repo}#{ref_name} references unknown commit {commit}")]
    UnknownCommit {
        repo: String,
        ref_name: String,
        commit: String,
    },

    /// I/O error from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
