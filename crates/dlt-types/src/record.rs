use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::kind::PackageKind;

/// Field name carrying a record's artifact filename.
pub const FIELD_FILENAME: &str = "filename";
/// Field name carrying a tag record's referenced semver version.
pub const FIELD_VERSION: &str = "version";
/// Field name carrying a git commit record's known symbolic refs.
pub const FIELD_REFS: &str = "refs";

/// Provenance payload of a record: arbitrary JSON fields, keyed by name.
///
/// A `BTreeMap` keeps serialization deterministic.
pub type Fields = BTreeMap<String, Value>;

/// Returns `true` if `s` looks like a full git commit hash
/// (40 lowercase hex digits).
pub fn is_commit_hash(s: &str) -> bool {
    s.len() == 40 && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// A record's identity: its kind plus the key(s) it is filed under.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordId {
    /// Keyed by (package name, exact version).
    Semver { name: String, version: String },
    /// Keyed by (package name, tag string); references a semver record.
    Tag { name: String, tag: String },
    /// Keyed by (repository identifier, full commit hash).
    GitCommit { repo: String, commit: String },
    /// Keyed by (repository identifier, symbolic ref name). Resolved
    /// through the store's ref index, never merged directly.
    GitRef { repo: String, ref_name: String },
    /// Keyed by the literal source URL/spec string.
    Url { spec: String },
}

impl RecordId {
    /// Build a semver identity.
    pub fn semver(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::Semver {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Build a tag identity.
    pub fn tag(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::Tag {
            name: name.into(),
            tag: tag.into(),
        }
    }

    /// Build a git identity, splitting commit hashes from symbolic refs.
    pub fn git(repo: impl Into<String>, spec: impl Into<String>) -> Self {
        let spec = spec.into();
        if is_commit_hash(&spec) {
            Self::GitCommit {
                repo: repo.into(),
                commit: spec,
            }
        } else {
            Self::GitRef {
                repo: repo.into(),
                ref_name: spec,
            }
        }
    }

    /// Build a url identity.
    pub fn url(spec: impl Into<String>) -> Self {
        Self::Url { spec: spec.into() }
    }

    /// The document kind this identity is filed under.
    pub fn kind(&self) -> PackageKind {
        match self {
            Self::Semver { .. } => PackageKind::Semver,
            Self::Tag { .. } => PackageKind::Tag,
            Self::GitCommit { .. } | Self::GitRef { .. } => PackageKind::Git,
            Self::Url { .. } => PackageKind::Url,
        }
    }

    /// Primary key: package name, repository identifier, or url spec.
    pub fn primary(&self) -> &str {
        match self {
            Self::Semver { name, .. } | Self::Tag { name, .. } => name,
            Self::GitCommit { repo, .. } | Self::GitRef { repo, .. } => repo,
            Self::Url { spec } => spec,
        }
    }

    /// Secondary key: version, tag, commit, or ref name. `None` for url
    /// records, which are keyed by spec alone.
    pub fn secondary(&self) -> Option<&str> {
        match self {
            Self::Semver { version, .. } => Some(version),
            Self::Tag { tag, .. } => Some(tag),
            Self::GitCommit { commit, .. } => Some(commit),
            Self::GitRef { ref_name, .. } => Some(ref_name),
            Self::Url { .. } => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Semver { name, version } => write!(f, "{name}@{version}"),
            Self::Tag { name, tag } => write!(f, "{name}@{tag}"),
            Self::GitCommit { repo, commit } => write!(f, "{repo}#{commit}"),
            Self::GitRef { repo, ref_name } => write!(f, "{repo}#{ref_name}"),
            Self::Url { spec } => f.write_str(spec),
        }
    }
}

/// One tracker record: an identity plus its provenance fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// The identity this record is filed under.
    pub id: RecordId,
    /// Provenance payload (filename, integrity hash, resolved url, ...).
    pub fields: Fields,
}

impl Record {
    /// Create a record from an identity and its fields.
    pub fn new(id: RecordId, fields: Fields) -> Self {
        Self { id, fields }
    }

    /// The artifact filename, if this record carries one.
    pub fn filename(&self) -> Option<&str> {
        self.fields.get(FIELD_FILENAME).and_then(Value::as_str)
    }

    /// Set (or replace) the artifact filename field.
    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.fields
            .insert(FIELD_FILENAME.to_string(), Value::String(filename.into()));
    }

    /// For tag records: the referenced semver version.
    pub fn version_ref(&self) -> Option<&str> {
        self.fields.get(FIELD_VERSION).and_then(Value::as_str)
    }

    /// For git commit records: the symbolic refs known to point at this
    /// commit. Empty when the record has no `refs` field.
    pub fn git_refs(&self) -> Vec<&str> {
        self.fields
            .get(FIELD_REFS)
            .and_then(Value::as_array)
            .map(|refs| refs.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}
