use serde::{Deserialize, Serialize};

/// The four kinds of record a tracker document can hold.
///
/// Each kind is a top-level key of `dltracker.json`. The variants are
/// ordered the way a merge must process them: records that other records
/// reference (semver, url, git) come before the records that reference
/// them (tag).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// Exact-version package record: keyed by (name, version).
    Semver,
    /// URL-keyed record: keyed by the literal source spec string.
    Url,
    /// Source-control record: keyed by (repo, commit hash or symbolic ref).
    Git,
    /// Tag alias record: keyed by (name, tag), referencing a semver record.
    Tag,
}

impl PackageKind {
    /// The lowercase document key for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Semver => "semver",
            Self::Url => "url",
            Self::Git => "git",
            Self::Tag => "tag",
        }
    }
}

impl std::fmt::Display for PackageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
