use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use dlt_types::{Fields, Record, RecordId};

use crate::error::{StoreError, StoreResult};
use crate::filename::{self, ParsedFilename};
use crate::store::MAP_FILENAME;

/// Two-level map used by the semver, tag, and git sections:
/// primary key (name or repo) -> secondary key -> fields.
pub type KindMap = BTreeMap<String, BTreeMap<String, Fields>>;

/// The in-memory form of a `dltracker.json` document.
///
/// The header fields (`description`, `version`, `created`) are
/// informational store metadata; the merge never compares them and the
/// store regenerates them at serialize time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub semver: KindMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tag: KindMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub git: KindMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub url: BTreeMap<String, Fields>,
}

impl Document {
    /// Parse a document from file contents, stripping a UTF-8 BOM if one
    /// is present.
    pub fn from_json(path: &Path, text: &str) -> StoreResult<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        serde_json::from_str(text).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the document from `dir`, or `Ok(None)` when there is no
    /// `dltracker.json` there.
    pub fn load(dir: &Path) -> StoreResult<Option<Self>> {
        let path = dir.join(MAP_FILENAME);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(Self::from_json(&path, &text)?))
    }

    /// Load the document from `dir`, reconstructing it from the
    /// directory's artifact filenames when no `dltracker.json` exists.
    pub fn load_or_reconstruct(dir: &Path) -> StoreResult<Self> {
        match Self::load(dir)? {
            Some(doc) => Ok(doc),
            None => {
                debug!(dir = %dir.display(), "no map file, reconstructing from directory contents");
                Self::reconstruct(dir)
            }
        }
    }

    /// Rebuild a document by scanning `dir` for artifact filenames that
    /// follow the naming conventions. Unrecognized files are skipped.
    pub fn reconstruct(dir: &Path) -> StoreResult<Self> {
        let mut doc = Self::default();
        for entry in walkdir::WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|err| match err.into_io_error() {
                Some(io) => StoreError::Io(io),
                None => StoreError::NotFound(dir.to_path_buf()),
            });
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == MAP_FILENAME {
                continue;
            }
            let mut fields = Fields::new();
            fields.insert(
                dlt_types::FIELD_FILENAME.to_string(),
                serde_json::Value::String(name.clone()),
            );
            match filename::parse(&name) {
                Some(ParsedFilename::Semver { name: pkg, version }) => {
                    doc.semver.entry(pkg).or_default().insert(version, fields);
                }
                Some(ParsedFilename::Git { repo, commit }) => {
                    doc.git.entry(repo).or_default().insert(commit, fields);
                }
                Some(ParsedFilename::Url { spec }) => {
                    doc.url.insert(spec, fields);
                }
                None => {
                    warn!(file = %name, "skipping file with unrecognized name");
                }
            }
        }
        Ok(doc)
    }

    /// All semver records, in deterministic (name, version) order.
    pub fn semver_records(&self) -> Vec<Record> {
        self.semver
            .iter()
            .flat_map(|(name, versions)| {
                versions.iter().map(move |(version, fields)| {
                    Record::new(RecordId::semver(name, version), fields.clone())
                })
            })
            .collect()
    }

    /// All tag records, in deterministic (name, tag) order.
    pub fn tag_records(&self) -> Vec<Record> {
        self.tag
            .iter()
            .flat_map(|(name, tags)| {
                tags.iter()
                    .map(move |(tag, fields)| Record::new(RecordId::tag(name, tag), fields.clone()))
            })
            .collect()
    }

    /// All git records — commit records *and* symbolic ref records —
    /// in deterministic (repo, spec) order.
    pub fn git_records(&self) -> Vec<Record> {
        self.git
            .iter()
            .flat_map(|(repo, specs)| {
                specs.iter().map(move |(spec, fields)| {
                    Record::new(RecordId::git(repo, spec), fields.clone())
                })
            })
            .collect()
    }

    /// All url records, in deterministic spec order.
    pub fn url_records(&self) -> Vec<Record> {
        self.url
            .iter()
            .map(|(spec, fields)| Record::new(RecordId::url(spec), fields.clone()))
            .collect()
    }

    /// Look up the raw fields stored under an identity.
    pub fn get(&self, id: &RecordId) -> Option<&Fields> {
        match id {
            RecordId::Semver { name, version } => self.semver.get(name)?.get(version),
            RecordId::Tag { name, tag } => self.tag.get(name)?.get(tag),
            RecordId::GitCommit { repo, commit } => self.git.get(repo)?.get(commit),
            RecordId::GitRef { repo, ref_name } => self.git.get(repo)?.get(ref_name),
            RecordId::Url { spec } => self.url.get(spec),
        }
    }

    /// Insert (or replace) the fields stored under an identity.
    pub fn insert(&mut self, id: &RecordId, fields: Fields) {
        match id {
            RecordId::Semver { name, version } => {
                self.semver
                    .entry(name.clone())
                    .or_default()
                    .insert(version.clone(), fields);
            }
            RecordId::Tag { name, tag } => {
                self.tag
                    .entry(name.clone())
                    .or_default()
                    .insert(tag.clone(), fields);
            }
            RecordId::GitCommit { repo, commit } => {
                self.git
                    .entry(repo.clone())
                    .or_default()
                    .insert(commit.clone(), fields);
            }
            RecordId::GitRef { repo, ref_name } => {
                self.git
                    .entry(repo.clone())
                    .or_default()
                    .insert(ref_name.clone(), fields);
            }
            RecordId::Url { spec } => {
                self.url.insert(spec.clone(), fields);
            }
        }
    }

    /// Returns `true` when the document holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.semver.is_empty() && self.tag.is_empty() && self.git.is_empty() && self.url.is_empty()
    }
}
