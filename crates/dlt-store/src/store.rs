use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use dlt_types::{is_commit_hash, Fields, Record, RecordId, FIELD_FILENAME, FIELD_VERSION};

use crate::document::Document;
use crate::error::{AuditProblem, StoreError, StoreResult};

/// On-disk name of the metadata document.
pub const MAP_FILENAME: &str = "dltracker.json";

/// Document format version written by this store.
const MAP_VERSION: u32 = 2;

/// Field carrying a symbolic ref's target commit hash.
const FIELD_COMMIT: &str = "commit";

/// A package download directory and its metadata document.
///
/// The store is the only entity that mutates or persists tracker data;
/// callers read records through [`get_record`](Self::get_record) and
/// insert already-merged records through [`add_record`](Self::add_record).
#[derive(Debug)]
pub struct PackageStore {
    dir: PathBuf,
    doc: Document,
    loaded_from_file: bool,
}

impl PackageStore {
    /// Open the store at `dir`.
    ///
    /// Fails with [`StoreError::NotFound`] when the directory does not
    /// exist. When a `dltracker.json` is present it is loaded and
    /// audited — audit problems fail with [`StoreError::NeedsRepair`].
    /// Without a map file the document is reconstructed from the
    /// directory's artifact filenames.
    pub fn open(dir: &Path) -> StoreResult<Self> {
        if !dir.is_dir() {
            return Err(StoreError::NotFound(dir.to_path_buf()));
        }
        let loaded = Document::load(dir)?;
        let loaded_from_file = loaded.is_some();
        let doc = match loaded {
            Some(doc) => doc,
            None => Document::reconstruct(dir)?,
        };
        let store = Self {
            dir: dir.to_path_buf(),
            doc,
            loaded_from_file,
        };
        // A reconstructed document cannot disagree with the directory.
        if store.loaded_from_file {
            debug!(dir = %dir.display(), "running consistency audit");
            let problems = store.audit();
            if !problems.is_empty() {
                return Err(StoreError::NeedsRepair {
                    dir: dir.to_path_buf(),
                    problems,
                });
            }
        }
        Ok(store)
    }

    /// Initialize an empty store in a freshly created directory.
    pub fn create(dir: &Path) -> StoreResult<Self> {
        if !dir.is_dir() {
            return Err(StoreError::NotFound(dir.to_path_buf()));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            doc: Document::default(),
            loaded_from_file: false,
        })
    }

    /// The backing directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the document was loaded from a map file (as opposed to
    /// reconstructed or created empty).
    pub fn loaded_from_file(&self) -> bool {
        self.loaded_from_file
    }

    /// Check whether a record with this identity is present.
    pub fn contains(&self, id: &RecordId) -> bool {
        self.doc.get(id).is_some()
    }

    /// Look up a record by identity.
    ///
    /// Tag records are returned with the referenced semver record's
    /// fields joined in (that is where a tag's filename comes from);
    /// symbolic git refs are resolved through the ref index and joined
    /// with their commit record's fields.
    pub fn get_record(&self, id: &RecordId) -> Option<Record> {
        let fields = self.doc.get(id)?;
        let joined = match id {
            RecordId::Tag { name, .. } => {
                let version = fields.get(FIELD_VERSION)?.as_str()?;
                let semver = RecordId::semver(name.clone(), version);
                join_fields(fields, self.doc.get(&semver))
            }
            RecordId::GitRef { repo, .. } => {
                let commit = fields.get(FIELD_COMMIT)?.as_str()?;
                let owning = RecordId::git(repo.clone(), commit);
                join_fields(fields, self.doc.get(&owning))
            }
            _ => fields.clone(),
        };
        Some(Record::new(id.clone(), joined))
    }

    /// Insert (or replace) a record.
    ///
    /// Validates the fields each kind requires: semver, git commit, and
    /// url records must carry a filename; a tag must reference a semver
    /// record that is already present. Tag records are stored without
    /// their filename field — it is derived at lookup time. Inserting a
    /// git commit record indexes every name in its `refs` list as a
    /// symbolic ref pointing at that commit.
    pub fn add_record(&mut self, record: Record) -> StoreResult<()> {
        let Record { id, mut fields } = record;
        match &id {
            RecordId::Semver { .. } | RecordId::GitCommit { .. } | RecordId::Url { .. } => {
                if !has_string(&fields, FIELD_FILENAME) {
                    return Err(StoreError::MissingField {
                        id,
                        field: FIELD_FILENAME,
                    });
                }
            }
            RecordId::Tag { name, tag } => {
                let Some(version) = string_field(&fields, FIELD_VERSION) else {
                    return Err(StoreError::MissingField {
                        id,
                        field: FIELD_VERSION,
                    });
                };
                let semver = RecordId::semver(name.clone(), version.clone());
                if !self.contains(&semver) {
                    return Err(StoreError::UnknownVersion {
                        name: name.clone(),
                        tag: tag.clone(),
                        version,
                    });
                }
                // Derived, never stored.
                fields.remove(FIELD_FILENAME);
            }
            RecordId::GitRef { repo, ref_name } => {
                let Some(commit) = string_field(&fields, FIELD_COMMIT) else {
                    return Err(StoreError::MissingField {
                        id,
                        field: FIELD_COMMIT,
                    });
                };
                let owning = RecordId::git(repo.clone(), commit.clone());
                if !self.contains(&owning) {
                    return Err(StoreError::UnknownCommit {
                        repo: repo.clone(),
                        ref_name: ref_name.clone(),
                        commit,
                    });
                }
            }
        }

        // Index symbolic refs named by a commit record before the move.
        if let RecordId::GitCommit { repo, commit } = &id {
            let record = Record::new(id.clone(), fields.clone());
            for ref_name in record.git_refs() {
                let mut ref_fields = Fields::new();
                ref_fields.insert(FIELD_COMMIT.to_string(), Value::String(commit.clone()));
                self.doc
                    .insert(&RecordId::git(repo.clone(), ref_name), ref_fields);
            }
        }

        self.doc.insert(&id, fields);
        Ok(())
    }

    /// Run the consistency audit: every filename-bearing record's file
    /// must exist in the directory, every tag must reference a present
    /// semver record, and every symbolic ref a present commit record.
    pub fn audit(&self) -> Vec<AuditProblem> {
        let mut problems = Vec::new();

        for (name, versions) in &self.doc.semver {
            for (version, fields) in versions {
                self.check_file(RecordId::semver(name.clone(), version.clone()), fields, &mut problems);
            }
        }
        for (spec, fields) in &self.doc.url {
            self.check_file(RecordId::url(spec.clone()), fields, &mut problems);
        }
        for (repo, specs) in &self.doc.git {
            for (spec, fields) in specs {
                if is_commit_hash(spec) {
                    self.check_file(RecordId::git(repo.clone(), spec.clone()), fields, &mut problems);
                } else {
                    let commit = string_field(fields, FIELD_COMMIT).unwrap_or_default();
                    let present = !commit.is_empty()
                        && self.doc.get(&RecordId::git(repo.clone(), commit.clone())).is_some();
                    if !present {
                        problems.push(AuditProblem::DanglingRef {
                            repo: repo.clone(),
                            ref_name: spec.clone(),
                            commit,
                        });
                    }
                }
            }
        }
        for (name, tags) in &self.doc.tag {
            for (tag, fields) in tags {
                let version = string_field(fields, FIELD_VERSION).unwrap_or_default();
                let present = !version.is_empty()
                    && self
                        .doc
                        .get(&RecordId::semver(name.clone(), version.clone()))
                        .is_some();
                if !present {
                    problems.push(AuditProblem::DanglingTag {
                        name: name.clone(),
                        tag: tag.clone(),
                        version,
                    });
                }
            }
        }

        problems
    }

    fn check_file(&self, id: RecordId, fields: &Fields, problems: &mut Vec<AuditProblem>) {
        match string_field(fields, FIELD_FILENAME) {
            Some(filename) => {
                if !self.dir.join(&filename).is_file() {
                    problems.push(AuditProblem::MissingFile { id, filename });
                }
            }
            None => problems.push(AuditProblem::MissingFilename { id }),
        }
    }

    /// Persist the document to `dltracker.json` in the store directory.
    pub fn serialize(&mut self) -> StoreResult<()> {
        self.doc.description.get_or_insert_with(|| {
            "Tracking data for downloaded package artifacts".to_string()
        });
        self.doc.version.get_or_insert(MAP_VERSION);
        self.doc.created = Some(chrono::Utc::now().to_rfc3339());

        let path = self.dir.join(MAP_FILENAME);
        let mut text = serde_json::to_string_pretty(&self.doc).map_err(|source| {
            StoreError::Parse {
                path: path.clone(),
                source,
            }
        })?;
        text.push('\n');
        fs::write(&path, text)?;
        info!(path = %path.display(), "tracker data written");
        Ok(())
    }
}

fn string_field(fields: &Fields, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

fn has_string(fields: &Fields, key: &str) -> bool {
    fields.get(key).and_then(Value::as_str).is_some()
}

/// Base fields overlaid with the referenced record's fields (the
/// referenced record wins on shared names).
fn join_fields(base: &Fields, referenced: Option<&Fields>) -> Fields {
    let mut joined = base.clone();
    if let Some(other) = referenced {
        for (key, value) in other {
            joined.insert(key.clone(), value.clone());
        }
    }
    joined
}
