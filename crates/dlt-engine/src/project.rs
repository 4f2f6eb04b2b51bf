use std::path::Path;

use serde_json::Value;
use tracing::debug;

use dlt_store::{Document, PackageStore};
use dlt_types::{Record, RecordId, FIELD_FILENAME, FIELD_VERSION};

use crate::error::{MergeError, MergeResult};
use crate::record_merge::merge_record;

/// Project one source directory into an ordered list of pending records
/// against the destination store.
///
/// Loads the source's metadata document (reconstructing it from the
/// directory contents when absent) and yields, in order: semver
/// records, url records, git commit records — each unioned with any
/// existing destination record of the same identity, so a field-level
/// disagreement aborts projection — and finally tag records. Symbolic
/// git refs are skipped entirely: the store re-derives them when the
/// owning commit record is inserted with its list of known refs.
///
/// A tag already present at the destination is skipped. Any other tag
/// gets its filename populated from the semver record it references —
/// taken from the destination when a previous directory already
/// supplied it, otherwise from this source's own document.
///
/// The ordering is mandatory, not incidental: tags structurally depend
/// on their semver records being inserted first.
pub fn project(source_dir: &Path, dest: &PackageStore) -> MergeResult<Vec<Record>> {
    let doc = Document::load_or_reconstruct(source_dir)?;
    let mut records = Vec::new();

    for record in doc.semver_records() {
        records.push(merge_against(record, dest)?);
    }
    for record in doc.url_records() {
        records.push(merge_against(record, dest)?);
    }
    for record in doc.git_records() {
        if matches!(record.id, RecordId::GitRef { .. }) {
            debug!(id = %record.id, "skipping symbolic ref, re-derived at insert time");
            continue;
        }
        records.push(merge_against(record, dest)?);
    }
    for mut record in doc.tag_records() {
        if dest.contains(&record.id) {
            // Nothing beyond the reference to merge.
            continue;
        }
        let RecordId::Tag { name, tag } = record.id.clone() else {
            continue;
        };
        let Some(version) = record.version_ref().map(str::to_string) else {
            return Err(MergeError::MissingField {
                id: record.id,
                field: FIELD_VERSION,
            });
        };
        let semver_id = RecordId::semver(name.clone(), version.clone());
        let filename = dest
            .get_record(&semver_id)
            .and_then(|rec| rec.filename().map(str::to_string))
            .or_else(|| {
                doc.get(&semver_id)
                    .and_then(|fields| fields.get(FIELD_FILENAME))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });
        let Some(filename) = filename else {
            return Err(MergeError::MissingSemverForTag { name, tag, version });
        };
        record.set_filename(filename);
        records.push(record);
    }

    Ok(records)
}

fn merge_against(incoming: Record, dest: &PackageStore) -> MergeResult<Record> {
    let existing = dest.get_record(&incoming.id);
    merge_record(incoming, existing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlt_types::{Fields, PackageKind};
    use serde_json::json;
    use std::fs;

    const COMMIT: &str = "0123456789abcdef0123456789abcdef01234567";

    fn write_tracker(dir: &Path, text: &str) {
        fs::write(dir.join("dltracker.json"), text).unwrap();
    }

    fn empty_dest() -> (tempfile::TempDir, PackageStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PackageStore::create(dir.path()).unwrap();
        (dir, store)
    }

    // -----------------------------------------------------------------------
    // Ordering
    // -----------------------------------------------------------------------

    #[test]
    fn kinds_come_out_in_dependency_order() {
        let src = tempfile::tempdir().unwrap();
        write_tracker(
            src.path(),
            &format!(
                r#"{{
  "tag": {{ "foo": {{ "latest": {{ "version": "1.0.0" }} }} }},
  "semver": {{ "foo": {{ "1.0.0": {{ "filename": "foo-1.0.0.tar.gz" }} }} }},
  "git": {{ "r": {{ "{COMMIT}": {{ "filename": "r#{COMMIT}.tar.gz" }} }} }},
  "url": {{ "https://x/y.tgz": {{ "filename": "https%3A%2F%2Fx%2Fy.tgz.tar.gz" }} }}
}}"#
            ),
        );
        let (_dest_dir, dest) = empty_dest();

        let records = project(src.path(), &dest).unwrap();
        let kinds: Vec<PackageKind> = records.iter().map(|r| r.id.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                PackageKind::Semver,
                PackageKind::Url,
                PackageKind::Git,
                PackageKind::Tag
            ]
        );
    }

    #[test]
    fn symbolic_refs_are_skipped() {
        let src = tempfile::tempdir().unwrap();
        write_tracker(
            src.path(),
            &format!(
                r#"{{
  "git": {{
    "r": {{
      "{COMMIT}": {{ "filename": "r#{COMMIT}.tar.gz", "refs": ["main"] }},
      "main": {{ "commit": "{COMMIT}" }}
    }}
  }}
}}"#
            ),
        );
        let (_dest_dir, dest) = empty_dest();

        let records = project(src.path(), &dest).unwrap();
        assert_eq!(records.len(), 1);
        assert!(matches!(records[0].id, RecordId::GitCommit { .. }));
    }

    // -----------------------------------------------------------------------
    // Tag filename resolution
    // -----------------------------------------------------------------------

    #[test]
    fn tag_filename_comes_from_own_document() {
        let src = tempfile::tempdir().unwrap();
        write_tracker(
            src.path(),
            r#"{
  "semver": { "foo": { "1.0.0": { "filename": "foo-1.0.0.tar.gz" } } },
  "tag": { "foo": { "latest": { "version": "1.0.0" } } }
}"#,
        );
        let (_dest_dir, dest) = empty_dest();

        let records = project(src.path(), &dest).unwrap();
        let tag = records.last().unwrap();
        assert_eq!(tag.id, RecordId::tag("foo", "latest"));
        assert_eq!(tag.filename(), Some("foo-1.0.0.tar.gz"));
    }

    #[test]
    fn tag_filename_comes_from_destination_when_semver_is_elsewhere() {
        // The semver record lives only at the destination; the source
        // holds the tag alone.
        let src = tempfile::tempdir().unwrap();
        write_tracker(
            src.path(),
            r#"{ "tag": { "foo": { "latest": { "version": "1.0.0" } } } }"#,
        );
        let (_dest_dir, mut dest) = empty_dest();
        let mut fields = Fields::new();
        fields.insert("filename".into(), json!("foo-1.0.0.tar.gz"));
        dest.add_record(Record::new(RecordId::semver("foo", "1.0.0"), fields))
            .unwrap();

        let records = project(src.path(), &dest).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename(), Some("foo-1.0.0.tar.gz"));
    }

    #[test]
    fn dangling_tag_reference_fails() {
        let src = tempfile::tempdir().unwrap();
        write_tracker(
            src.path(),
            r#"{ "tag": { "foo": { "latest": { "version": "9.9.9" } } } }"#,
        );
        let (_dest_dir, dest) = empty_dest();

        let err = project(src.path(), &dest).unwrap_err();
        assert!(matches!(err, MergeError::MissingSemverForTag { .. }));
    }

    #[test]
    fn tag_already_at_destination_is_skipped() {
        let src = tempfile::tempdir().unwrap();
        write_tracker(
            src.path(),
            r#"{
  "semver": { "foo": { "1.0.0": { "filename": "foo-1.0.0.tar.gz" } } },
  "tag": { "foo": { "latest": { "version": "1.0.0" } } }
}"#,
        );
        let (_dest_dir, mut dest) = empty_dest();
        let mut fields = Fields::new();
        fields.insert("filename".into(), json!("foo-1.0.0.tar.gz"));
        dest.add_record(Record::new(RecordId::semver("foo", "1.0.0"), fields))
            .unwrap();
        let mut tag_fields = Fields::new();
        tag_fields.insert("version".into(), json!("1.0.0"));
        dest.add_record(Record::new(RecordId::tag("foo", "latest"), tag_fields))
            .unwrap();

        let records = project(src.path(), &dest).unwrap();
        assert!(records.iter().all(|r| r.id.kind() != PackageKind::Tag));
    }

    // -----------------------------------------------------------------------
    // Conflict propagation
    // -----------------------------------------------------------------------

    #[test]
    fn conflicting_semver_aborts_projection() {
        let src = tempfile::tempdir().unwrap();
        write_tracker(
            src.path(),
            r#"{ "semver": { "foo": { "1.0.0": { "filename": "foo-1.0.0.tar.gz", "integrity": "sha512-new" } } } }"#,
        );
        let (_dest_dir, mut dest) = empty_dest();
        let mut fields = Fields::new();
        fields.insert("filename".into(), json!("foo-1.0.0.tar.gz"));
        fields.insert("integrity".into(), json!("sha512-old"));
        dest.add_record(Record::new(RecordId::semver("foo", "1.0.0"), fields))
            .unwrap();

        let err = project(src.path(), &dest).unwrap_err();
        assert!(matches!(err, MergeError::Conflict { .. }));
    }

    #[test]
    fn reconstructed_source_projects_from_filenames() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("bar-2.1.0.tar.gz"), b"x").unwrap();
        let (_dest_dir, dest) = empty_dest();

        let records = project(src.path(), &dest).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, RecordId::semver("bar", "2.1.0"));
    }
}
