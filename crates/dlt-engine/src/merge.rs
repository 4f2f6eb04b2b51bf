use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use dlt_store::{PackageStore, StoreError};
use dlt_transfer::{copy_file, move_file};
use dlt_types::{PackageKind, FIELD_FILENAME};

use crate::error::{MergeError, MergeResult};
use crate::notify::Notify;
use crate::options::MergeOptions;
use crate::project::project;

/// Merge download directories into the last one.
///
/// `dirs` holds at least two paths; every path but the last is a source
/// and the last is the destination. Sources are folded into the
/// destination strictly left to right: artifacts are copied (or moved,
/// per [`MergeOptions::move_files`]) and their records unioned into the
/// destination document, which is persisted once at the end. With move
/// semantics the source directories are removed after the destination
/// has been written.
///
/// A destination that does not exist yet is created, but only when
/// there is more than one source; with a single source a missing
/// destination is treated as a typo and rejected.
///
/// Any error aborts the whole merge before the destination document is
/// persisted, so `dltracker.json` at the destination never reflects a
/// partial fold. Files already transferred stay where they landed.
pub fn merge(dirs: &[PathBuf], options: &MergeOptions, notify: &dyn Notify) -> MergeResult<()> {
    validate_args(dirs)?;
    let dest_dir = &dirs[dirs.len() - 1];
    let sources = &dirs[..dirs.len() - 1];

    // Validation pass: every source must open cleanly (including the
    // consistency audit) before the first byte is transferred.
    for dir in sources {
        PackageStore::open(dir)?;
    }
    let mut dest = open_or_create_destination(dest_dir, sources.len(), notify)?;

    for dir in sources {
        fold_directory(dir, &mut dest, options, notify)?;
    }

    notify.info(&format!(
        "Writing tracker data at {} ...",
        dest.dir().display()
    ));
    dest.serialize()?;

    if options.move_files {
        for dir in sources {
            notify.info(&format!("Removing directory {} ...", dir.display()));
            fs::remove_dir_all(dir)?;
        }
    }
    Ok(())
}

fn validate_args(dirs: &[PathBuf]) -> MergeResult<()> {
    if dirs.len() < 2 {
        return Err(MergeError::InvalidArgument(
            "at least two paths are required".to_string(),
        ));
    }
    let mut seen = BTreeSet::new();
    for dir in dirs {
        if dir.as_os_str().is_empty() {
            return Err(MergeError::InvalidArgument(
                "an empty path is not a valid directory".to_string(),
            ));
        }
        if !seen.insert(resolve(dir)?) {
            return Err(MergeError::InvalidArgument(format!(
                "duplicate path in arguments: {}",
                dir.display()
            )));
        }
    }
    Ok(())
}

/// Absolute form of `dir` for duplicate detection. Paths that do not
/// exist yet (a to-be-created destination) resolve against the current
/// working directory.
fn resolve(dir: &Path) -> MergeResult<PathBuf> {
    match dir.canonicalize() {
        Ok(path) => Ok(path),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Ok(env::current_dir()?.join(dir))
        }
        Err(err) => Err(err.into()),
    }
}

fn open_or_create_destination(
    dir: &Path,
    source_count: usize,
    notify: &dyn Notify,
) -> MergeResult<PackageStore> {
    match PackageStore::open(dir) {
        Ok(store) => Ok(store),
        Err(StoreError::NotFound(_)) if source_count > 1 => {
            notify.warn(&format!("Need to create path: {}", dir.display()));
            fs::create_dir_all(dir)?;
            Ok(PackageStore::create(dir)?)
        }
        Err(err) => Err(err.into()),
    }
}

/// Fold one source directory into the destination: project its records
/// against the destination document, transfer each record's artifact,
/// and insert the merged records.
///
/// Tag records carry no artifact of their own; their filename points at
/// a semver artifact that is transferred (or already present) under its
/// own record. A destination file collision is reported and tolerated:
/// identical records from earlier directories have already put the same
/// artifact there.
fn fold_directory(
    source_dir: &Path,
    dest: &mut PackageStore,
    options: &MergeOptions,
    notify: &dyn Notify,
) -> MergeResult<()> {
    info!(dir = %source_dir.display(), "folding directory into destination");
    for record in project(source_dir, dest)? {
        if record.id.kind() != PackageKind::Tag {
            let filename = match record.filename() {
                Some(name) => name.to_string(),
                None => {
                    return Err(MergeError::MissingField {
                        id: record.id,
                        field: FIELD_FILENAME,
                    })
                }
            };
            let src_file = source_dir.join(&filename);
            let outcome = if options.move_files {
                move_file(&src_file, dest.dir())
            } else {
                copy_file(&src_file, dest.dir()).map(|_| ())
            };
            match outcome {
                Ok(_) => {}
                Err(err) if err.is_already_exists() => {
                    notify.warn(&format!(
                        "{} already exists at {}",
                        filename,
                        dest.dir().display()
                    ));
                }
                Err(err) => return Err(err.into()),
            }
        }
        dest.add_record(record)?;
    }
    Ok(())
}
