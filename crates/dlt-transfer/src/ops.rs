use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{TransferError, TransferResult};

fn expect_nonempty(path: &Path, name: &str) -> TransferResult<()> {
    if path.as_os_str().is_empty() {
        return Err(TransferError::InvalidArgument(format!(
            "{name} argument must not be empty"
        )));
    }
    Ok(())
}

fn source_filename(src: &Path) -> TransferResult<&OsStr> {
    src.file_name().ok_or_else(|| {
        TransferError::InvalidArgument(format!(
            "source argument has no filename component: {}",
            src.display()
        ))
    })
}

/// Copy `src` into the directory `dest_dir`, keeping its filename.
///
/// The destination file is opened with exclusive-create semantics: if a
/// file of the same name is already present this fails with
/// [`TransferError::AlreadyExists`] and never overwrites. On any error
/// while streaming, the partially written destination file is removed
/// before the error is surfaced.
///
/// Returns the path of the created destination file.
pub fn copy_file(src: &Path, dest_dir: &Path) -> TransferResult<PathBuf> {
    expect_nonempty(src, "source")?;
    expect_nonempty(dest_dir, "destination")?;
    let filename = source_filename(src)?;

    let mut reader = File::open(src).map_err(|err| match err.kind() {
        ErrorKind::NotFound => TransferError::NotFound(src.to_path_buf()),
        _ => err.into(),
    })?;

    let target = dest_dir.join(filename);
    let out = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
        .map_err(|err| match err.kind() {
            ErrorKind::AlreadyExists => TransferError::AlreadyExists(target.clone()),
            _ => err.into(),
        })?;

    let mut writer = BufWriter::new(out);
    let streamed = io::copy(&mut reader, &mut writer).and_then(|_| writer.flush());
    if let Err(err) = streamed {
        drop(writer);
        // Never leave a partial file behind.
        let _ = fs::remove_file(&target);
        return Err(err.into());
    }

    debug!(target = %target.display(), "copy complete");
    Ok(target)
}

/// Move `src` into the directory `dest_dir`, keeping its filename.
///
/// Within one filesystem this is hard-link-then-unlink. When the link
/// fails because source and destination are on different devices, it
/// falls back to [`copy_file`] followed by removal of the source. In
/// either path, if the source cannot be removed (read-only media, say)
/// the already-written destination is removed and the unlink error
/// surfaced — a failed move never leaves a duplicate artifact behind.
pub fn move_file(src: &Path, dest_dir: &Path) -> TransferResult<()> {
    expect_nonempty(src, "source")?;
    expect_nonempty(dest_dir, "destination")?;
    let filename = source_filename(src)?;

    let target = dest_dir.join(filename);
    match fs::hard_link(src, &target) {
        Ok(()) => unlink_source(src, &target),
        Err(err) if err.kind() == ErrorKind::CrossesDevices => {
            debug!(src = %src.display(), "cross-device move, falling back to copy");
            move_via_copy(src, dest_dir)
        }
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            Err(TransferError::AlreadyExists(target))
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            Err(TransferError::NotFound(src.to_path_buf()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Cross-device fallback: stream a copy, then remove the source.
fn move_via_copy(src: &Path, dest_dir: &Path) -> TransferResult<()> {
    let target = copy_file(src, dest_dir)?;
    unlink_source(src, &target)
}

/// Remove the source of a completed transfer, rolling the destination
/// back if the removal fails.
fn unlink_source(src: &Path, target: &Path) -> TransferResult<()> {
    if let Err(err) = fs::remove_file(src) {
        let _ = fs::remove_file(target);
        return Err(err.into());
    }
    debug!(target = %target.display(), "move complete");
    Ok(())
}
