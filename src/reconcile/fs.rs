//! Filesystem primitives used by the reconciler and the backup manager.
//!
//! Each helper maps failures to a [`ReconcileError`] tagged with the
//! operation and path, and absorbs not-found where the caller treats it as
//! benign.
use std::fs;
use std::io;
use std::path::Path;

use super::error::{FsOp, ReconcileError};

/// Create `dir` and any missing ancestors; an existing directory is fine.
///
/// # Errors
///
/// Returns an error if any component cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<(), ReconcileError> {
    fs::create_dir_all(dir).map_err(|e| ReconcileError::io(FsOp::CreateDir, dir, e))
}

/// Ensure the parent directory of `path` exists.
///
/// # Errors
///
/// Returns an error if the parent cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), ReconcileError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Remove whatever exists at `path`, recursively for a real directory.
///
/// Symlinks are removed themselves, never their destination.  Returns
/// `false` when nothing was there, including when something else removed
/// the entry between the check and the removal.
///
/// # Errors
///
/// Returns an error if the entry exists but cannot be removed.
pub fn remove_existing(path: &Path) -> Result<bool, ReconcileError> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(ReconcileError::io(FsOp::Inspect, path, e)),
    };
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        remove_link_or_file(path, &meta)
    };
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ReconcileError::io(FsOp::Remove, path, e)),
    }
}

/// On Windows a directory symlink has to go through `remove_dir`.
fn remove_link_or_file(path: &Path, meta: &fs::Metadata) -> io::Result<()> {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x10;
        if meta.file_attributes() & FILE_ATTRIBUTE_DIRECTORY != 0 {
            return fs::remove_dir(path);
        }
    }
    #[cfg(not(windows))]
    let _ = meta;
    fs::remove_file(path)
}

/// Create a symlink at `link` whose destination is `source`.
///
/// # Errors
///
/// Returns an error if the link cannot be created (including when something
/// already occupies `link`).
pub fn create_symlink(source: &Path, link: &Path) -> Result<(), ReconcileError> {
    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(source, link);

    #[cfg(windows)]
    let result = if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, link)
    } else {
        std::os::windows::fs::symlink_file(source, link)
    };

    result.map_err(|e| ReconcileError::io(FsOp::Symlink, link, e))
}

/// Hard-link a single non-directory entry into the backup tree.
///
/// `std::fs::hard_link` does not follow a final symlink on Unix, so a symlink
/// is preserved as a link rather than as its destination's content.
///
/// # Errors
///
/// Returns an error if the link cannot be created, including when something
/// already exists at `backup`.
pub fn link_entry(original: &Path, backup: &Path) -> Result<(), ReconcileError> {
    fs::hard_link(original, backup).map_err(|e| ReconcileError::io(FsOp::HardLink, backup, e))
}

/// Replicate the directory tree at `original` under `backup`.
///
/// Directories are recreated with the permission bits of their originals;
/// every other entry is hard-linked (see [`link_entry`]).  Permissions are
/// applied after a directory's children are in place, so read-only
/// directories can still be filled.
///
/// Hard links share inodes with the originals, so the originals must be
/// removed right after this call.
///
/// # Errors
///
/// Returns an error on the first directory that cannot be read or created,
/// or the first entry that cannot be linked.  Nothing is rolled back.
pub fn link_tree(original: &Path, backup: &Path) -> Result<(), ReconcileError> {
    let meta = fs::symlink_metadata(original)
        .map_err(|e| ReconcileError::io(FsOp::Inspect, original, e))?;
    ensure_dir(backup)?;

    let entries =
        fs::read_dir(original).map_err(|e| ReconcileError::io(FsOp::ReadDir, original, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| ReconcileError::io(FsOp::ReadDir, original, e))?;
        let child = entry.path();
        let child_backup = backup.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| ReconcileError::io(FsOp::Inspect, &child, e))?;
        if file_type.is_dir() {
            link_tree(&child, &child_backup)?;
        } else {
            link_entry(&child, &child_backup)?;
        }
    }

    fs::set_permissions(backup, meta.permissions())
        .map_err(|e| ReconcileError::io(FsOp::SetPermissions, backup, e))
}
