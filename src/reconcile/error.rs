//! Typed errors for reconciliation.
//!
//! Every variant is fatal to the run: not-found conditions that are expected
//! (missing target, nothing to back up, backup directory not yet created) are
//! absorbed where they occur and never surface here.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The filesystem call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    /// `lstat` of a path.
    Inspect,
    /// Reading a symlink's destination.
    ReadLink,
    /// Listing a directory.
    ReadDir,
    /// Creating a directory (or its ancestors).
    CreateDir,
    /// Copying permission bits onto a directory.
    SetPermissions,
    /// Creating a hard link.
    HardLink,
    /// Removing a file or directory tree.
    Remove,
    /// Creating a symlink.
    Symlink,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::Inspect => "inspect",
            Self::ReadLink => "read link",
            Self::ReadDir => "read directory",
            Self::CreateDir => "create directory",
            Self::SetPermissions => "set permissions",
            Self::HardLink => "hard link",
            Self::Remove => "remove",
            Self::Symlink => "create symlink",
        };
        f.write_str(op)
    }
}

/// Errors that abort a reconciliation run.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A filesystem call failed for a reason other than a benign not-found.
    #[error("{op} failed for {}: {source}", path.display())]
    Io {
        /// Which call failed.
        op: FsOp,
        /// Path the call was made on.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl ReconcileError {
    pub(crate) fn io(op: FsOp, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// The failed operation.
    #[must_use]
    pub const fn op(&self) -> FsOp {
        match self {
            Self::Io { op, .. } => *op,
        }
    }

    /// The path the failed operation was made on.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } => path,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn io_display_names_operation_and_path() {
        let e = ReconcileError::io(
            FsOp::Symlink,
            Path::new("/home/u/.vimrc"),
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        );
        assert_eq!(
            e.to_string(),
            "create symlink failed for /home/u/.vimrc: permission denied"
        );
        assert_eq!(e.op(), FsOp::Symlink);
        assert_eq!(e.path(), Path::new("/home/u/.vimrc"));
    }

    #[test]
    fn io_keeps_source() {
        use std::error::Error as _;
        let e = ReconcileError::io(
            FsOp::HardLink,
            Path::new("/b"),
            io::Error::from(io::ErrorKind::CrossesDevices),
        );
        assert!(e.source().is_some());
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn reconcile_error_is_send_sync() {
        assert_send_sync::<ReconcileError>();
    }
}
