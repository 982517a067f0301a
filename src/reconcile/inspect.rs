//! Decide whether a target already is the symlink we want.
use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use super::error::{FsOp, ReconcileError};

/// What kind of non-symlink entry occupies a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A real directory (not a symlink to one).
    Directory,
    /// A socket, FIFO, device node, ...
    Other,
}

/// Observed state of a target path.
///
/// # Examples
///
/// ```
/// use dfo::reconcile::{EntryKind, LinkState};
///
/// assert!(LinkState::Absent.needs_replacement());
/// assert!(!LinkState::Absent.needs_backup());
/// assert!(!LinkState::CorrectSymlink.needs_replacement());
/// assert!(LinkState::OtherEntry { kind: EntryKind::File }.needs_backup());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Nothing exists at the target.
    Absent,
    /// The target is a symlink to exactly the intended source.
    CorrectSymlink,
    /// The target is a symlink to something else.
    WrongSymlink {
        /// Where the link currently points.
        current: PathBuf,
    },
    /// The target is a file, directory or other non-symlink entry.
    OtherEntry {
        /// What occupies the target.
        kind: EntryKind,
    },
}

impl LinkState {
    /// Whether the target has to be replaced with a fresh symlink.
    #[must_use]
    pub const fn needs_replacement(&self) -> bool {
        !matches!(self, Self::CorrectSymlink)
    }

    /// Whether existing content has to be preserved before replacement.
    #[must_use]
    pub const fn needs_backup(&self) -> bool {
        matches!(self, Self::WrongSymlink { .. } | Self::OtherEntry { .. })
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("absent"),
            Self::CorrectSymlink => f.write_str("linked"),
            Self::WrongSymlink { current } => write!(f, "points to {}", current.display()),
            Self::OtherEntry {
                kind: EntryKind::File,
            } => f.write_str("regular file"),
            Self::OtherEntry {
                kind: EntryKind::Directory,
            } => f.write_str("directory"),
            Self::OtherEntry {
                kind: EntryKind::Other,
            } => f.write_str("special file"),
        }
    }
}

/// Inspect `target` without following a final symlink.
///
/// The link destination is compared with `intended_source` as a raw OS
/// string: `/repo/vim` and `/repo//vim` are different destinations, as are two
/// spellings that reach the same file through a chain of links.
///
/// # Errors
///
/// Returns [`ReconcileError`] when the target's metadata or link destination
/// cannot be read for any reason other than the target not existing.
pub fn inspect(target: &Path, intended_source: &Path) -> Result<LinkState, ReconcileError> {
    let meta = match std::fs::symlink_metadata(target) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LinkState::Absent),
        Err(e) => return Err(ReconcileError::io(FsOp::Inspect, target, e)),
    };

    if meta.file_type().is_symlink() {
        let current = std::fs::read_link(target)
            .map_err(|e| ReconcileError::io(FsOp::ReadLink, target, e))?;
        if same_destination(&current, intended_source) {
            return Ok(LinkState::CorrectSymlink);
        }
        return Ok(LinkState::WrongSymlink { current });
    }

    let kind = if meta.is_dir() {
        EntryKind::Directory
    } else if meta.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    };
    Ok(LinkState::OtherEntry { kind })
}

fn same_destination(current: &Path, intended: &Path) -> bool {
    strip_verbatim_prefix(current) == strip_verbatim_prefix(intended)
}

/// Windows `read_link` may hand back `\\?\C:\...` for a link created as
/// `C:\...`; that prefix is the only normalisation applied.
fn strip_verbatim_prefix(p: &Path) -> &OsStr {
    #[cfg(windows)]
    {
        if let Some(rest) = p.to_str().and_then(|s| s.strip_prefix(r"\\?\")) {
            return OsStr::new(rest);
        }
    }
    p.as_os_str()
}
