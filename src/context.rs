//! Immutable per-invocation context shared by the reconciliation components.
use std::path::PathBuf;

use crate::reconcile::BACKUPS_DIR;

/// Directories and flags for one run.
///
/// Built once from [`Settings`](crate::config::Settings) and passed by
/// reference; nothing mutates it after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Home directory that declared targets are relative to.
    pub home: PathBuf,
    /// Absolute path of the dotfiles repository.
    pub repo_dir: PathBuf,
    /// Absolute path of the work directory (holds `backups/` and the log).
    pub work_dir: PathBuf,
    /// Report intended changes without touching the filesystem.
    pub dry_run: bool,
    /// Preserve existing content before replacing it.
    pub backup: bool,
}

impl RunContext {
    /// Create a context with backups enabled and dry-run off.
    #[must_use]
    pub const fn new(home: PathBuf, repo_dir: PathBuf, work_dir: PathBuf) -> Self {
        Self {
            home,
            repo_dir,
            work_dir,
            dry_run: false,
            backup: true,
        }
    }

    /// Set the dry-run flag.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set whether existing content is backed up.
    #[must_use]
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    /// Directory holding the per-run backup directories.
    #[must_use]
    pub fn backups_root(&self) -> PathBuf {
        self.work_dir.join(BACKUPS_DIR)
    }
}
