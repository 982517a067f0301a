//! Per-run backup directory and preservation of replaced content.
use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, SecondsFormat, TimeZone};

use super::error::{FsOp, ReconcileError};
use super::fs;
use super::paths::relative_target;
use crate::context::RunContext;
use crate::logging::Log;

/// Directory under the work dir that holds one subdirectory per run.
pub const BACKUPS_DIR: &str = "backups";

/// Prefix of every per-run backup directory name.
pub const BACKUP_PREFIX: &str = "dfo_backup_";

/// Name of the backup directory for a run started at `timestamp`.
///
/// The timestamp is RFC 3339 with nanoseconds, so names sort by time.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use dfo::reconcile::backup_dir_name;
///
/// let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
/// # #[cfg(unix)]
/// assert_eq!(backup_dir_name(&ts), "dfo_backup_2023-11-14T22:13:20.000000000Z");
/// ```
#[must_use]
pub fn backup_dir_name<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let stamp = timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true);
    // `:` is not allowed in Windows file names.
    #[cfg(windows)]
    let stamp = stamp.replace(':', "-");
    format!("{BACKUP_PREFIX}{stamp}")
}

/// What [`BackupManager::backup`] did for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// Nothing existed at the target.
    NothingToPreserve,
    /// The target's content was hard-linked to `destination`.
    Preserved {
        /// Mirror of the target inside the backup directory.
        destination: PathBuf,
    },
    /// Dry-run: the content would have been preserved at `destination`.
    WouldPreserve {
        /// Mirror of the target inside the backup directory.
        destination: PathBuf,
    },
}

impl BackupOutcome {
    /// The backup location, if anything was (or would be) preserved.
    #[must_use]
    pub fn destination(&self) -> Option<&Path> {
        match self {
            Self::NothingToPreserve => None,
            Self::Preserved { destination } | Self::WouldPreserve { destination } => {
                Some(destination)
            }
        }
    }
}

/// Preserves existing content under a single timestamped directory per run.
///
/// The directory path is computed the first time a target actually has
/// something to preserve and is reused for the rest of the run, even if the
/// directory disappears in between.  Runs where every target is absent or
/// already linked never create it.
///
/// Backups are hard links sharing inodes with the originals, which are
/// removed right after being backed up.
pub struct BackupManager<'a> {
    ctx: &'a RunContext,
    log: &'a dyn Log,
    clock: fn() -> DateTime<Local>,
    dir: OnceCell<PathBuf>,
}

impl fmt::Debug for BackupManager<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupManager")
            .field("backups_root", &self.ctx.backups_root())
            .field("dir", &self.dir.get())
            .finish_non_exhaustive()
    }
}

impl<'a> BackupManager<'a> {
    /// Create a manager stamping its directory with the local wall clock.
    #[must_use]
    pub fn new(ctx: &'a RunContext, log: &'a dyn Log) -> Self {
        Self::with_clock(ctx, log, Local::now)
    }

    /// Create a manager that reads the run timestamp from `clock`.
    #[must_use]
    pub const fn with_clock(
        ctx: &'a RunContext,
        log: &'a dyn Log,
        clock: fn() -> DateTime<Local>,
    ) -> Self {
        Self {
            ctx,
            log,
            clock,
            dir: OnceCell::new(),
        }
    }

    /// The run's backup directory, computing it on first use.
    #[must_use]
    pub fn backup_dir(&self) -> &Path {
        self.dir.get_or_init(|| {
            self.ctx
                .backups_root()
                .join(backup_dir_name(&(self.clock)()))
        })
    }

    /// The backup directory if one has been computed during this run.
    #[must_use]
    pub fn current_dir(&self) -> Option<&Path> {
        self.dir.get().map(PathBuf::as_path)
    }

    /// Create the backup directory and its `backups/` parent.
    ///
    /// An existing directory is success.  In dry-run the path is computed but
    /// nothing is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_backup_dir(&self) -> Result<&Path, ReconcileError> {
        let dir = self.backup_dir();
        if !self.ctx.dry_run {
            fs::ensure_dir(dir)?;
        }
        Ok(dir)
    }

    /// Preserve whatever exists at the home-relative `target`.
    ///
    /// The target is looked at without following a final symlink: a
    /// symlink (even a dangling one) is preserved as a link, a directory is
    /// replicated with hard-linked contents, anything else is hard-linked.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be inspected or any directory or
    /// link in the backup cannot be created.  A partial backup is left as is.
    pub fn backup(&self, target: &Path) -> Result<BackupOutcome, ReconcileError> {
        let relative = relative_target(target);
        let original = self.ctx.home.join(&relative);
        let meta = match std::fs::symlink_metadata(&original) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BackupOutcome::NothingToPreserve);
            }
            Err(e) => return Err(ReconcileError::io(FsOp::Inspect, &original, e)),
        };

        let destination = self.backup_dir().join(&relative);
        if self.ctx.dry_run {
            self.log.dry_run(&format!(
                "would back up {} to {}",
                original.display(),
                destination.display()
            ));
            return Ok(BackupOutcome::WouldPreserve { destination });
        }

        self.log
            .debug(&format!("ensuring {} exists", self.backup_dir().display()));
        self.ensure_backup_dir()?;
        fs::ensure_parent_dir(&destination)?;

        self.log.info(&format!("backing up {}", original.display()));
        if meta.is_dir() {
            fs::link_tree(&original, &destination)?;
        } else {
            fs::link_entry(&original, &destination)?;
        }
        Ok(BackupOutcome::Preserved { destination })
    }
}
