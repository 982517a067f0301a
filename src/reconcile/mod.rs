//! Reconcile declared entries with the home directory.
//!
//! For each [`DotfileEntry`] the [`Reconciler`] inspects the target and, unless
//! it already is the intended symlink, backs up whatever is there, removes
//! it, creates missing parent directories and links the target to its
//! source.  With [`RunContext::dry_run`] set every mutating call is skipped
//! and the intended action is reported instead.
//!
//! The first error aborts the run.  Entries processed before it keep their
//! new state; nothing is rolled back.

mod backup;
mod error;
mod fs;
mod inspect;
pub mod paths;

use std::path::{Path, PathBuf};

pub use backup::{BACKUP_PREFIX, BACKUPS_DIR, BackupManager, BackupOutcome, backup_dir_name};
pub use error::{FsOp, ReconcileError};
pub use inspect::{EntryKind, LinkState, inspect};

use crate::context::RunContext;
use crate::declaration::{Declaration, DotfileEntry};
use crate::logging::{EntryStatus, Log};
use paths::{resolve_source, resolve_target};

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The target already was the intended symlink; nothing was touched.
    AlreadyLinked,
    /// The target was replaced with a symlink.
    Linked {
        /// Where the previous content was preserved, if there was any.
        backup: Option<PathBuf>,
    },
    /// Dry-run: the target would have been replaced.
    WouldLink {
        /// Where the previous content would have been preserved.
        backup: Option<PathBuf>,
    },
}

impl EntryOutcome {
    /// Backup location recorded in the outcome.
    #[must_use]
    pub fn backup(&self) -> Option<&Path> {
        match self {
            Self::AlreadyLinked => None,
            Self::Linked { backup } | Self::WouldLink { backup } => backup.as_deref(),
        }
    }
}

/// Result for one entry of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    /// Absolute target path.
    pub target: PathBuf,
    /// Absolute source path the target links (or would link) to.
    pub source: PathBuf,
    /// State of the target before reconciliation.
    pub state: LinkState,
    /// What was done.
    pub outcome: EntryOutcome,
}

/// Result of a complete run, one report per entry in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Per-entry results.
    pub entries: Vec<EntryReport>,
    /// The run's backup directory, when anything was (or would be) backed up.
    pub backup_dir: Option<PathBuf>,
}

impl RunReport {
    fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }

    /// Entries replaced with a symlink.
    #[must_use]
    pub fn linked(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Linked { .. }))
    }

    /// Entries that needed no change.
    #[must_use]
    pub fn already_linked(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::AlreadyLinked))
    }

    /// Entries a dry-run would have replaced.
    #[must_use]
    pub fn would_link(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::WouldLink { .. }))
    }

    /// Entries whose previous content was (or would be) backed up.
    #[must_use]
    pub fn backed_up(&self) -> usize {
        self.count(|o| o.backup().is_some())
    }
}

/// Drives inspection, backup and replacement for a declaration.
pub struct Reconciler<'a> {
    ctx: &'a RunContext,
    log: &'a dyn Log,
    backups: BackupManager<'a>,
}

impl std::fmt::Debug for Reconciler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("ctx", self.ctx)
            .field("backups", &self.backups)
            .finish_non_exhaustive()
    }
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler for one run.
    #[must_use]
    pub fn new(ctx: &'a RunContext, log: &'a dyn Log) -> Self {
        Self {
            ctx,
            log,
            backups: BackupManager::new(ctx, log),
        }
    }

    /// Inspect the target of `entry` against its resolved source.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be inspected.
    pub fn inspect(&self, entry: &DotfileEntry) -> Result<LinkState, ReconcileError> {
        inspect(
            &resolve_target(entry.target(), &self.ctx.home),
            &resolve_source(entry.source(), &self.ctx.repo_dir),
        )
    }

    /// Replace the target of `entry`, last observed in `state`, with a
    /// symlink to its source.
    ///
    /// Existing content is backed up first when backups are enabled and
    /// `state` says something occupies the target.  The source does not have
    /// to exist.
    ///
    /// # Errors
    ///
    /// Returns an error on the first failing backup, removal, directory
    /// creation or symlink creation.
    pub fn replace(
        &self,
        entry: &DotfileEntry,
        state: &LinkState,
    ) -> Result<EntryOutcome, ReconcileError> {
        let backup = if self.ctx.backup && state.needs_backup() {
            self.backups
                .backup(entry.target())?
                .destination()
                .map(Path::to_path_buf)
        } else {
            None
        };

        let target = resolve_target(entry.target(), &self.ctx.home);
        let source = resolve_source(entry.source(), &self.ctx.repo_dir);

        if self.ctx.dry_run {
            self.log.dry_run(&format!(
                "would link {} -> {}",
                target.display(),
                source.display()
            ));
            return Ok(EntryOutcome::WouldLink { backup });
        }

        if fs::remove_existing(&target)? {
            self.log.debug(&format!("deleted {}", target.display()));
        }
        if let Some(parent) = target.parent() {
            self.log
                .debug(&format!("ensuring {} exists", parent.display()));
        }
        fs::ensure_parent_dir(&target)?;
        fs::create_symlink(&source, &target)?;
        self.log
            .info(&format!("{} -> {}", target.display(), source.display()));
        Ok(EntryOutcome::Linked { backup })
    }

    /// Inspect `entry` and replace its target unless it is already linked.
    ///
    /// # Errors
    ///
    /// Returns the first error from inspection or replacement.
    pub fn reconcile(&self, entry: &DotfileEntry) -> Result<EntryReport, ReconcileError> {
        let target = resolve_target(entry.target(), &self.ctx.home);
        let source = resolve_source(entry.source(), &self.ctx.repo_dir);
        let state = inspect(&target, &source)?;

        let outcome = if state.needs_replacement() {
            self.log
                .debug(&format!("{} is {state}", target.display()));
            self.replace(entry, &state)?
        } else {
            self.log
                .debug(&format!("no changes needed for {}", target.display()));
            EntryOutcome::AlreadyLinked
        };
        Ok(EntryReport {
            target,
            source,
            state,
            outcome,
        })
    }

    /// Reconcile every entry in declaration order.
    ///
    /// Each result is recorded on the logger.  The first failure is recorded
    /// as well and then returned, leaving later entries untouched.
    ///
    /// # Errors
    ///
    /// Returns the first [`ReconcileError`] encountered.
    pub fn run(&self, declaration: &Declaration) -> Result<RunReport, ReconcileError> {
        let mut report = RunReport::default();
        for entry in declaration {
            let name = entry.target().display().to_string();
            match self.reconcile(entry) {
                Ok(entry_report) => {
                    let (status, detail) = match &entry_report.outcome {
                        EntryOutcome::AlreadyLinked => (EntryStatus::AlreadyLinked, None),
                        EntryOutcome::Linked { backup } => (EntryStatus::Linked, backup.as_ref()),
                        EntryOutcome::WouldLink { backup } => {
                            (EntryStatus::DryRun, backup.as_ref())
                        }
                    };
                    let detail = detail.map(|b| format!("backup: {}", b.display()));
                    self.log.record_entry(&name, status, detail.as_deref());
                    report.entries.push(entry_report);
                }
                Err(e) => {
                    self.log
                        .record_entry(&name, EntryStatus::Failed, Some(&e.to_string()));
                    return Err(e);
                }
            }
        }
        report.backup_dir = self.backups.current_dir().map(Path::to_path_buf);
        Ok(report)
    }
}
