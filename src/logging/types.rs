//! Core logging types: entry records, status, and the [`Log`] trait.

/// Per-entry result kept for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    /// Declared target, as written in the declaration.
    pub target: String,
    /// Final status of the entry.
    pub status: EntryStatus,
    /// Optional detail (backup location, error description).
    pub message: Option<String>,
}

/// Status of a reconciled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// The target was replaced with a symlink.
    Linked,
    /// The target already was the intended symlink.
    AlreadyLinked,
    /// Dry-run: the target would have been replaced.
    DryRun,
    /// Reconciling the entry failed and aborted the run.
    Failed,
}

/// Abstraction over logging backends.
///
/// Reconciliation code logs through `&dyn Log` so tests can substitute a
/// recorder for [`Logger`](super::logger::Logger).
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (suppressed on console unless verbose).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log an action that dry-run mode skipped.
    fn dry_run(&self, msg: &str);
    /// Record an entry result for the summary.
    fn record_entry(&self, target: &str, status: EntryStatus, message: Option<&str>);
}
