//! Structured logger with dry-run awareness and summary collection.
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::types::{EntryRecord, EntryStatus, Log};

/// Tracing target for stage headers.
pub(super) const STAGE_TARGET: &str = "dfo::stage";
/// Tracing target for skipped dry-run actions.
pub(super) const DRY_RUN_TARGET: &str = "dfo::dry_run";

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name.
///
/// `record_entry` is written out by hand since its signature differs.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Logger emitting [`tracing`] events and collecting per-entry results.
///
/// Output formatting and the optional log file are handled by the
/// subscriber installed with [`init_subscriber`](super::init_subscriber);
/// the logger only remembers the log file path to mention it in the
/// summary.
#[derive(Debug, Default)]
pub struct Logger {
    entries: Mutex<Vec<EntryRecord>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger; `log_file` is shown at the end of the summary.
    #[must_use]
    pub const fn new(log_file: Option<PathBuf>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// The log file mentioned in the summary, if any.
    #[must_use]
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// All entry results recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<EntryRecord> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log an action that dry-run mode skipped.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record an entry result for the summary.
    pub fn record_entry(&self, target: &str, status: EntryStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(EntryRecord {
                target: target.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Summary lines (with ANSI colour) for the recorded entries.
    ///
    /// Empty when nothing was recorded.
    #[must_use]
    pub fn render_summary(&self) -> Vec<String> {
        let entries = self.entries();
        if entries.is_empty() {
            return Vec::new();
        }

        let mut linked = 0u32;
        let mut already = 0u32;
        let mut dry_run = 0u32;
        let mut failed = 0u32;
        let mut lines = Vec::with_capacity(entries.len() + 2);

        for entry in &entries {
            let (icon, color) = match entry.status {
                EntryStatus::Linked => {
                    linked += 1;
                    ("✓", "\x1b[32m")
                }
                EntryStatus::AlreadyLinked => {
                    already += 1;
                    ("·", "\x1b[2m")
                }
                EntryStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[37m")
                }
                EntryStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };
            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            lines.push(format!("{color}{icon} {}{suffix}\x1b[0m", entry.target));
        }

        let total = linked + already + dry_run + failed;
        lines.push(format!(
            "{total} entries: \x1b[32m{linked} linked\x1b[0m, \x1b[2m{already} already linked\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));
        if let Some(path) = &self.log_file {
            lines.push(format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
        lines
    }

    /// Log the summary of all recorded entries.
    pub fn print_summary(&self) {
        let lines = self.render_summary();
        if lines.is_empty() {
            return;
        }
        self.stage("Summary");
        for line in &lines {
            self.info(line);
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_entry(&self, target: &str, status: EntryStatus, message: Option<&str>) {
        self.record_entry(target, status, message);
    }
}
