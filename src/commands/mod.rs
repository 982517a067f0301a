//! Top-level subcommand orchestration.
pub mod link;
pub mod status;
pub mod version;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::Settings;
use crate::declaration::Declaration;
use crate::logging::{Logger, init_subscriber};

/// Settings and logger shared by the commands.
#[derive(Debug)]
pub struct Session {
    /// Resolved settings.
    pub settings: Settings,
    /// Logger for the run.
    pub log: Logger,
}

impl Session {
    /// Resolve settings from `global` and install the tracing subscriber.
    ///
    /// The log file under the work directory is only opened when
    /// `write_log` is set and the run is not a dry-run.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be resolved.
    pub fn init(global: &GlobalOpts, write_log: bool) -> Result<Self> {
        let settings = Settings::load(&global.overrides())?;
        let log_file = (write_log && !settings.dry_run).then(|| settings.log_file());
        init_subscriber(settings.verbose, log_file.as_deref());
        let log = Logger::new(log_file);
        log.debug(&format!("home: {}", settings.home.display()));
        log.debug(&format!("work dir: {}", settings.work_dir.display()));
        log.debug(&format!("repo dir: {}", settings.repo_dir.display()));
        Ok(Self { settings, log })
    }
}

fn warn_overridden(declaration: &Declaration, log: &Logger) {
    for entry in declaration.overridden() {
        log.warn(&format!(
            "{} is declared more than once; ignoring source {}",
            entry.target().display(),
            entry.source().display()
        ));
    }
}
