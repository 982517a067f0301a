//! Command: report the state of every declared dotfile.
use anyhow::{Context as _, Result};

use super::Session;
use crate::cli::GlobalOpts;
use crate::config::Settings;
use crate::declaration::{Declaration, DotfileEntry};
use crate::error::ConfigError;
use crate::logging::Logger;
use crate::reconcile::{LinkState, Reconciler};

/// Run the status command.
///
/// Never writes a log file, clones, pulls or touches the home directory.
///
/// # Errors
///
/// Returns an error if settings or the declaration cannot be loaded, or a
/// target cannot be inspected.
pub fn run(global: &GlobalOpts) -> Result<()> {
    let session = Session::init(global, false)?;
    let states = execute(&session.settings, &session.log)?;
    let pending = states
        .iter()
        .filter(|(_, state)| state.needs_replacement())
        .count();
    if pending == 0 {
        session.log.info("everything is linked");
    } else {
        session
            .log
            .info(&format!("{pending} of {} entries need linking", states.len()));
    }
    Ok(())
}

/// Inspect every declared target and log one line per entry.
///
/// # Errors
///
/// Returns an error if the repository or declaration is missing or a target
/// cannot be inspected.
pub fn execute(settings: &Settings, log: &Logger) -> Result<Vec<(DotfileEntry, LinkState)>> {
    if !settings.repo_dir.is_dir() {
        return Err(ConfigError::NoRepository {
            repo_dir: settings.repo_dir.clone(),
        }
        .into());
    }
    let declaration = Declaration::load(&settings.repo_dir)
        .with_context(|| format!("loading {}", settings.declaration_path().display()))?;

    super::warn_overridden(&declaration, log);

    log.stage("Status");
    let ctx = settings.run_context();
    let reconciler = Reconciler::new(&ctx, log);
    let mut states = Vec::with_capacity(declaration.len());
    for entry in &declaration {
        let state = reconciler
            .inspect(entry)
            .with_context(|| format!("inspecting {}", entry.target().display()))?;
        log.info(&status_line(entry, &state));
        states.push((entry.clone(), state));
    }
    Ok(states)
}

fn status_line(entry: &DotfileEntry, state: &LinkState) -> String {
    let (icon, color) = match state {
        LinkState::CorrectSymlink => ("✓", "\x1b[32m"),
        LinkState::Absent => ("+", "\x1b[37m"),
        LinkState::WrongSymlink { .. } | LinkState::OtherEntry { .. } => ("!", "\x1b[33m"),
    };
    format!(
        "{color}{icon}\x1b[0m {} -> {} ({state})",
        entry.target().display(),
        entry.source().display()
    )
}
