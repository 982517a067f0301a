//! Command: fetch the repository and link every declared dotfile.
use anyhow::{Context as _, Result};

use super::Session;
use super::version::version;
use crate::cli::GlobalOpts;
use crate::config::Settings;
use crate::declaration::Declaration;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Logger;
use crate::reconcile::{Reconciler, RunReport};
use crate::repository::Repository;

/// Run the link command.
///
/// # Errors
///
/// Returns an error if settings, the repository, the declaration or any
/// entry fails.
pub fn run(global: &GlobalOpts) -> Result<()> {
    let session = Session::init(global, true)?;
    execute(&session.settings, &SystemExecutor, &session.log)?;
    Ok(())
}

/// Prepare the work directory and repository, then reconcile the
/// declaration.
///
/// The summary is logged whether or not reconciliation succeeds.
///
/// # Errors
///
/// Returns an error if the work directory cannot be created, the repository
/// cannot be prepared, the declaration cannot be loaded, or reconciliation
/// stops on a failing entry.
pub fn execute(settings: &Settings, executor: &dyn Executor, log: &Logger) -> Result<RunReport> {
    log.info(&format!("dfo {}", version()));
    if settings.dry_run {
        log.dry_run("no changes will be made");
    }

    log.stage("Preparing repository");
    if settings.dry_run {
        if !settings.work_dir.is_dir() {
            log.dry_run(&format!("would create {}", settings.work_dir.display()));
        }
    } else {
        std::fs::create_dir_all(&settings.work_dir).with_context(|| {
            format!(
                "creating work directory {}",
                settings.work_dir.display()
            )
        })?;
    }
    Repository::new(
        &settings.repo_dir,
        settings.git_repo.as_deref(),
        executor,
        log,
    )
    .prepare(settings.dry_run, settings.update_git)?;

    log.stage("Loading declaration");
    let declaration = Declaration::load(&settings.repo_dir)
        .with_context(|| format!("loading {}", settings.declaration_path().display()))?;
    log.info(&format!("{} entries declared", declaration.len()));
    super::warn_overridden(&declaration, log);

    log.stage("Linking dotfiles");
    let ctx = settings.run_context();
    let result = Reconciler::new(&ctx, log).run(&declaration);
    log.print_summary();
    let report = result.context("linking dotfiles")?;

    if let Some(dir) = &report.backup_dir {
        let verb = if settings.dry_run {
            "would be backed up to"
        } else {
            "backed up to"
        };
        log.info(&format!(
            "{} entries {verb} {}",
            report.backed_up(),
            dir.display()
        ));
    }
    Ok(report)
}
