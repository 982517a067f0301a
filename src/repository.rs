//! Fetching and updating the dotfiles repository with git.
use std::path::{Path, PathBuf};

use anyhow::Result;
use thiserror::Error;

use crate::error::ConfigError;
use crate::exec::Executor;
use crate::logging::Log;

/// Errors from git operations on the repository.
#[derive(Error, Debug)]
pub enum GitError {
    /// `git` could not be found on `PATH`.
    #[error("git is required but was not found on PATH")]
    NotInstalled,

    /// The repository path cannot be passed to git as an argument.
    #[error("repository path is not valid UTF-8: {}", path.display())]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },

    /// A git command failed.
    #[error("git {action} failed: {message}")]
    Command {
        /// What git was asked to do (`clone`, `pull`, ...).
        action: &'static str,
        /// Error chain from the executor.
        message: String,
    },
}

/// What [`Repository::prepare`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStatus {
    /// The repository exists and was left alone.
    Present,
    /// The repository was pulled and its submodules updated.
    Updated,
    /// The repository was cloned.
    Cloned,
    /// Dry-run: the repository would have been pulled.
    WouldUpdate,
    /// Dry-run: the repository would have been cloned.
    WouldClone,
}

/// The local clone of the dotfiles repository.
pub struct Repository<'a> {
    dir: &'a Path,
    remote: Option<&'a str>,
    executor: &'a dyn Executor,
    log: &'a dyn Log,
}

impl std::fmt::Debug for Repository<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("dir", &self.dir)
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}

impl<'a> Repository<'a> {
    /// Describe the clone at `dir`, optionally tracking `remote`.
    #[must_use]
    pub fn new(
        dir: &'a Path,
        remote: Option<&'a str>,
        executor: &'a dyn Executor,
        log: &'a dyn Log,
    ) -> Self {
        Self {
            dir,
            remote: remote.filter(|r| !r.trim().is_empty()),
            executor,
            log,
        }
    }

    /// Make sure the repository exists locally, cloning it if needed, and
    /// pull it when `update` is set.
    ///
    /// A fresh clone is not pulled again.  In dry-run nothing runs; a
    /// missing repository is still an error because its declaration could
    /// not be read.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoRepository`] when the repository is missing
    /// and no remote is configured, and a [`GitError`] when git is missing or
    /// a git command fails.
    pub fn prepare(&self, dry_run: bool, update: bool) -> Result<RepoStatus> {
        let exists = self.dir.is_dir();
        match (exists, self.remote) {
            (false, None) => Err(ConfigError::NoRepository {
                repo_dir: self.dir.to_path_buf(),
            }
            .into()),
            (false, Some(remote)) if dry_run => {
                self.log.dry_run(&format!(
                    "would clone {remote} into {}",
                    self.dir.display()
                ));
                Ok(RepoStatus::WouldClone)
            }
            (false, Some(remote)) => {
                self.clone_remote(remote)?;
                Ok(RepoStatus::Cloned)
            }
            (true, _) if !update => {
                self.log.debug("repository update disabled");
                Ok(RepoStatus::Present)
            }
            (true, _) if dry_run => {
                self.log
                    .dry_run(&format!("would git pull in {}", self.dir.display()));
                Ok(RepoStatus::WouldUpdate)
            }
            (true, _) => {
                self.pull()?;
                Ok(RepoStatus::Updated)
            }
        }
    }

    fn clone_remote(&self, remote: &str) -> Result<(), GitError> {
        self.ensure_git()?;
        let dir = self.dir.to_str().ok_or_else(|| GitError::NonUtf8Path {
            path: self.dir.to_path_buf(),
        })?;
        self.log
            .info(&format!("cloning {remote} into {}", self.dir.display()));
        self.executor
            .run("git", &["clone", remote, dir])
            .map_err(|e| command_error("clone", &e))?;
        self.update_submodules()
    }

    fn pull(&self) -> Result<(), GitError> {
        self.ensure_git()?;
        self.log
            .debug(&format!("pulling in {}", self.dir.display()));
        let result = self
            .executor
            .run_in(self.dir, "git", &["pull"])
            .map_err(|e| command_error("pull", &e))?;
        let output = result.stdout.trim();
        self.log.debug(&format!("git pull output: {output}"));
        if output.contains("Already up to date") {
            self.log.info("repository already up to date");
        } else {
            self.log.info("repository updated");
        }
        self.update_submodules()
    }

    fn update_submodules(&self) -> Result<(), GitError> {
        self.log.debug("updating submodules");
        self.executor
            .run_in(
                self.dir,
                "git",
                &["submodule", "update", "--init", "--recursive"],
            )
            .map_err(|e| command_error("submodule update", &e))?;
        Ok(())
    }

    fn ensure_git(&self) -> Result<(), GitError> {
        if self.executor.which("git") {
            Ok(())
        } else {
            Err(GitError::NotInstalled)
        }
    }
}

fn command_error(action: &'static str, e: &anyhow::Error) -> GitError {
    GitError::Command {
        action,
        message: format!("{e:#}"),
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::test_helpers::RecordingExecutor;
    use super::*;
    use crate::logging::Logger;

    #[test]
    fn missing_repo_without_remote_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("dotfiles");
        let exec = RecordingExecutor::new();
        let log = Logger::new(None);
        let err = Repository::new(&dir, None, &exec, &log)
            .prepare(false, true)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::NoRepository { .. })
        ));
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn blank_remote_counts_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("dotfiles");
        let exec = RecordingExecutor::new();
        let log = Logger::new(None);
        let err = Repository::new(&dir, Some("  "), &exec, &log)
            .prepare(false, false)
            .unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn missing_repo_is_cloned_with_submodules() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("dotfiles");
        let exec = RecordingExecutor::new();
        let log = Logger::new(None);
        let status = Repository::new(&dir, Some("https://example.com/dots.git"), &exec, &log)
            .prepare(false, true)
            .unwrap();
        assert_eq!(status, RepoStatus::Cloned);
        let calls = exec.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            format!("git clone https://example.com/dots.git {}", dir.display())
        );
        assert!(calls[1].ends_with("git submodule update --init --recursive"));
    }

    #[test]
    fn existing_repo_is_pulled_when_updating() {
        let tmp = tempfile::tempdir().unwrap();
        let exec = RecordingExecutor::new().with_stdout("Already up to date.\n");
        let log = Logger::new(None);
        let status = Repository::new(tmp.path(), None, &exec, &log)
            .prepare(false, true)
            .unwrap();
        assert_eq!(status, RepoStatus::Updated);
        let calls = exec.calls();
        assert!(calls[0].ends_with("git pull"));
        assert!(calls[1].ends_with("git submodule update --init --recursive"));
    }

    #[test]
    fn existing_repo_is_left_alone_without_update() {
        let tmp = tempfile::tempdir().unwrap();
        let exec = RecordingExecutor::new();
        let log = Logger::new(None);
        let status = Repository::new(tmp.path(), Some("git@host:dots"), &exec, &log)
            .prepare(false, false)
            .unwrap();
        assert_eq!(status, RepoStatus::Present);
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn dry_run_runs_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("dotfiles");
        let exec = RecordingExecutor::new();
        let log = Logger::new(None);

        let cloned = Repository::new(&missing, Some("git@host:dots"), &exec, &log)
            .prepare(true, true)
            .unwrap();
        let pulled = Repository::new(tmp.path(), None, &exec, &log)
            .prepare(true, true)
            .unwrap();
        assert_eq!(cloned, RepoStatus::WouldClone);
        assert_eq!(pulled, RepoStatus::WouldUpdate);
        assert!(exec.calls().is_empty());
        assert!(!missing.exists());
    }

    #[test]
    fn missing_git_fails_before_running_anything() {
        let tmp = tempfile::tempdir().unwrap();
        let exec = RecordingExecutor::new().without_git();
        let log = Logger::new(None);
        let err = Repository::new(tmp.path(), None, &exec, &log)
            .prepare(false, true)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GitError>(),
            Some(GitError::NotInstalled)
        ));
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn failed_pull_skips_submodules() {
        let tmp = tempfile::tempdir().unwrap();
        let exec = RecordingExecutor::new().failing_on("pull");
        let log = Logger::new(None);
        let err = Repository::new(tmp.path(), None, &exec, &log)
            .prepare(false, true)
            .unwrap_err();
        assert!(err.to_string().starts_with("git pull failed"), "{err}");
        assert_eq!(exec.calls().len(), 1);
    }
}
