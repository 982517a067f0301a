//! Settings assembled from defaults, `~/.dfo/config.toml` and flags.
pub mod toml_loader;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::context::RunContext;
use crate::declaration::DECLARATION_FILE;
use crate::error::ConfigError;

/// Default work directory, relative to home.
pub const DEFAULT_WORK_DIR: &str = ".dfo";
/// Repository directory name inside the work directory.
pub const REPO_DIR_NAME: &str = "dotfiles";
/// Config file name inside the default work directory.
pub const CONFIG_FILE: &str = "config.toml";
/// Log file name inside the work directory.
pub const LOG_FILE: &str = "dfo.log";

/// Contents of the config file; every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Work directory holding the repository, backups and log.
    pub work_dir: Option<PathBuf>,
    /// Repository directory, if not `<work_dir>/dotfiles`.
    pub repo_dir: Option<PathBuf>,
    /// Remote to clone when the repository is missing.
    pub git_repo: Option<String>,
    /// Back up existing content before replacing it.
    pub backup: Option<bool>,
    /// Pull the repository before linking.
    pub update_git: Option<bool>,
    /// Show debug output on the console.
    pub verbose: Option<bool>,
    /// Only report what would change.
    pub dry_run: Option<bool>,
}

/// Values given on the command line; `None` leaves the file or default value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Alternate config file.
    pub config: Option<PathBuf>,
    /// See [`FileConfig::work_dir`].
    pub work_dir: Option<PathBuf>,
    /// See [`FileConfig::repo_dir`].
    pub repo_dir: Option<PathBuf>,
    /// See [`FileConfig::git_repo`].
    pub git_repo: Option<String>,
    /// See [`FileConfig::backup`].
    pub backup: Option<bool>,
    /// See [`FileConfig::update_git`].
    pub update_git: Option<bool>,
    /// See [`FileConfig::verbose`].
    pub verbose: Option<bool>,
    /// See [`FileConfig::dry_run`].
    pub dry_run: Option<bool>,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Home directory.
    pub home: PathBuf,
    /// Absolute work directory.
    pub work_dir: PathBuf,
    /// Absolute repository directory.
    pub repo_dir: PathBuf,
    /// Remote to clone from, if any.
    pub git_repo: Option<String>,
    /// Back up existing content before replacing it.
    pub backup: bool,
    /// Pull the repository before linking.
    pub update_git: bool,
    /// Show debug output on the console.
    pub verbose: bool,
    /// Only report what would change.
    pub dry_run: bool,
}

impl Settings {
    /// Merge `file` and `overrides` onto the defaults.
    ///
    /// Flags win over the file, the file wins over defaults.  `~/` is
    /// expanded against `home` and relative paths are made absolute against
    /// `cwd`.
    #[must_use]
    pub fn resolve(home: &Path, cwd: &Path, file: FileConfig, overrides: &Overrides) -> Self {
        let absolute = |p: PathBuf| absolutize(&p, home, cwd);

        let work_dir = overrides
            .work_dir
            .clone()
            .or(file.work_dir)
            .map_or_else(|| home.join(DEFAULT_WORK_DIR), absolute);
        let repo_dir = overrides
            .repo_dir
            .clone()
            .or(file.repo_dir)
            .map_or_else(|| work_dir.join(REPO_DIR_NAME), absolute);

        Self {
            home: home.to_path_buf(),
            work_dir,
            repo_dir,
            git_repo: overrides.git_repo.clone().or(file.git_repo),
            backup: overrides.backup.or(file.backup).unwrap_or(true),
            update_git: overrides.update_git.or(file.update_git).unwrap_or(true),
            verbose: overrides.verbose.or(file.verbose).unwrap_or(false),
            dry_run: overrides.dry_run.or(file.dry_run).unwrap_or(false),
        }
    }

    /// Resolve settings for the current user and directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home or current directory cannot be
    /// determined, or the config file cannot be read or parsed.
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        let home = home_dir()?;
        let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        let path = overrides.config.as_ref().map_or_else(
            || default_config_path(&home),
            |p| absolutize(p, &home, &cwd),
        );
        let file: FileConfig = toml_loader::load_config(&path)?;
        Ok(Self::resolve(&home, &cwd, file, overrides))
    }

    /// The immutable context handed to the reconciler.
    #[must_use]
    pub fn run_context(&self) -> RunContext {
        RunContext::new(
            self.home.clone(),
            self.repo_dir.clone(),
            self.work_dir.clone(),
        )
        .with_dry_run(self.dry_run)
        .with_backup(self.backup)
    }

    /// Path of the declaration file inside the repository.
    #[must_use]
    pub fn declaration_path(&self) -> PathBuf {
        self.repo_dir.join(DECLARATION_FILE)
    }

    /// Path of the run log inside the work directory.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.work_dir.join(LOG_FILE)
    }
}

/// The user's home directory from `HOME` (or `USERPROFILE` on Windows).
///
/// # Errors
///
/// Returns [`ConfigError::HomeNotSet`] if neither variable is set or it is
/// empty.
pub fn home_dir() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").filter(|h| !h.is_empty());
    #[cfg(windows)]
    let home = home.or_else(|| std::env::var_os("USERPROFILE").filter(|h| !h.is_empty()));
    home.map(PathBuf::from).ok_or(ConfigError::HomeNotSet)
}

/// `<home>/.dfo/config.toml`.
#[must_use]
pub fn default_config_path(home: &Path) -> PathBuf {
    home.join(DEFAULT_WORK_DIR).join(CONFIG_FILE)
}

fn absolutize(path: &Path, home: &Path, cwd: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        home.join(rest)
    } else if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
