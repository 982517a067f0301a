//! Command-line interface definitions.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Overrides;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "dfo",
    about = "Keep dotfile symlinks in $HOME in sync with a git repository",
    version
)]
pub struct Cli {
    /// Command to run (defaults to `link`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options accepted before or after the command
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Read settings from this file instead of ~/.dfo/config.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Work directory holding the repository, backups and log [default: ~/.dfo]
    #[arg(long = "workdir", global = true, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Repository directory [default: <workdir>/dotfiles]
    #[arg(long, global = true, value_name = "DIR")]
    pub repo_dir: Option<PathBuf>,

    /// Git remote to clone when the repository does not exist yet
    #[arg(long = "gitrepo", global = true, value_name = "URL")]
    pub git_repo: Option<String>,

    /// Preview changes without applying
    #[arg(short = 'd', long, visible_alias = "noop", global = true)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Back up existing files before replacing them (default)
    #[arg(long, global = true, overrides_with = "no_backup")]
    pub backup: bool,

    /// Replace existing files without backing them up
    #[arg(long, global = true, overrides_with = "backup")]
    pub no_backup: bool,

    /// Pull the repository before linking (default)
    #[arg(long, global = true, overrides_with = "no_update_git")]
    pub update_git: bool,

    /// Do not pull the repository before linking
    #[arg(long, global = true, overrides_with = "update_git")]
    pub no_update_git: bool,
}

impl GlobalOpts {
    /// Settings overrides expressed by these flags.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            work_dir: self.work_dir.clone(),
            repo_dir: self.repo_dir.clone(),
            git_repo: self.git_repo.clone(),
            backup: flag_pair(self.backup, self.no_backup),
            update_git: flag_pair(self.update_git, self.no_update_git),
            verbose: self.verbose.then_some(true),
            dry_run: self.dry_run.then_some(true),
        }
    }
}

/// `--x` / `--no-x`: `None` when neither was given.
const fn flag_pair(enable: bool, disable: bool) -> Option<bool> {
    match (enable, disable) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fetch the repository and link every declared dotfile
    Link,
    /// Show the state of every declared dotfile without changing anything
    Status,
    /// Print version information
    Version,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_link() {
        let cli = Cli::parse_from(["dfo"]);
        assert_eq!(cli.command, None);
        assert_eq!(cli.global.overrides(), Overrides::default());
    }

    #[test]
    fn parse_subcommands() {
        assert_eq!(Cli::parse_from(["dfo", "link"]).command, Some(Command::Link));
        assert_eq!(
            Cli::parse_from(["dfo", "status"]).command,
            Some(Command::Status)
        );
        assert_eq!(
            Cli::parse_from(["dfo", "version"]).command,
            Some(Command::Version)
        );
    }

    #[test]
    fn dry_run_short_long_and_alias() {
        for flag in ["-d", "--dry-run", "--noop"] {
            let cli = Cli::parse_from(["dfo", flag]);
            assert_eq!(cli.global.overrides().dry_run, Some(true), "{flag}");
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["dfo", "link", "-v", "--workdir", "/tmp/dfo"]);
        assert!(cli.global.verbose);
        assert_eq!(cli.global.work_dir, Some(PathBuf::from("/tmp/dfo")));
    }

    #[test]
    fn gitrepo_and_repo_dir() {
        let cli = Cli::parse_from([
            "dfo",
            "--gitrepo",
            "https://example.com/dots.git",
            "--repo-dir",
            "/srv/dots",
        ]);
        let o = cli.global.overrides();
        assert_eq!(o.git_repo.as_deref(), Some("https://example.com/dots.git"));
        assert_eq!(o.repo_dir, Some(PathBuf::from("/srv/dots")));
    }

    #[test]
    fn no_backup_and_no_update_git() {
        let cli = Cli::parse_from(["dfo", "--no-backup", "--no-update-git"]);
        let o = cli.global.overrides();
        assert_eq!(o.backup, Some(false));
        assert_eq!(o.update_git, Some(false));
    }

    #[test]
    fn last_of_a_flag_pair_wins() {
        let cli = Cli::parse_from(["dfo", "--no-backup", "--backup"]);
        assert_eq!(cli.global.overrides().backup, Some(true));
        let cli = Cli::parse_from(["dfo", "--backup", "--no-backup"]);
        assert_eq!(cli.global.overrides().backup, Some(false));
    }

    #[test]
    fn config_path() {
        let cli = Cli::parse_from(["dfo", "status", "--config", "/etc/dfo.toml"]);
        assert_eq!(
            cli.global.overrides().config,
            Some(PathBuf::from("/etc/dfo.toml"))
        );
    }
}
