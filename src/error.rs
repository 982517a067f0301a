//! Configuration error types.
//!
//! Reconciliation failures live in [`crate::reconcile::ReconcileError`];
//! everything that goes wrong *before* reconciliation starts (settings,
//! declaration file, missing repository) is a [`ConfigError`].  Command
//! handlers convert both to [`anyhow::Error`] via `?`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling settings and the declaration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Neither `HOME` nor (on Windows) `USERPROFILE` is set.
    #[error("cannot determine home directory: HOME is not set")]
    HomeNotSet,

    /// The current working directory could not be read.
    #[error("cannot determine current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    /// No repository exists locally and no remote was configured to clone.
    #[error(
        "no git repo has been specified and no working repo exists in {}, aborting",
        repo_dir.display()
    )]
    NoRepository {
        /// Where the repository was expected.
        repo_dir: PathBuf,
    },

    /// A config or declaration file could not be read.
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A config or declaration file is syntactically invalid.
    #[error("invalid syntax in {}: {message}", path.display())]
    Parse {
        /// Path to the offending file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A declared `(target, source)` pair is unusable.
    #[error("invalid entry '{target}': {reason}")]
    InvalidEntry {
        /// Declared target, as written.
        target: String,
        /// Why the entry was rejected.
        reason: String,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn no_repository_names_the_directory() {
        let e = ConfigError::NoRepository {
            repo_dir: PathBuf::from("/home/u/.dfo/dotfiles"),
        };
        assert_eq!(
            e.to_string(),
            "no git repo has been specified and no working repo exists in /home/u/.dfo/dotfiles, aborting"
        );
    }

    #[test]
    fn io_display_and_source() {
        use std::error::Error as _;
        let e = ConfigError::Io {
            path: PathBuf::from("/home/u/.dfo/config.toml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.to_string().contains("/home/u/.dfo/config.toml"));
        assert!(e.source().is_some());
    }

    #[test]
    fn invalid_entry_display() {
        let e = ConfigError::InvalidEntry {
            target: "../escape".to_string(),
            reason: "target must stay inside the home directory".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "invalid entry '../escape': target must stay inside the home directory"
        );
    }

    #[test]
    fn config_error_converts_to_anyhow() {
        let e = ConfigError::HomeNotSet;
        let any: anyhow::Error = e.into();
        assert!(any.downcast_ref::<ConfigError>().is_some());
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn config_error_is_send_sync() {
        assert_send_sync::<ConfigError>();
    }
}
