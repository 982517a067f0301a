#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the status command.
#![cfg(unix)]

mod common;

use common::TestContextBuilder;
use dfo::commands::{link, status};
use dfo::error::ConfigError;
use dfo::exec::SystemExecutor;
use dfo::logging::Logger;
use dfo::reconcile::{EntryKind, LinkState};

/// Status reports each state without touching the home directory.
#[test]
fn reports_states_read_only() {
    let ctx = TestContextBuilder::new()
        .with_entry(".vimrc", "vim/vimrc")
        .with_entry(".tmux.conf", "tmux.conf")
        .with_entry(".zshrc", "zshrc")
        .with_home_file(".tmux.conf", "X")
        .build();
    std::os::unix::fs::symlink(ctx.repo().join("vim/vimrc"), ctx.home().join(".vimrc")).unwrap();
    let before = ctx.snapshot_home();

    let states = status::execute(&ctx.settings(false, true), &Logger::new(None)).unwrap();

    let states: Vec<_> = states.into_iter().map(|(_, s)| s).collect();
    assert_eq!(
        states,
        [
            LinkState::CorrectSymlink,
            LinkState::OtherEntry {
                kind: EntryKind::File
            },
            LinkState::Absent,
        ]
    );
    assert_eq!(ctx.snapshot_home(), before);
    assert!(!ctx.work_dir().exists());
}

/// After a link run every entry reports as linked.
#[test]
fn converged_after_link() {
    let ctx = TestContextBuilder::new()
        .with_entry(".vimrc", "vim/vimrc")
        .with_entry(".config/git/config", "git/config")
        .build();
    link::execute(&ctx.settings(false, true), &SystemExecutor, &Logger::new(None)).unwrap();

    let states = status::execute(&ctx.settings(false, true), &Logger::new(None)).unwrap();

    assert!(states.iter().all(|(_, s)| *s == LinkState::CorrectSymlink));
}

/// A missing repository is reported rather than cloned.
#[test]
fn missing_repository_is_reported() {
    let ctx = TestContextBuilder::new().build();
    std::fs::remove_dir_all(ctx.repo()).unwrap();

    let err = status::execute(&ctx.settings(false, true), &Logger::new(None)).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::NoRepository { .. })
    ));
}
