//! Dotfile reconciliation engine.
//!
//! `dfo` keeps a set of symlinks in the home directory pointing into a git
//! checkout of dotfiles.  The declaration `dfo.yaml` at the repository root
//! maps home-relative targets to sources; every run makes each target a
//! symlink to its source, hard-link backing up whatever was there before.
//!
//! The public API is organised into layers:
//!
//! - **[`reconcile`]**: inspection, backup and symlink replacement
//! - **[`declaration`]** and **[`config`]**: what to link and where
//! - **[`repository`]**: cloning and pulling the dotfiles repository
//! - **[`commands`]**: top-level subcommand orchestration (`link`, `status`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod declaration;
pub mod error;
pub mod exec;
pub mod logging;
pub mod reconcile;
pub mod repository;
