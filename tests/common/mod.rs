// Shared helpers for integration tests.
//
// Provides an isolated home, work directory and dotfiles repository under one
// temporary directory, plus a fluent builder for populating them.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dfo::config::{FileConfig, Overrides, Settings};
use dfo::context::RunContext;
use dfo::declaration::{DECLARATION_FILE, Declaration};

/// An isolated home/work/repo layout backed by a [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    /// Temporary directory containing `home/`, `home/.dfo/` and `repo/`.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create empty `home/` and `repo/` directories.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("home")).expect("create home");
        std::fs::create_dir_all(root.path().join("repo")).expect("create repo");
        Self { root }
    }

    /// The fake home directory.
    pub fn home(&self) -> PathBuf {
        self.root.path().join("home")
    }

    /// The dotfiles repository.
    pub fn repo(&self) -> PathBuf {
        self.root.path().join("repo")
    }

    /// The work directory (`home/.dfo`), not created up front.
    pub fn work_dir(&self) -> PathBuf {
        self.home().join(".dfo")
    }

    /// Settings pointing at this layout, with git updates disabled.
    pub fn settings(&self, dry_run: bool, backup: bool) -> Settings {
        let overrides = Overrides {
            repo_dir: Some(self.repo()),
            update_git: Some(false),
            dry_run: Some(dry_run),
            backup: Some(backup),
            ..Overrides::default()
        };
        Settings::resolve(
            &self.home(),
            self.root.path(),
            FileConfig::default(),
            &overrides,
        )
    }

    /// Run context derived from [`settings`](Self::settings).
    pub fn run_context(&self, dry_run: bool, backup: bool) -> RunContext {
        self.settings(dry_run, backup).run_context()
    }

    /// Load the declaration written by the builder.
    pub fn declaration(&self) -> Declaration {
        Declaration::load(&self.repo()).expect("load declaration")
    }

    /// Record every entry under `home/` with its kind, link text or content.
    ///
    /// Two snapshots are equal only if nothing below home was created,
    /// removed, retargeted or rewritten.
    pub fn snapshot_home(&self) -> BTreeMap<PathBuf, String> {
        let mut out = BTreeMap::new();
        snapshot_dir(&self.home(), &self.home(), &mut out);
        out
    }
}

fn snapshot_dir(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, String>) {
    for entry in std::fs::read_dir(dir).expect("read dir") {
        let path = entry.expect("dir entry").path();
        let rel = path.strip_prefix(root).expect("under root").to_path_buf();
        let meta = std::fs::symlink_metadata(&path).expect("lstat");
        if meta.file_type().is_symlink() {
            let dest = std::fs::read_link(&path).expect("read link");
            out.insert(rel, format!("link {}", dest.display()));
        } else if meta.is_dir() {
            out.insert(rel, "dir".to_string());
            snapshot_dir(root, &path, out);
        } else {
            let content = std::fs::read(&path).expect("read file");
            out.insert(rel, format!("file {content:?}"));
        }
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
    declaration: String,
}

impl TestContextBuilder {
    /// Begin building an empty layout.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
            declaration: String::new(),
        }
    }

    /// The repository directory of the layout being built.
    pub fn repo(&self) -> PathBuf {
        self.ctx.repo()
    }

    /// Declare `target: source` in `dfo.yaml`.
    pub fn with_entry(mut self, target: &str, source: &str) -> Self {
        self.declaration.push_str(&format!("{target}: {source}\n"));
        self
    }

    /// Write a file inside the repository.
    pub fn with_repo_file(self, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.repo().join(rel), content);
        self
    }

    /// Write a file inside the home directory.
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.home().join(rel), content);
        self
    }

    /// Create a directory inside the home directory.
    pub fn with_home_dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.ctx.home().join(rel)).expect("create home dir");
        self
    }

    /// Create a symlink inside the home directory.
    #[cfg(unix)]
    pub fn with_home_symlink(self, rel: &str, dest: &Path) -> Self {
        let link = self.ctx.home().join(rel);
        if let Some(parent) = link.parent() {
            std::fs::create_dir_all(parent).expect("create link parent");
        }
        std::os::unix::fs::symlink(dest, link).expect("create symlink");
        self
    }

    /// Write `dfo.yaml` and return the context.
    pub fn build(self) -> IntegrationTestContext {
        std::fs::write(self.ctx.repo().join(DECLARATION_FILE), &self.declaration)
            .expect("write declaration");
        self.ctx
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, content).expect("write file");
}
