//! Lexical resolution of declared sources and targets.
use std::path::{Component, Path, PathBuf};

/// Resolve a declared source against the repository directory.
///
/// Absolute sources are returned unchanged; relative ones are appended to
/// `repo_dir`.  Nothing is checked on disk.
///
/// # Examples
///
/// ```
/// use dfo::reconcile::paths::resolve_source;
/// use std::path::{Path, PathBuf};
///
/// let repo = Path::new("/home/u/.dfo/dotfiles");
/// assert_eq!(
///     resolve_source(Path::new("vim/vimrc"), repo),
///     PathBuf::from("/home/u/.dfo/dotfiles/vim/vimrc")
/// );
/// ```
#[must_use]
pub fn resolve_source(source: &Path, repo_dir: &Path) -> PathBuf {
    if source.is_absolute() {
        source.to_path_buf()
    } else {
        repo_dir.join(source)
    }
}

/// Resolve a declared target against the home directory.
///
/// Targets are always home-relative: a leading root (or drive prefix) is
/// dropped instead of honoured, so `/.vimrc` and `.vimrc` resolve to the same
/// path.
#[must_use]
pub fn resolve_target(target: &Path, home_dir: &Path) -> PathBuf {
    home_dir.join(relative_target(target))
}

/// `target` with any root or prefix component removed.
///
/// This is the path mirrored under the backup directory, so it must agree
/// with [`resolve_target`].
#[must_use]
pub fn relative_target(target: &Path) -> PathBuf {
    target
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect()
}
