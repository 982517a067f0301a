//! The declared `target: source` mapping read from the dotfiles repository.
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_yaml_ng::Value;

use crate::error::ConfigError;
use crate::reconcile::paths::relative_target;

/// File at the repository root holding the declaration.
pub const DECLARATION_FILE: &str = "dfo.yaml";

/// One declared pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotfileEntry {
    target: PathBuf,
    source: PathBuf,
}

impl DotfileEntry {
    /// Pair a home-relative `target` with a `source` that is absolute or
    /// relative to the repository.
    pub fn new(target: impl Into<PathBuf>, source: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            source: source.into(),
        }
    }

    /// Target path, relative to the home directory.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Source path, absolute or relative to the repository.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Ordered list of entries.
///
/// Targets are not required to be unique.  [`from_entries`](Self::from_entries)
/// keeps every pair and later ones win because they are processed later;
/// [`parse`](Self::parse) keeps only the last pair for a repeated target and
/// lists the dropped ones in [`overridden`](Self::overridden).
///
/// # Examples
///
/// ```
/// use dfo::declaration::Declaration;
///
/// let decl = Declaration::parse(".vimrc: vim/vimrc\n.vim: vim/vim\n").unwrap();
/// let targets: Vec<_> = decl.iter().map(|e| e.target().to_owned()).collect();
/// assert_eq!(targets, [".vimrc", ".vim"].map(std::path::PathBuf::from));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration {
    entries: Vec<DotfileEntry>,
    overridden: Vec<DotfileEntry>,
}

impl Declaration {
    /// Build a declaration from entries that are already known to be valid.
    #[must_use]
    pub const fn from_entries(entries: Vec<DotfileEntry>) -> Self {
        Self {
            entries,
            overridden: Vec::new(),
        }
    }

    /// Parse YAML text: a mapping of target strings to source strings.
    ///
    /// An empty document is an empty declaration.  A target repeated in the
    /// mapping keeps its last source, at the position of its last occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed YAML or a non-mapping
    /// document and [`ConfigError::InvalidEntry`] for an unusable pair.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Self::parse_from(content, Path::new(DECLARATION_FILE))
    }

    /// Read and parse `<repo_dir>/dfo.yaml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read (including when
    /// it does not exist) and the errors of [`parse`](Self::parse).
    pub fn load(repo_dir: &Path) -> Result<Self, ConfigError> {
        let path = repo_dir.join(DECLARATION_FILE);
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse_from(&content, &path)
    }

    fn parse_from(content: &str, path: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };
        let RawPairs(pairs) = serde_yaml_ng::from_str::<RawPairs>(content)
            .map_err(|e| parse_error(e.to_string()))?;

        let mut declaration = Self::default();
        for (target, source) in &pairs {
            declaration.push_last_wins(entry_from_yaml(target, source)?);
        }
        Ok(declaration)
    }

    fn push_last_wins(&mut self, entry: DotfileEntry) {
        let key = relative_target(entry.target());
        if let Some(pos) = self
            .entries
            .iter()
            .position(|e| relative_target(e.target()) == key)
        {
            self.overridden.push(self.entries.remove(pos));
        }
        self.entries.push(entry);
    }

    /// Entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[DotfileEntry] {
        &self.entries
    }

    /// Pairs dropped by [`parse`](Self::parse) because a later pair named
    /// the same target.
    #[must_use]
    pub fn overridden(&self) -> &[DotfileEntry] {
        &self.overridden
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there is nothing to reconcile.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, DotfileEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Declaration {
    type Item = &'a DotfileEntry;
    type IntoIter = std::slice::Iter<'a, DotfileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Top-level mapping as raw pairs, duplicates included.
struct RawPairs(Vec<(Value, Value)>);

impl<'de> Deserialize<'de> for RawPairs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawPairsVisitor)
    }
}

struct RawPairsVisitor;

impl<'de> Visitor<'de> for RawPairsVisitor {
    type Value = RawPairs;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of target: source")
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<RawPairs, E> {
        Ok(RawPairs(Vec::new()))
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<RawPairs, E> {
        Ok(RawPairs(Vec::new()))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawPairs, A::Error> {
        let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(pair) = map.next_entry::<Value, Value>()? {
            pairs.push(pair);
        }
        Ok(RawPairs(pairs))
    }
}

fn entry_from_yaml(target: &Value, source: &Value) -> Result<DotfileEntry, ConfigError> {
    let Value::String(target) = target else {
        return Err(invalid(&format!("{target:?}"), "target must be a string"));
    };
    let Value::String(source) = source else {
        return Err(invalid(target, "source must be a string"));
    };
    validate(target, source)?;
    Ok(DotfileEntry::new(target, source))
}

fn validate(target: &str, source: &str) -> Result<(), ConfigError> {
    if target.trim().is_empty() {
        return Err(invalid(target, "target is empty"));
    }
    let path = Path::new(target);
    if path.components().any(|c| c == Component::ParentDir) {
        return Err(invalid(target, "target must stay inside the home directory"));
    }
    if relative_target(path)
        .components()
        .all(|c| c == Component::CurDir)
    {
        return Err(invalid(target, "target is the home directory itself"));
    }
    if source.trim().is_empty() {
        return Err(invalid(target, "source is empty"));
    }
    Ok(())
}

fn invalid(target: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidEntry {
        target: target.to_string(),
        reason: reason.to_string(),
    }
}
