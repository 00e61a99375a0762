// Source file discovery
//
// Walks a project tree and produces the ordered set of analyzable files.
// The walk is depth-first with entries sorted per directory, so the result
// is deterministic for a given tree.

use crate::config::DiscoveryConfig;
use crate::error::{Error, Result};
use glob::Pattern;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Ordered, duplicate-free set of absolute source file paths.
/// Built once by discovery (or from the active file) and consumed once
/// by the analyzer invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFileSet {
    files: Vec<PathBuf>,
}

impl SourceFileSet {
    /// Build the set for a single active file
    pub fn from_single(path: &Path) -> Result<Self> {
        let absolute = path
            .canonicalize()
            .map_err(|e| Error::discovery(path, e.to_string()))?;
        Ok(Self {
            files: vec![absolute],
        })
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.files
    }
}

/// The user's choice of what to analyze
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisScope {
    /// Analyze exactly one file
    ActiveFile(PathBuf),
    /// Analyze every matching file under a project root
    AllFiles(PathBuf),
}

impl AnalysisScope {
    /// Classify a path: a file selects the active-file scope, a directory
    /// the whole-project scope. Anything else is rejected.
    pub fn resolve(path: &Path) -> Result<Self> {
        if path.is_file() {
            Ok(AnalysisScope::ActiveFile(path.to_path_buf()))
        } else if path.is_dir() {
            Ok(AnalysisScope::AllFiles(path.to_path_buf()))
        } else {
            Err(Error::InvalidScope(path.to_path_buf()))
        }
    }

    /// Produce the file set for this scope
    pub fn file_set(&self, config: &DiscoveryConfig) -> Result<SourceFileSet> {
        match self {
            AnalysisScope::ActiveFile(path) => SourceFileSet::from_single(path),
            AnalysisScope::AllFiles(root) => discover(root, config),
        }
    }

    /// Directory that surface-relative navigation paths resolve against
    pub fn base_dir(&self) -> PathBuf {
        match self {
            AnalysisScope::ActiveFile(path) => path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
            AnalysisScope::AllFiles(root) => root.clone(),
        }
    }
}

/// Discover all files with the configured extension under `root`.
///
/// Unreadable entries and non-matching files are skipped silently; an
/// unreadable root is fatal. Symlinks are not followed, which also rules
/// out symlink cycles.
pub fn discover(root: &Path, config: &DiscoveryConfig) -> Result<SourceFileSet> {
    let root = root
        .canonicalize()
        .map_err(|e| Error::discovery(root, e.to_string()))?;

    // A root we cannot list at all is a hard failure, unlike unreadable
    // entries further down.
    std::fs::read_dir(&root).map_err(|e| Error::discovery(&root, e.to_string()))?;

    let excludes: Vec<Pattern> = config
        .exclude
        .iter()
        .map(|p| Pattern::new(p))
        .collect::<std::result::Result<_, _>>()?;

    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for entry in WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !entry.file_type().is_file() {
            continue;
        }

        match path.extension() {
            Some(ext) if ext == config.extension.as_str() => {}
            _ => continue,
        }

        let relative = path.strip_prefix(&root).unwrap_or(path);
        if excludes.iter().any(|p| p.matches_path(relative)) {
            continue;
        }

        if seen.insert(path.to_path_buf()) {
            files.push(path.to_path_buf());
        }
    }

    Ok(SourceFileSet { files })
}
