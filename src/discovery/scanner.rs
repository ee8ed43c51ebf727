//! discovery/scanner.rs
//!
//! Recursive source-file listing with a per-run visited set.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

use crate::error::DiscoveryError;

/* ============================================================
   Scanner
   ============================================================ */

pub struct Scanner {
    root: PathBuf,
    extension: String,
    excludes: Vec<Pattern>,
    visited: HashSet<PathBuf>,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
            excludes: Vec::new(),
            visited: HashSet::new(),
        }
    }

    /// Glob patterns matched against paths relative to the root.
    pub fn with_excludes<I, S>(mut self, patterns: I) -> Result<Self, DiscoveryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in patterns {
            let raw = raw.as_ref();
            let pattern = Pattern::new(raw).map_err(|source| DiscoveryError::ExcludePattern {
                pattern: raw.to_string(),
                source,
            })?;
            self.excludes.push(pattern);
        }
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List matching files not yet returned by this scanner.
    ///
    /// Stops after `max_files` new files when a cap is given. Any error
    /// raised by the directory walk aborts the scan.
    pub fn find_files(&mut self, max_files: Option<usize>) -> Result<Vec<PathBuf>, DiscoveryError> {
        let mut out = Vec::new();

        if max_files == Some(0) {
            return Ok(out);
        }

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_ignored(e));

        for entry in walker {
            let entry = entry.map_err(|source| DiscoveryError::Walk {
                root: self.root.clone(),
                source,
            })?;

            // symlinked modules count; `is_file` follows the link
            if !entry.path().is_file() || !self.has_extension(entry.path()) {
                continue;
            }
            if self.is_excluded(entry.path()) {
                tracing::debug!(path = %entry.path().display(), "excluded by pattern");
                continue;
            }

            let path = entry.into_path();
            if !self.visited.insert(path.clone()) {
                continue;
            }

            out.push(path);
            if max_files.is_some_and(|cap| out.len() >= cap) {
                break;
            }
        }

        tracing::debug!(root = %self.root.display(), found = out.len(), "scan finished");
        Ok(out)
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str())
    }

    fn is_excluded(&self, path: &Path) -> bool {
        if self.excludes.is_empty() {
            return false;
        }
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        self.excludes.iter().any(|p| p.matches_path(rel))
    }
}

/* ============================================================
   Helpers
   ============================================================ */

fn is_ignored(e: &DirEntry) -> bool {
    if !e.file_type().is_dir() {
        return false;
    }

    let name = e.file_name().to_string_lossy();

    matches!(
        name.as_ref(),
        ".git"
            | ".venv"
            | "venv"
            | "__pycache__"
            | "node_modules"
            | "target"
            | "build"
            | "dist"
            | ".tox"
            | ".mypy_cache"
            | ".pytest_cache"
    )
}
