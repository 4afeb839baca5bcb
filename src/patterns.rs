//! Candidate classification for discovered node_modules directories.
//!
//! Pure predicate logic: decides whether a directory is a node_modules root
//! worth reporting. Failure is silent exclusion, never an error.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Component, Path, PathBuf};

use crate::entry::NODE_MODULES;
use crate::error::SweepError;

/// Classifier for candidate node_modules paths.
///
/// The reserved-name check is an exact, case-sensitive comparison; the
/// user-supplied exclusion globs are matched case-insensitively with `*`
/// confined to a single path segment and `**` crossing separators.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    root: PathBuf,
    max_depth: Option<usize>,
    glob_set: GlobSet,
    patterns: Vec<String>,
}

impl PathClassifier {
    /// Build a classifier rooted at the scan root.
    ///
    /// Returns an error only for an uncompilable exclusion pattern.
    pub fn new(
        root: &Path,
        max_depth: Option<usize>,
        exclude_patterns: &[String],
    ) -> Result<Self, SweepError> {
        let mut builder = GlobSetBuilder::new();
        let mut patterns = Vec::new();

        for pattern in exclude_patterns {
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(true)
                .literal_separator(true)
                .build()
                .map_err(|e| SweepError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
            builder.add(glob);
            patterns.push(pattern.clone());
        }

        let glob_set = builder.build().map_err(|e| SweepError::InvalidPattern {
            pattern: patterns.join(", "),
            reason: e.to_string(),
        })?;

        Ok(Self {
            root: root.to_path_buf(),
            max_depth,
            glob_set,
            patterns,
        })
    }

    /// Decide whether a candidate directory should be reported.
    ///
    /// All rules must hold:
    /// - final segment is literally `node_modules`
    /// - not nested inside another `node_modules` at any depth
    /// - no hidden segment between the scan root and the candidate
    /// - within the configured depth bound
    /// - not matched by any exclusion glob
    pub fn is_candidate(&self, path: &Path) -> bool {
        if path.file_name().map(|n| n == NODE_MODULES) != Some(true) {
            return false;
        }

        let rel = match path.strip_prefix(&self.root) {
            Ok(rel) => rel,
            // Candidate outside the root: judge on the full path
            Err(_) => path,
        };

        let segments: Vec<&str> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();

        // Nested dependency-internal copies are not independent projects
        if segments.len() > 1 && segments[..segments.len() - 1].contains(&NODE_MODULES) {
            return false;
        }

        if segments.iter().any(|s| s.starts_with('.')) {
            return false;
        }

        if let Some(max) = self.max_depth {
            if segments.len() > max {
                return false;
            }
        }

        !self.is_excluded(path, rel)
    }

    /// Check the exclusion globs against the full path, the path relative
    /// to the scan root, and each individual path component.
    fn is_excluded(&self, path: &Path, rel: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        if self.glob_set.is_match(path) || self.glob_set.is_match(rel) {
            return true;
        }

        for component in path.components() {
            if let Component::Normal(name) = component {
                if self.glob_set.is_match(Path::new(name)) {
                    return true;
                }
            }
        }

        false
    }

    /// Raw pattern strings, for display.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}
