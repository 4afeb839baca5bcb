// Filesystem discovery of candidate node_modules directories
// Single breadth-first sweep, decoupled from per-candidate size analysis

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::config::ScanOptions;
use crate::entry::NODE_MODULES;
use crate::error::SweepError;
use crate::patterns::PathClassifier;

/// A discovered node_modules location and its owning project directory
#[derive(Debug, Clone)]
pub struct Candidate {
    pub node_modules_path: PathBuf,
    pub project_path: PathBuf,
}

/// Raw output of the discovery sweep
#[derive(Debug)]
pub struct Discovery {
    pub candidates: Vec<Candidate>,
    pub directories_scanned: usize,
    /// Per-directory listing failures, accumulated not thrown
    pub errors: Vec<String>,
}

/// Walk the tree below the scan root and collect candidate node_modules
/// directories.
///
/// Breadth-first with a seen-set to guard against filesystem cycles.
/// Hidden directories and node_modules internals are never descended
/// into; symlinks are only traversed when `follow_symlinks` is set.
///
/// A missing root is the one fatal error; everything else is accumulated
/// into the returned error list.
pub fn discover(options: &ScanOptions) -> Result<Discovery, SweepError> {
    let meta = fs::metadata(&options.root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SweepError::RootNotFound {
            path: options.root.clone(),
        },
        _ => SweepError::from_io_error(e, "reading scan root", Some(options.root.clone())),
    })?;
    if !meta.is_dir() {
        return Err(SweepError::RootNotFound {
            path: options.root.clone(),
        });
    }

    // Canonicalize once so depth and nesting checks see a stable prefix
    let root = fs::canonicalize(&options.root).unwrap_or_else(|_| options.root.clone());

    let classifier = PathClassifier::new(&root, options.max_depth, &options.exclude_patterns)?;

    let mut candidates = Vec::new();
    let mut errors = Vec::new();
    let mut directories_scanned = 0usize;

    let mut queue: VecDeque<PathBuf> = VecDeque::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    queue.push_back(root.clone());
    seen.insert(root.clone());

    while let Some(dir) = queue.pop_front() {
        directories_scanned += 1;

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                errors.push(format!("Error scanning {}: {}", dir.display(), e));
                continue;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    errors.push(format!("Error scanning {}: {}", dir.display(), e));
                    continue;
                }
            };

            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    errors.push(format!(
                        "Error scanning {}: {}",
                        entry.path().display(),
                        e
                    ));
                    continue;
                }
            };

            let path = entry.path();

            if file_type.is_symlink() {
                if !options.follow_symlinks {
                    continue;
                }
                // Traverse only symlinks that resolve to directories
                match fs::metadata(&path) {
                    Ok(m) if m.is_dir() => {}
                    _ => continue,
                }
            } else if !file_type.is_dir() {
                continue;
            }

            let name = entry.file_name();
            let name = name.to_string_lossy();

            if name == NODE_MODULES {
                // One-level containment check; dependency internals are
                // never descended into
                if classifier.is_candidate(&path) {
                    candidates.push(Candidate {
                        node_modules_path: path,
                        project_path: dir.clone(),
                    });
                }
                continue;
            }

            if name.starts_with('.') {
                continue;
            }

            if let Some(max) = options.max_depth {
                let depth = path
                    .strip_prefix(&root)
                    .map(|rel| rel.components().count())
                    .unwrap_or(0);
                // A directory at the depth bound cannot contain an
                // admissible candidate, stop descending
                if depth >= max {
                    continue;
                }
            }

            let key = if options.follow_symlinks {
                fs::canonicalize(&path).unwrap_or_else(|_| path.clone())
            } else {
                path.clone()
            };
            if seen.insert(key) {
                queue.push_back(path);
            }
        }
    }

    Ok(Discovery {
        candidates,
        directories_scanned,
        errors,
    })
}
