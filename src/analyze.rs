// Turns a discovered candidate into a structured Entry
// Cheap metadata is gathered eagerly; size calculation is eager or lazy

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::entry::{Entry, SizeState};
use crate::error::SweepError;
use crate::size::SizeEstimator;

/// Conventional project manifest file name
pub const MANIFEST_FILE: &str = "package.json";

/// Version-control marker directories recognized for repo-root resolution
const REPO_MARKERS: &[&str] = &[".git", ".hg", ".svn"];

/// Name and version read from a project manifest
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectManifest {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Read the project manifest, if any. Absence or a malformed file is a
/// normal outcome, never an error.
pub fn read_manifest(project_path: &Path) -> Option<ProjectManifest> {
    let content = fs::read_to_string(project_path.join(MANIFEST_FILE)).ok()?;
    serde_json::from_str(&content).ok()
}

/// Walk ancestors upward until a version-control marker is found.
/// Falls back to the project path itself.
pub fn find_repo_root(project_path: &Path) -> PathBuf {
    for ancestor in project_path.ancestors() {
        for marker in REPO_MARKERS {
            if ancestor.join(marker).is_dir() {
                return ancestor.to_path_buf();
            }
        }
    }
    project_path.to_path_buf()
}

fn modified_time(meta: &fs::Metadata) -> Option<DateTime<Utc>> {
    meta.modified().ok().and_then(|t| {
        DateTime::from_timestamp(
            t.duration_since(std::time::UNIX_EPOCH).ok()?.as_secs() as i64,
            0,
        )
    })
}

/// Derive the project name when no manifest is usable
fn fallback_name(project_path: &Path) -> String {
    project_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| project_path.display().to_string())
}

/// Build an Entry for a discovered candidate.
///
/// With `lazy` set the entry comes back in the Pending size state and only
/// cheap metadata is read; otherwise the estimator runs synchronously.
/// An estimator failure is absorbed into the Failed size sentinel; an
/// unknown size is preferable to losing an otherwise-valid entry. The one
/// error here is the candidate directory itself vanishing before its stat.
pub async fn analyze(
    node_modules_path: &Path,
    project_path: &Path,
    lazy: bool,
    estimator: &dyn SizeEstimator,
    favorites: &HashSet<PathBuf>,
) -> Result<Entry, SweepError> {
    // Stat and manifest reads block; keep them off the async executor
    let nm = node_modules_path.to_path_buf();
    let project = project_path.to_path_buf();
    let (last_modified, manifest, repo_root) = tokio::task::spawn_blocking(move || {
        let meta = fs::metadata(&nm)
            .map_err(|e| SweepError::from_io_error(e, "reading metadata of", Some(nm.clone())))?;
        Ok::<_, SweepError>((
            modified_time(&meta),
            read_manifest(&project),
            find_repo_root(&project),
        ))
    })
    .await
    .map_err(|e| SweepError::IoError {
        path: Some(node_modules_path.to_path_buf()),
        operation: "reading metadata of".to_string(),
        source: io::Error::new(io::ErrorKind::Other, e.to_string()),
    })??;

    let project_name = manifest
        .as_ref()
        .and_then(|m| m.name.clone())
        .unwrap_or_else(|| fallback_name(project_path));
    let project_version = manifest.and_then(|m| m.version);

    let size = if lazy {
        SizeState::Pending
    } else {
        match estimator.estimate(node_modules_path).await {
            Ok(report) => SizeState::Resolved {
                bytes: report.bytes,
                package_count: report.package_count,
                total_package_count: report.total_package_count,
                accelerated: report.accelerated,
            },
            Err(_) => SizeState::Failed,
        }
    };

    Ok(Entry {
        path: node_modules_path.to_path_buf(),
        project_path: project_path.to_path_buf(),
        project_name,
        project_version,
        repo_root,
        size,
        last_modified,
        selected: false,
        is_favorite: favorites.contains(project_path),
    })
}

/// Re-run size estimation for a Pending entry and return the updated copy.
///
/// A non-pending entry comes back unchanged. On estimator failure the size
/// becomes the Failed sentinel rather than propagating, so batch progress
/// still completes.
pub async fn resolve_pending(entry: &Entry, estimator: &dyn SizeEstimator) -> Entry {
    if !entry.is_pending() {
        return entry.clone();
    }

    let size = match estimator.estimate(&entry.path).await {
        Ok(report) => SizeState::Resolved {
            bytes: report.bytes,
            package_count: report.package_count,
            total_package_count: report.total_package_count,
            accelerated: report.accelerated,
        },
        Err(_) => SizeState::Failed,
    };

    Entry {
        size,
        ..entry.clone()
    }
}
