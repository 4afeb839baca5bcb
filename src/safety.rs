// Safety checks gating every deletion
// Sequential, short-circuiting, read-only: verification never mutates

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::analyze::MANIFEST_FILE;
use crate::entry::NODE_MODULES;

/// Lockfiles whose recent modification signals an in-progress install.
/// Checked in the project directory, sibling to node_modules.
pub const LOCKFILES: &[&str] = &[".package-lock.json", "yarn.lock", "pnpm-lock.yaml"];

/// Lockfile activity within this window fails the liveness check
const LOCKFILE_ACTIVITY_WINDOW: Duration = Duration::from_secs(60);

/// Verify that a directory is safe to delete.
///
/// Checks, in order, short-circuiting on the first failure:
/// 1. the path literally ends in the `node_modules` segment
/// 2. the directory currently exists on disk
/// 3. optionally, no recognized lockfile in the project directory was
///    modified in the last 60 seconds (best-effort liveness heuristic)
/// 4. structural plausibility: at least one subdirectory, or a project
///    manifest next door
///
/// The error value is a human-readable reason for the refusal.
pub fn verify(path: &Path, check_running_processes: bool) -> Result<(), String> {
    if path.file_name().map(|n| n == NODE_MODULES) != Some(true) {
        return Err(format!(
            "path does not end in a {} segment: {}",
            NODE_MODULES,
            path.display()
        ));
    }

    if !path.is_dir() {
        return Err(format!("directory does not exist: {}", path.display()));
    }

    if check_running_processes {
        if let Some(project) = path.parent() {
            for lockfile in LOCKFILES {
                let lock_path = project.join(lockfile);
                let recent = fs::metadata(&lock_path)
                    .and_then(|m| m.modified())
                    .ok()
                    .and_then(|t| t.elapsed().ok())
                    .map(|age| age < LOCKFILE_ACTIVITY_WINDOW)
                    .unwrap_or(false);
                if recent {
                    return Err(format!(
                        "{} was modified in the last minute; an install may be running in {}",
                        lockfile,
                        project.display()
                    ));
                }
            }
        }
    }

    if !is_plausible(path) {
        return Err(format!(
            "{} has no package subdirectories and no sibling {}; refusing to delete",
            path.display(),
            MANIFEST_FILE
        ));
    }

    Ok(())
}

/// Either condition alone is sufficient: the tree holds at least one
/// subdirectory, or the parent directory carries a project manifest.
fn is_plausible(path: &Path) -> bool {
    let has_subdirectory = fs::read_dir(path)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .any(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        })
        .unwrap_or(false);
    if has_subdirectory {
        return true;
    }

    path.parent()
        .map(|project| project.join(MANIFEST_FILE).is_file())
        .unwrap_or(false)
}
