// Deletion engine
// Every target passes the safety gate, then an escalating list of
// removal strategies runs until one succeeds

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use crate::config::DeleteOptions;
use crate::entry::{DeleteProgressCallback, DeletionOutcome, DeletionResult, Entry};
use crate::safety;

/// Removal strategy: one attempt at destroying a tree
type RemovalStrategy = fn(&Path) -> io::Result<()>;

/// Engine that deletes the selected entries of a collection
pub struct Deleter;

impl Deleter {
    pub fn new() -> Self {
        Self
    }

    /// Delete every entry with `selected == true`, in iteration order.
    ///
    /// Each entry is verified, then removed (or merely counted, in a dry
    /// run). A failure on one entry never aborts the batch. Progress is
    /// reported as `(current, total, project name)` before each attempt.
    pub async fn delete_selected(
        &self,
        entries: &[Entry],
        options: &DeleteOptions,
        progress: Option<&DeleteProgressCallback>,
    ) -> DeletionResult {
        let selected: Vec<&Entry> = entries.iter().filter(|e| e.selected).collect();
        let total = selected.len();

        let mut outcomes = Vec::with_capacity(total);
        let mut successful = 0usize;
        let mut failed = 0usize;
        let mut bytes_freed = 0u64;

        for (index, entry) in selected.iter().enumerate() {
            if let Some(cb) = progress {
                cb(index + 1, total, &entry.project_name);
            }

            let start = Instant::now();

            if let Err(reason) = safety::verify(&entry.path, options.check_running_processes) {
                failed += 1;
                outcomes.push(DeletionOutcome {
                    path: entry.path.clone(),
                    project_name: entry.project_name.clone(),
                    succeeded: false,
                    error: Some(reason),
                    duration_ms: start.elapsed().as_millis() as u64,
                });
                continue;
            }

            if options.dry_run {
                successful += 1;
                bytes_freed += entry.size_bytes();
                outcomes.push(DeletionOutcome {
                    path: entry.path.clone(),
                    project_name: entry.project_name.clone(),
                    succeeded: true,
                    error: None,
                    duration_ms: start.elapsed().as_millis() as u64,
                });
                continue;
            }

            let target = entry.path.clone();
            let force = options.force;
            let removal = tokio::task::spawn_blocking(move || remove_tree(&target, force)).await;

            let error = match removal {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(classify_removal_error(&e, &entry.path)),
                Err(e) => Some(format!("deletion task failed: {}", e)),
            };

            match error {
                None => {
                    successful += 1;
                    bytes_freed += entry.size_bytes();
                    outcomes.push(DeletionOutcome {
                        path: entry.path.clone(),
                        project_name: entry.project_name.clone(),
                        succeeded: true,
                        error: None,
                        duration_ms: start.elapsed().as_millis() as u64,
                    });
                }
                Some(reason) => {
                    failed += 1;
                    outcomes.push(DeletionOutcome {
                        path: entry.path.clone(),
                        project_name: entry.project_name.clone(),
                        succeeded: false,
                        error: Some(reason),
                        duration_ms: start.elapsed().as_millis() as u64,
                    });
                }
            }
        }

        DeletionResult {
            total_attempted: total,
            successful,
            failed,
            bytes_freed,
            outcomes,
        }
    }
}

impl Default for Deleter {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered removal strategies; the make-writable escalation only joins
/// the chain when force is requested
fn removal_strategies(force: bool) -> Vec<RemovalStrategy> {
    let mut strategies: Vec<RemovalStrategy> = vec![remove_direct];
    if force {
        strategies.push(remove_after_make_writable);
    }
    strategies.push(remove_with_platform_command);
    strategies.push(remove_via_rename);
    strategies
}

/// Remove a directory tree, escalating through the strategy chain.
/// The last strategy's error is returned when all of them fail.
pub fn remove_tree(path: &Path, force: bool) -> io::Result<()> {
    let mut last_error = None;
    for strategy in removal_strategies(force) {
        match strategy(path) {
            Ok(()) => return Ok(()),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "no removal strategy available")))
}

fn remove_direct(path: &Path) -> io::Result<()> {
    fs::remove_dir_all(path)
}

/// Mark every node in the tree writable, then retry direct removal.
/// Handles read-only files dropped by package postinstall scripts.
fn remove_after_make_writable(path: &Path) -> io::Result<()> {
    let mut stack: Vec<PathBuf> = vec![path.to_path_buf()];
    while let Some(current) = stack.pop() {
        let meta = match fs::symlink_metadata(&current) {
            Ok(meta) => meta,
            Err(_) => continue,
        };
        if meta.file_type().is_symlink() {
            continue;
        }

        let mut perms = meta.permissions();
        if perms.readonly() {
            perms.set_readonly(false);
            let _ = fs::set_permissions(&current, perms);
        }

        if meta.is_dir() {
            if let Ok(entries) = fs::read_dir(&current) {
                for entry in entries.flatten() {
                    stack.push(entry.path());
                }
            }
        }
    }
    fs::remove_dir_all(path)
}

/// Platform bulk removal; copes with pathological cases (very long
/// paths, contended handles) better than the library call
fn remove_with_platform_command(path: &Path) -> io::Result<()> {
    let status = if cfg!(windows) {
        Command::new("cmd")
            .args(["/C", "rmdir", "/S", "/Q"])
            .arg(path)
            .status()?
    } else {
        Command::new("rm").arg("-rf").arg("--").arg(path).status()?
    };

    if status.success() && !path.exists() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::Other,
            format!("removal command exited with {}", status),
        ))
    }
}

/// Last resort: rename the target to a temporary sibling, then remove
/// the renamed directory. Removal of the renamed tree may proceed even
/// while the original name is contended; if it still fails, the renamed
/// directory stays behind for later cleanup and the original path is
/// considered freed.
fn remove_via_rename(path: &Path) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "target has no parent directory")
    })?;
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "target has no file name")
    })?;

    let renamed = parent.join(format!(
        ".{}.sweep-{}",
        name.to_string_lossy(),
        std::process::id()
    ));
    fs::rename(path, &renamed)?;
    let _ = fs::remove_dir_all(&renamed);
    Ok(())
}

/// Map a removal failure to an actionable message. Classification is for
/// user messaging only, never control flow.
pub fn classify_removal_error(err: &io::Error, path: &Path) -> String {
    let raw = err.to_string();
    let lowered = raw.to_lowercase();

    if err.kind() == io::ErrorKind::PermissionDenied || lowered.contains("permission denied") {
        return format!(
            "permission denied deleting {}; try again with elevated privileges",
            path.display()
        );
    }
    if lowered.contains("busy") || lowered.contains("being used") || lowered.contains("in use") {
        return format!(
            "{} is in use; close programs using these files and retry",
            path.display()
        );
    }
    if lowered.contains("not empty") {
        return format!(
            "{} was not empty after deletion; retry with the force option",
            path.display()
        );
    }
    format!("failed to delete {}: {}", path.display(), raw)
}
