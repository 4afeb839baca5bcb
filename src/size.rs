// Size estimation for a node_modules tree
// Accelerated platform path with a portable exact-walk fallback

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::entry::BIN_DIR;
use crate::error::SweepError;

/// Per-directory overhead added by the fallback walk, a proxy for the
/// filesystem allocation block each directory node occupies
pub const DIR_OVERHEAD_BYTES: u64 = 4096;

/// Ceiling on accelerated-path subprocess runtime before falling back
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of sizing one directory tree
///
/// `bytes` is the best available estimate: block-rounded disk usage when
/// `accelerated` is true, an exact file-byte sum plus per-directory
/// overhead otherwise. The two methods can disagree on the same tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeReport {
    pub bytes: u64,
    /// Immediate (depth-1) package directories, dotfiles and .bin excluded
    pub package_count: usize,
    /// Package directories at any depth, same exclusions
    pub total_package_count: usize,
    pub accelerated: bool,
}

/// Task-submission interface for size calculation
///
/// One call sizes one tree as a single unit of work; callers fan out
/// across entries under their own concurrency bound.
#[async_trait]
pub trait SizeEstimator: Send + Sync {
    async fn estimate(&self, path: &Path) -> Result<SizeReport, SweepError>;
}

/// Production estimator: platform `du`/`find` first, portable walk second
pub struct DiskUsageEstimator {
    command_timeout: Duration,
}

impl DiskUsageEstimator {
    pub fn new() -> Self {
        Self {
            command_timeout: COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Try the accelerated path. Any failure (missing utility, non-zero
    /// exit, unparseable output, timeout) yields None and the caller
    /// falls back to the portable walk.
    async fn accelerated(&self, path: &Path) -> Option<SizeReport> {
        #[cfg(unix)]
        {
            let bytes = self.disk_usage_bytes(path).await?;
            let (package_count, total_package_count) = self.directory_counts(path).await?;
            Some(SizeReport {
                bytes,
                package_count,
                total_package_count,
                accelerated: true,
            })
        }
        #[cfg(not(unix))]
        {
            let _ = path;
            None
        }
    }

    /// Aggregate disk usage via `du -sk` (KiB blocks)
    #[cfg(unix)]
    async fn disk_usage_bytes(&self, path: &Path) -> Option<u64> {
        let output = tokio::time::timeout(
            self.command_timeout,
            tokio::process::Command::new("du")
                .arg("-sk")
                .arg(path)
                .output(),
        )
        .await
        .ok()?
        .ok()?;

        if !output.status.success() {
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let kib: u64 = stdout.split_whitespace().next()?.parse().ok()?;
        Some(kib * 1024)
    }

    /// Subdirectory counts via `find -type d`
    ///
    /// `find` exits non-zero on unreadable subtrees while still printing
    /// what it could list, so the output is accepted whenever non-empty.
    #[cfg(unix)]
    async fn directory_counts(&self, path: &Path) -> Option<(usize, usize)> {
        let output = tokio::time::timeout(
            self.command_timeout,
            tokio::process::Command::new("find")
                .arg(path)
                .arg("-type")
                .arg("d")
                .output(),
        )
        .await
        .ok()?
        .ok()?;

        if output.stdout.is_empty() {
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut package_count = 0;
        let mut total_package_count = 0;

        for line in stdout.lines() {
            let rel = match Path::new(line).strip_prefix(path) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            let segments: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            let name = match segments.last() {
                Some(name) => name,
                None => continue, // the root itself
            };
            if name.starts_with('.') || name == BIN_DIR {
                continue;
            }
            total_package_count += 1;
            if segments.len() == 1 {
                package_count += 1;
            }
        }

        Some((package_count, total_package_count))
    }
}

impl Default for DiskUsageEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SizeEstimator for DiskUsageEstimator {
    async fn estimate(&self, path: &Path) -> Result<SizeReport, SweepError> {
        if let Some(report) = self.accelerated(path).await {
            return Ok(report);
        }

        let target = path.to_path_buf();
        let task_path = target.clone();
        tokio::task::spawn_blocking(move || walk_size(&task_path))
            .await
            .map_err(|e| SweepError::EstimateFailed {
                path: target,
                reason: format!("size calculation task failed: {}", e),
            })?
    }
}

/// Portable fallback: iterative traversal with an explicit stack.
///
/// Accumulates exact file sizes plus DIR_OVERHEAD_BYTES per directory
/// node. Symbolic links are never followed. Unreadable subtrees are
/// skipped (undercount, not a failure).
pub fn walk_size(root: &Path) -> Result<SizeReport, SweepError> {
    let meta = fs::symlink_metadata(root)
        .map_err(|e| SweepError::from_io_error(e, "sizing directory", Some(root.to_path_buf())))?;
    if !meta.is_dir() {
        return Err(SweepError::EstimateFailed {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let mut bytes = DIR_OVERHEAD_BYTES;
    let mut package_count = 0;
    let mut total_package_count = 0;
    let mut stack: Vec<(PathBuf, usize)> = vec![(root.to_path_buf(), 0)];

    while let Some((dir, depth)) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            // Permission denied on a subtree: skip it
            Err(_) => continue,
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(_) => continue,
            };
            // DirEntry::metadata does not traverse symlinks
            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(_) => continue,
            };
            let file_type = meta.file_type();

            if file_type.is_symlink() {
                continue;
            }

            if file_type.is_dir() {
                bytes += DIR_OVERHEAD_BYTES;
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if !name.starts_with('.') && name != BIN_DIR {
                    total_package_count += 1;
                    if depth == 0 {
                        package_count += 1;
                    }
                }
                stack.push((entry.path(), depth + 1));
            } else if file_type.is_file() {
                bytes += meta.len();
            }
        }
    }

    Ok(SizeReport {
        bytes,
        package_count,
        total_package_count,
        accelerated: false,
    })
}
