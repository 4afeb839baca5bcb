// Core data model for discovered node_modules directories
// One Entry per discovered directory; size carried as an explicit state

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// The reserved directory name this tool operates on
pub const NODE_MODULES: &str = "node_modules";

/// Bin-wrapper directory inside node_modules, never counted as a package
pub const BIN_DIR: &str = ".bin";

/// Size information for an entry
///
/// Modeled as a sum type so consumers must handle the pending and failed
/// states exhaustively instead of probing optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SizeState {
    /// Lazy discovery placeholder, size not yet calculated
    Pending,
    /// Size calculated successfully
    Resolved {
        bytes: u64,
        /// Immediate (depth-1) package directories
        package_count: usize,
        /// Package directories at any depth
        total_package_count: usize,
        /// true when the platform-accelerated path produced the numbers
        /// (block-rounded disk usage, not an exact byte sum)
        accelerated: bool,
    },
    /// Size calculation failed on both paths; treated as zero
    Failed,
}

/// Age buckets derived from the directory's modification time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeCategory {
    Fresh,
    Recent,
    Old,
    Stale,
}

impl AgeCategory {
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d < 7 => AgeCategory::Fresh,
            d if d < 30 => AgeCategory::Recent,
            d if d < 90 => AgeCategory::Old,
            _ => AgeCategory::Stale,
        }
    }
}

/// Size buckets for display and selection heuristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeCategory {
    Small,
    Medium,
    Large,
    Huge,
    /// Sentinel while the size is pending or failed
    Unknown,
}

const MIB: u64 = 1024 * 1024;

impl SizeCategory {
    pub fn from_bytes(bytes: u64) -> Self {
        match bytes {
            b if b < 50 * MIB => SizeCategory::Small,
            b if b < 200 * MIB => SizeCategory::Medium,
            b if b < 500 * MIB => SizeCategory::Large,
            _ => SizeCategory::Huge,
        }
    }
}

/// A discovered node_modules directory and its metadata
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    /// Absolute path to the node_modules directory (unique key within a scan)
    pub path: PathBuf,
    /// Parent directory, expected to contain the project manifest
    pub project_path: PathBuf,
    pub project_name: String,
    pub project_version: Option<String>,
    /// Nearest ancestor with a version-control marker, else project_path
    pub repo_root: PathBuf,
    pub size: SizeState,
    /// Modification time of the node_modules directory itself
    pub last_modified: Option<DateTime<Utc>>,
    /// Deletion target flag, flipped only by selection operations
    pub selected: bool,
    /// Advisory flag from the favorites list; skipped by auto-selection
    pub is_favorite: bool,
}

impl Entry {
    /// Total size in bytes; zero while pending or failed
    pub fn size_bytes(&self) -> u64 {
        match self.size {
            SizeState::Resolved { bytes, .. } => bytes,
            SizeState::Pending | SizeState::Failed => 0,
        }
    }

    pub fn package_count(&self) -> usize {
        match self.size {
            SizeState::Resolved { package_count, .. } => package_count,
            _ => 0,
        }
    }

    pub fn total_package_count(&self) -> usize {
        match self.size {
            SizeState::Resolved {
                total_package_count, ..
            } => total_package_count,
            _ => 0,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.size, SizeState::Pending)
    }

    /// Whole days since the directory was last modified
    pub fn age_days(&self) -> Option<i64> {
        self.last_modified
            .map(|m| (Utc::now() - m).num_days().max(0))
    }

    pub fn age_category(&self) -> Option<AgeCategory> {
        self.age_days().map(AgeCategory::from_days)
    }

    pub fn size_category(&self) -> SizeCategory {
        match self.size {
            SizeState::Resolved { bytes, .. } => SizeCategory::from_bytes(bytes),
            SizeState::Pending | SizeState::Failed => SizeCategory::Unknown,
        }
    }
}

/// Progress information reported during a scan
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScanProgress {
    /// Monotonically non-decreasing 0..=100; the final report is exactly 100
    pub percent: u8,
    /// Entries found so far
    pub entries_found: usize,
}

/// Aggregate result of a scan
#[derive(Debug, Serialize)]
pub struct ScanOutcome {
    pub entries: Vec<Entry>,
    /// Directories visited during discovery
    pub directories_scanned: usize,
    /// Non-fatal errors accumulated along the way, with path context
    pub errors: Vec<String>,
}

/// Per-entry result of a deletion attempt
#[derive(Debug, Clone, Serialize)]
pub struct DeletionOutcome {
    pub path: PathBuf,
    pub project_name: String,
    pub succeeded: bool,
    /// Classified, user-actionable reason when the attempt failed
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Aggregate result of a deletion batch
#[derive(Debug, Serialize)]
pub struct DeletionResult {
    /// Count of selected entries the batch looked at
    pub total_attempted: usize,
    pub successful: usize,
    pub failed: usize,
    /// Bytes reclaimed; in a dry run, bytes that would be reclaimed
    pub bytes_freed: u64,
    pub outcomes: Vec<DeletionOutcome>,
}

/// Progress callback for scans
pub type ScanProgressCallback = Box<dyn Fn(ScanProgress) + Send + Sync>;

/// Progress callback for batch size resolution: (completed, total)
pub type ResolveProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Progress callback for deletion: (current, total, project name)
pub type DeleteProgressCallback = Box<dyn Fn(usize, usize, &str) + Send + Sync>;
