//! Scan and deletion configuration.
//!
//! All inputs are explicit: the ignore and favorites files are resolved to
//! absolute paths by the caller (the CLI uses the platform config directory)
//! and passed in here, never read from ambient process state.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Options controlling a scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Root directory to scan.
    pub root: PathBuf,
    /// Maximum depth below the root, in path segments. None = unbounded.
    pub max_depth: Option<usize>,
    /// User-supplied exclusion globs (case-insensitive).
    pub exclude_patterns: Vec<String>,
    /// Whether discovery may traverse into symbolic links.
    pub follow_symlinks: bool,
    /// Project paths whose entries are marked as favorites.
    pub favorites: HashSet<PathBuf>,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: None,
            exclude_patterns: Vec::new(),
            follow_symlinks: false,
            favorites: HashSet::new(),
        }
    }
}

/// Options controlling a deletion batch.
#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    /// Report what would be deleted without touching the filesystem.
    pub dry_run: bool,
    /// Skip the interactive confirmation (CLI concern, carried here so the
    /// whole boundary contract lives in one struct).
    pub yes: bool,
    /// Escalate to the make-writable removal strategy on failure.
    pub force: bool,
    /// Fail entries whose project shows lockfile activity in the last 60s.
    pub check_running_processes: bool,
    /// Render per-entry progress (CLI concern).
    pub show_progress: bool,
}

/// Read a plain-text pattern file: one pattern per line, `#` comments and
/// blank lines skipped. A missing or unreadable file yields an empty list.
pub fn load_patterns(path: &Path) -> Vec<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Vec::new(),
    };
    parse_pattern_lines(&content)
}

/// Read a favorites file: one project path per line, same comment rules.
/// Entries are canonicalized best-effort so they match scan results, which
/// always carry canonical paths; lines that fail to resolve are kept as-is.
pub fn load_favorites(path: &Path) -> HashSet<PathBuf> {
    load_patterns(path)
        .into_iter()
        .map(|line| {
            let raw = PathBuf::from(line);
            fs::canonicalize(&raw).unwrap_or(raw)
        })
        .collect()
}

fn parse_pattern_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Default location of a nodesweep config file, under the platform config
/// directory. None when the platform has no config directory.
pub fn default_config_file(name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nodesweep").join(name))
}

/// Per-entry concurrency bound for size analysis and deletion.
///
/// Filesystem syscalls are cheap relative to process spawns on Unix, so the
/// ceiling is higher there.
pub fn default_concurrency() -> usize {
    let ceiling = if cfg!(windows) { 4 } else { 8 };
    num_cpus::get().clamp(3, ceiling)
}
