// Command-line interface definition

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "nodesweep",
    version,
    about = "Find and safely delete node_modules directories to reclaim disk space"
)]
pub struct Cli {
    /// Root directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Maximum scan depth below the root, in path segments
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Exclusion glob, repeatable. Case-insensitive; '*' stays inside a
    /// path segment, '**' crosses separators
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Traverse into symbolic links during discovery
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Auto-select entries at or above this size (e.g. 500mb, 1.5gb)
    #[arg(long, value_name = "SIZE")]
    pub min_size: Option<String>,

    /// Auto-select entries not modified for at least this many days
    #[arg(long, value_name = "DAYS")]
    pub older_than: Option<i64>,

    /// Select every entry
    #[arg(long)]
    pub all: bool,

    /// Delete the selected entries
    #[arg(long)]
    pub delete: bool,

    /// Report what would be deleted without removing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Escalate to the make-writable removal strategy when deletion fails
    #[arg(long)]
    pub force: bool,

    /// Skip entries whose project shows lockfile activity in the last minute
    #[arg(long)]
    pub check_running: bool,

    /// Machine-readable JSON output
    #[arg(long)]
    pub json: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Ignore-pattern file, one glob per line ('#' comments skipped).
    /// Defaults to the platform config directory
    #[arg(long, value_name = "FILE")]
    pub ignore_file: Option<PathBuf>,

    /// Favorites file, one project path per line.
    /// Defaults to the platform config directory
    #[arg(long, value_name = "FILE")]
    pub favorites_file: Option<PathBuf>,

    /// Concurrent size calculations and deletions
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,
}
