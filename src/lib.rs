// nodesweep library
// Discovers node_modules directories, sizes them, and deletes them safely

pub mod analyze;
pub mod config;
pub mod deleter;
pub mod discover;
pub mod entry;
pub mod error;
pub mod format;
pub mod patterns;
pub mod safety;
pub mod scanner;
pub mod select;
pub mod size;

// Re-export commonly used types for convenience
pub use config::{default_concurrency, DeleteOptions, ScanOptions};
pub use deleter::Deleter;
pub use entry::{
    AgeCategory, DeletionOutcome, DeletionResult, Entry, ScanOutcome, ScanProgress, SizeCategory,
    SizeState,
};
pub use error::SweepError;
pub use patterns::PathClassifier;
pub use scanner::Scanner;
pub use select::{invert_selection, select_all, select_by_age, select_by_size, toggle_one};
pub use size::{DiskUsageEstimator, SizeEstimator, SizeReport};
