// Centralized error handling module
// Provides context-rich error types for scan and deletion operations

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for nodesweep
/// Carries the path and operation context alongside the underlying cause
#[derive(Debug)]
pub enum SweepError {
    /// The scan root does not exist or is not a directory
    RootNotFound { path: PathBuf },
    /// A directory vanished between discovery and analysis
    DirectoryNotFound { path: PathBuf },
    PermissionDenied { path: PathBuf, operation: String },
    IoError { path: Option<PathBuf>, operation: String, source: io::Error },

    /// A user-supplied exclusion glob could not be compiled
    InvalidPattern { pattern: String, reason: String },
    /// Size estimation failed on both the accelerated and fallback paths
    EstimateFailed { path: PathBuf, reason: String },
    /// Human-entered size string could not be parsed
    InvalidSize { input: String },
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SweepError::RootNotFound { path } => {
                write!(f, "Scan root not found: {}\n", path.display())?;
                write!(f, "Suggestion: Check that the path is correct and points to a directory")
            }
            SweepError::DirectoryNotFound { path } => {
                write!(f, "Directory not found: {}\n", path.display())?;
                write!(f, "Suggestion: The directory may have been removed while the scan was running")
            }
            SweepError::PermissionDenied { path, operation } => {
                write!(f, "Permission denied while {} {}\n", operation, path.display())?;
                write!(f, "Suggestion: Check directory permissions or run with appropriate privileges")
            }
            SweepError::IoError { path, operation, source } => {
                if let Some(p) = path {
                    write!(f, "I/O error while {} {}: {}\n", operation, p.display(), source)?;
                } else {
                    write!(f, "I/O error while {}: {}\n", operation, source)?;
                }
                write!(f, "Suggestion: Check permissions and that the path still exists")
            }
            SweepError::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid exclusion pattern '{}': {}\n", pattern, reason)?;
                write!(f, "Suggestion: Patterns use *, ** and ? wildcards, e.g. '**/cache/**'")
            }
            SweepError::EstimateFailed { path, reason } => {
                write!(f, "Failed to calculate size of {}: {}\n", path.display(), reason)?;
                write!(f, "Suggestion: Check that the directory is readable")
            }
            SweepError::InvalidSize { input } => {
                write!(f, "Not a valid size: '{}'\n", input)?;
                write!(f, "Suggestion: Use a number with an optional unit, e.g. '500mb' or '1.5gb'")
            }
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SweepError::IoError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl SweepError {
    /// Create an error from an io::Error with context about the operation and path
    pub fn from_io_error(err: io::Error, operation: &str, path: Option<PathBuf>) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => {
                if let Some(p) = path {
                    SweepError::DirectoryNotFound { path: p }
                } else {
                    SweepError::IoError {
                        path: None,
                        operation: operation.to_string(),
                        source: err,
                    }
                }
            }
            io::ErrorKind::PermissionDenied => {
                if let Some(p) = path {
                    SweepError::PermissionDenied {
                        path: p,
                        operation: operation.to_string(),
                    }
                } else {
                    SweepError::IoError {
                        path: None,
                        operation: operation.to_string(),
                        source: err,
                    }
                }
            }
            _ => SweepError::IoError {
                path,
                operation: operation.to_string(),
                source: err,
            },
        }
    }
}

impl From<io::Error> for SweepError {
    fn from(err: io::Error) -> Self {
        SweepError::from_io_error(err, "unknown operation", None)
    }
}
