// Scan orchestration
// Discovery runs first as a single sweep; per-entry analysis then fans
// out under a bounded concurrency limiter

use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::analyze;
use crate::config::{default_concurrency, ScanOptions};
use crate::discover;
use crate::entry::{
    Entry, ResolveProgressCallback, ScanOutcome, ScanProgress, ScanProgressCallback,
};
use crate::error::SweepError;
use crate::size::{DiskUsageEstimator, SizeEstimator};

/// Orchestrates discovery and analysis into a ScanOutcome
pub struct Scanner {
    estimator: Arc<dyn SizeEstimator>,
    concurrency: usize,
}

impl Scanner {
    /// Scanner with the production estimator and platform concurrency bound
    pub fn new() -> Self {
        Self {
            estimator: Arc::new(DiskUsageEstimator::new()),
            concurrency: default_concurrency(),
        }
    }

    /// Use a custom size estimator
    pub fn with_estimator(estimator: Arc<dyn SizeEstimator>) -> Self {
        Self {
            estimator,
            concurrency: default_concurrency(),
        }
    }

    /// Override the per-entry concurrency bound (clamped to at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Run a full scan below the configured root.
    ///
    /// Progress percent is monotonically non-decreasing and the final
    /// report is exactly 100. Per-entry analysis errors are accumulated
    /// with path context, never aborting sibling work. The only fatal
    /// error is an unusable scan root.
    pub async fn scan(
        &self,
        options: &ScanOptions,
        progress: Option<&ScanProgressCallback>,
        lazy: bool,
    ) -> Result<ScanOutcome, SweepError> {
        let discover_options = options.clone();
        let discovery = tokio::task::spawn_blocking(move || discover::discover(&discover_options))
            .await
            .map_err(|e| SweepError::IoError {
                path: None,
                operation: "running discovery".to_string(),
                source: io::Error::new(io::ErrorKind::Other, e.to_string()),
            })??;

        let total = discovery.candidates.len();
        let mut errors = discovery.errors;
        let mut entries: Vec<Entry> = Vec::with_capacity(total);

        if let Some(cb) = progress {
            cb(ScanProgress {
                percent: 0,
                entries_found: 0,
            });
        }

        let estimator = Arc::clone(&self.estimator);
        let favorites = Arc::new(options.favorites.clone());

        let mut analyses = stream::iter(discovery.candidates.into_iter().map(|candidate| {
            let estimator = Arc::clone(&estimator);
            let favorites = Arc::clone(&favorites);
            async move {
                let result = analyze::analyze(
                    &candidate.node_modules_path,
                    &candidate.project_path,
                    lazy,
                    estimator.as_ref(),
                    &favorites,
                )
                .await;
                (candidate.node_modules_path, result)
            }
        }))
        .buffer_unordered(self.concurrency);

        let mut completed = 0usize;
        while let Some((path, result)) = analyses.next().await {
            completed += 1;
            match result {
                Ok(entry) => entries.push(entry),
                Err(e) => errors.push(format!("Error analyzing {}: {}", path.display(), e)),
            }
            if let Some(cb) = progress {
                cb(ScanProgress {
                    percent: ((completed * 100) / total) as u8,
                    entries_found: entries.len(),
                });
            }
        }

        if total == 0 {
            if let Some(cb) = progress {
                cb(ScanProgress {
                    percent: 100,
                    entries_found: 0,
                });
            }
        }

        Ok(ScanOutcome {
            entries,
            directories_scanned: discovery.directories_scanned,
            errors,
        })
    }

    /// Resolve every Pending entry in a lazily scanned collection under
    /// the same concurrency bound.
    ///
    /// Results merge back by path; entries absent from the update batch
    /// are left untouched. Progress reports `(completed, total)`.
    pub async fn resolve_pending_sizes(
        &self,
        entries: Vec<Entry>,
        progress: Option<&ResolveProgressCallback>,
    ) -> Vec<Entry> {
        let pending: Vec<Entry> = entries.iter().filter(|e| e.is_pending()).cloned().collect();
        let total = pending.len();
        if total == 0 {
            return entries;
        }

        let estimator = Arc::clone(&self.estimator);
        let mut resolutions = stream::iter(pending.into_iter().map(|entry| {
            let estimator = Arc::clone(&estimator);
            async move { analyze::resolve_pending(&entry, estimator.as_ref()).await }
        }))
        .buffer_unordered(self.concurrency);

        let mut resolved: HashMap<PathBuf, Entry> = HashMap::new();
        let mut completed = 0usize;
        while let Some(entry) = resolutions.next().await {
            completed += 1;
            resolved.insert(entry.path.clone(), entry);
            if let Some(cb) = progress {
                cb(completed, total);
            }
        }

        // Defensive merge: only paths the batch actually updated change
        entries
            .into_iter()
            .map(|entry| {
                let key = entry.path.clone();
                resolved.remove(&key).unwrap_or(entry)
            })
            .collect()
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}
