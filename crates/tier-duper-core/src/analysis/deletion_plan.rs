use futures::future::join_all;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::catalog::{Catalog, RemovalCandidate};
use crate::config::AppConfig;
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub id: String,
    pub path: String,
    pub error: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    pub files_removed: usize,
    pub files_already_absent: usize,
    pub file_failures: Vec<FileFailure>,
    /// Number of ids sent in the bulk delete; zero when it never ran.
    pub catalog_records_deleted: usize,
}

enum FileRemoval {
    Removed,
    AlreadyAbsent,
    Failed(io::Error),
}

/// Removes backing files first, then the catalog records, never interleaved.
///
/// Files are unlinked concurrently. A file that is already gone counts as
/// removed. Other unlink errors are recorded per candidate and do not stop the
/// rest. Once every unlink has finished, all candidate ids go to the catalog in
/// one bulk delete. When it fails, the file-phase report travels with the
/// [`Error::BulkDelete`]; files are not restored.
#[derive(Debug, Clone, Default)]
pub struct SafeDeletionExecutor {
    file_timeout: Option<Duration>,
}

impl SafeDeletionExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new().with_file_timeout(config.file_timeout())
    }

    pub fn with_file_timeout(mut self, timeout: Duration) -> Self {
        self.file_timeout = Some(timeout);
        self
    }

    pub async fn remove<C>(
        &self,
        catalog: &C,
        candidates: &[RemovalCandidate],
    ) -> Result<DeletionReport, Error>
    where
        C: Catalog + ?Sized,
    {
        let mut report = DeletionReport::default();
        if candidates.is_empty() {
            return Ok(report);
        }

        let paths: Vec<&str> = candidates.iter().map(|c| c.original_path.as_str()).collect();
        info!("Preemptively removing files:\n- {}", paths.join("\n- "));

        let removals = candidates
            .iter()
            .map(|candidate| self.remove_file_safe(Path::new(&candidate.original_path)));
        for (candidate, outcome) in candidates.iter().zip(join_all(removals).await) {
            match outcome {
                FileRemoval::Removed => report.files_removed += 1,
                FileRemoval::AlreadyAbsent => report.files_already_absent += 1,
                FileRemoval::Failed(e) => {
                    error!("Failed to remove '{}': {}", candidate.original_path, e);
                    report.file_failures.push(FileFailure {
                        id: candidate.id.clone(),
                        path: candidate.original_path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        debug!(
            "File phase finished: {} removed, {} already absent, {} failed",
            report.files_removed,
            report.files_already_absent,
            report.file_failures.len()
        );

        let ids: Vec<String> = candidates.iter().map(|c| c.id.clone()).collect();
        info!("Deleting (trashing) assets:\n- {}", ids.join("\n- "));
        if let Err(source) = catalog.bulk_delete(&ids).await {
            return Err(Error::BulkDelete { report, source });
        }
        report.catalog_records_deleted = ids.len();

        Ok(report)
    }

    async fn remove_file_safe(&self, path: &Path) -> FileRemoval {
        let result = match self.file_timeout {
            Some(limit) => match tokio::time::timeout(limit, tokio::fs::remove_file(path)).await {
                Ok(result) => result,
                Err(_) => Err(io::Error::new(
                    ErrorKind::TimedOut,
                    format!("unlink timed out after {:?}", limit),
                )),
            },
            None => tokio::fs::remove_file(path).await,
        };

        match result {
            Ok(()) => {
                debug!("Removed {}", path.display());
                FileRemoval::Removed
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("{} is already removed", path.display());
                FileRemoval::AlreadyAbsent
            }
            Err(e) => FileRemoval::Failed(e),
        }
    }
}
