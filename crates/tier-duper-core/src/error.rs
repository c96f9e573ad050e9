use std::path::PathBuf;
use thiserror::Error;

use crate::analysis::DeletionReport;
use crate::catalog::CatalogError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The file phase ran; its report is kept so removed files stay accounted for.
    #[error("Bulk delete failed after the file phase: {source}")]
    BulkDelete {
        report: DeletionReport,
        #[source]
        source: CatalogError,
    },

    #[error("Invalid tenant file '{}': {}", .path.display(), .source)]
    TenantFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Other(String),
}
