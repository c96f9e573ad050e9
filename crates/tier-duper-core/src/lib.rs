pub mod analysis;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod progress;

pub use analysis::{DeletionReport, DuplicateGroupResolver, SafeDeletionExecutor};
pub use catalog::{Catalog, CatalogConnector, HttpConnector};
pub use self::config::{AppConfig, TenantConfig};
pub use engine::{BatchSummary, TenantBatchRunner, TenantOutcome, TenantRun};
pub use error::Error;
pub use hasher::ContentChecksummer;
pub use progress::{ProgressReporter, SilentReporter};
