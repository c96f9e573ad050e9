//! Catalog service collaborators.
//!
//! The reconciliation core only needs two calls from the catalog: list the
//! current duplicate groups and bulk-delete asset records. Sessions are bound
//! per tenant through a [`CatalogConnector`] so no credentials live in global
//! state.

pub mod http;
pub mod models;

use async_trait::async_trait;

use crate::config::TenantConfig;

pub use http::{HttpCatalog, HttpConnector};
pub use models::{Asset, DuplicateGroup, RemovalCandidate};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Network, DNS, TLS or timeout failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Catalog API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("API key is not a valid header value")]
    InvalidApiKey,

    #[error("{0}")]
    Other(String),
}

/// An authenticated view of one tenant's catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_duplicate_groups(&self) -> Result<Vec<DuplicateGroup>, CatalogError>;

    /// Remove the given asset records. The batch fails or succeeds as a whole.
    async fn bulk_delete(&self, ids: &[String]) -> Result<(), CatalogError>;
}

/// Builds a fresh catalog session for a tenant.
pub trait CatalogConnector {
    type Catalog: Catalog;

    fn bind(&self, tenant: &TenantConfig) -> Result<Self::Catalog, CatalogError>;
}
