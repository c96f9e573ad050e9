//! REST client for the Immich-compatible catalog API, built on [`reqwest`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::time::Duration;
use tracing::debug;

use super::models::{BulkDeleteRequest, DuplicateGroup};
use super::{Catalog, CatalogConnector, CatalogError};
use crate::config::{AppConfig, TenantConfig};

const API_KEY_HEADER: &str = "x-api-key";

/// Binds one [`HttpCatalog`] per tenant against a shared server URL.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    server_url: String,
    timeout: Duration,
    force_delete: bool,
}

impl HttpConnector {
    pub fn new(server_url: &str, timeout: Duration) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            timeout,
            force_delete: false,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.server_url, config.request_timeout())
            .with_force_delete(config.force_delete)
    }

    /// Purge records instead of moving them to the catalog trash.
    pub fn with_force_delete(mut self, force_delete: bool) -> Self {
        self.force_delete = force_delete;
        self
    }
}

impl CatalogConnector for HttpConnector {
    type Catalog = HttpCatalog;

    fn bind(&self, tenant: &TenantConfig) -> Result<HttpCatalog, CatalogError> {
        let mut api_key =
            HeaderValue::from_str(&tenant.api_key).map_err(|_| CatalogError::InvalidApiKey)?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()?;

        debug!("Bound catalog session for {}", tenant.internal_library);
        Ok(HttpCatalog {
            client,
            base_url: self.server_url.clone(),
            force_delete: self.force_delete,
        })
    }
}

/// HTTP session for a single tenant. Dropped when the tenant's run ends.
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
    force_delete: bool,
}

impl HttpCatalog {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, CatalogError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CatalogError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn list_duplicate_groups(&self) -> Result<Vec<DuplicateGroup>, CatalogError> {
        let response = self.client.get(self.url("/duplicates")).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Vec<DuplicateGroup>>().await?)
    }

    async fn bulk_delete(&self, ids: &[String]) -> Result<(), CatalogError> {
        let body = BulkDeleteRequest {
            ids,
            force: self.force_delete,
        };
        let response = self
            .client
            .delete(self.url("/assets"))
            .json(&body)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}
