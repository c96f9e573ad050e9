use config::{Config, ConfigError, Environment, File as ConfigFile, Source};
use serde::Deserialize;
use std::fmt;
use std::io;
use std::path::Path;
use std::time::Duration;

use crate::error::Error;
use crate::hasher::{ChecksumAlgorithm, ChecksumEncoding};

pub const DEFAULT_SERVER_URL: &str = "http://immich_server:2283/api";
pub const DEFAULT_TENANTS_FILE: &str = "/user_libraries";
pub const DEFAULT_LOG_FILE_PATH: &str = "./logs/tier-duper.log";
const ENV_PREFIX: &str = "TIER_DUPER";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server_url: String,
    pub tenants_file: String,
    pub request_timeout_secs: u64,
    pub file_timeout_secs: u64,
    pub verify_concurrency: usize,
    pub checksum_algorithm: ChecksumAlgorithm,
    pub checksum_encoding: ChecksumEncoding,
    pub force_delete: bool,
    pub tracing_level: String,
    pub log_file_path: String,
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn file_timeout(&self) -> Duration {
        Duration::from_secs(self.file_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            tenants_file: DEFAULT_TENANTS_FILE.to_string(),
            request_timeout_secs: 30,
            file_timeout_secs: 300,
            verify_concurrency: 8,
            checksum_algorithm: ChecksumAlgorithm::default(),
            checksum_encoding: ChecksumEncoding::default(),
            force_delete: false,
            tracing_level: "info".to_string(),
            log_file_path: DEFAULT_LOG_FILE_PATH.to_string(),
        }
    }
}

/// Load settings from an optional `Config.*` file in the working directory,
/// overridden by `TIER_DUPER_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    load_with(ConfigFile::with_name("Config").required(false))
}

pub fn load_with<S>(source: S) -> Result<AppConfig, ConfigError>
where
    S: Source + Send + Sync + 'static,
{
    let defaults = AppConfig::default();
    let builder = Config::builder()
        .set_default("server_url", defaults.server_url)?
        .set_default("tenants_file", defaults.tenants_file)?
        .set_default("request_timeout_secs", defaults.request_timeout_secs)?
        .set_default("file_timeout_secs", defaults.file_timeout_secs)?
        .set_default("verify_concurrency", defaults.verify_concurrency as u64)?
        .set_default("checksum_algorithm", "sha1")?
        .set_default("checksum_encoding", "base64")?
        .set_default("force_delete", defaults.force_delete)?
        .set_default("tracing_level", defaults.tracing_level)?
        .set_default("log_file_path", defaults.log_file_path)?
        .add_source(source)
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?;

    let config = builder.try_deserialize::<AppConfig>()?;
    if config.verify_concurrency == 0 {
        return Err(ConfigError::Message(
            "verify_concurrency must be at least 1".to_string(),
        ));
    }
    Ok(config)
}

/// One tenant's catalog credentials. The library labels are only used in logs.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfig {
    pub internal_library: String,
    pub external_library: String,
    pub api_key: String,
}

impl fmt::Debug for TenantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantConfig")
            .field("internal_library", &self.internal_library)
            .field("external_library", &self.external_library)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

pub fn parse_tenants(path: &Path, raw: &str) -> Result<Vec<TenantConfig>, Error> {
    serde_json::from_str(raw).map_err(|source| Error::TenantFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the ordered tenant list. Order is preserved; tenants run in file order.
pub async fn load_tenants(path: &Path) -> Result<Vec<TenantConfig>, Error> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("Error reading tenant file {}: {}", path.display(), err),
        )
    })?;
    parse_tenants(path, &raw)
}
