#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::future::Future;
use std::sync::{mpsc, Arc, Mutex};

use tier_duper_core::catalog::{Asset, Catalog, CatalogConnector, CatalogError, DuplicateGroup};
use tier_duper_core::hasher::ChecksumEncoding;
use tier_duper_core::TenantConfig;

#[derive(Debug, Default)]
pub struct CatalogState {
    pub groups: Vec<DuplicateGroup>,
    pub fail_listing: bool,
    pub fail_delete: bool,
    pub list_calls: usize,
    /// Every bulk delete request, in call order.
    pub delete_calls: Vec<Vec<String>>,
    /// For each id in a bulk delete: did its backing file still exist?
    pub files_present_at_delete: Vec<(String, bool)>,
}

/// In-memory catalog. Successful bulk deletes drop the assets from their
/// groups, and groups left with fewer than two assets disappear.
#[derive(Debug, Clone, Default)]
pub struct FakeCatalog {
    pub state: Arc<Mutex<CatalogState>>,
}

impl FakeCatalog {
    pub fn with_groups(groups: Vec<DuplicateGroup>) -> Self {
        let catalog = Self::default();
        catalog.state.lock().unwrap().groups = groups;
        catalog
    }

    pub fn failing_listing() -> Self {
        let catalog = Self::default();
        catalog.state.lock().unwrap().fail_listing = true;
        catalog
    }

    pub fn fail_delete(&self) {
        self.state.lock().unwrap().fail_delete = true;
    }

    pub fn delete_calls(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().delete_calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn files_present_at_delete(&self) -> Vec<(String, bool)> {
        self.state.lock().unwrap().files_present_at_delete.clone()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_duplicate_groups(&self) -> Result<Vec<DuplicateGroup>, CatalogError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if state.fail_listing {
            return Err(CatalogError::Api {
                status: 503,
                body: "catalog unavailable".to_string(),
            });
        }
        Ok(state.groups.clone())
    }

    async fn bulk_delete(&self, ids: &[String]) -> Result<(), CatalogError> {
        let mut state = self.state.lock().unwrap();

        let paths: HashMap<String, String> = state
            .groups
            .iter()
            .flat_map(|g| g.assets.iter())
            .map(|a| (a.id.clone(), a.original_path.clone()))
            .collect();
        for id in ids {
            let present = paths
                .get(id)
                .map(|p| Path::new(p).exists())
                .unwrap_or(false);
            state.files_present_at_delete.push((id.clone(), present));
        }

        state.delete_calls.push(ids.to_vec());
        if state.fail_delete {
            return Err(CatalogError::Other("bulk delete rejected".to_string()));
        }

        for group in state.groups.iter_mut() {
            group.assets.retain(|a| !ids.contains(&a.id));
        }
        state.groups.retain(|g| g.assets.len() > 1);
        Ok(())
    }
}

/// Hands out a pre-registered catalog per API key and records bind order.
#[derive(Debug, Default)]
pub struct FakeConnector {
    pub catalogs: HashMap<String, FakeCatalog>,
    pub binds: Arc<Mutex<Vec<String>>>,
}

impl FakeConnector {
    pub fn register(&mut self, api_key: &str, catalog: FakeCatalog) {
        self.catalogs.insert(api_key.to_string(), catalog);
    }

    pub fn binds(&self) -> Vec<String> {
        self.binds.lock().unwrap().clone()
    }
}

impl CatalogConnector for FakeConnector {
    type Catalog = FakeCatalog;

    fn bind(&self, tenant: &TenantConfig) -> Result<FakeCatalog, CatalogError> {
        self.binds.lock().unwrap().push(tenant.api_key.clone());
        self.catalogs
            .get(&tenant.api_key)
            .cloned()
            .ok_or_else(|| CatalogError::Other(format!("unknown api key {}", tenant.api_key)))
    }
}

pub fn tenant(name: &str, api_key: &str) -> TenantConfig {
    TenantConfig {
        internal_library: format!("{}-uploads", name),
        external_library: format!("{}-nas", name),
        api_key: api_key.to_string(),
    }
}

pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Checksum of `content` in the catalog's stored format (sha1, base64).
pub fn catalog_checksum(content: &[u8]) -> String {
    use sha1::{Digest, Sha1};
    ChecksumEncoding::Base64.encode(&Sha1::digest(content))
}

pub fn uploaded(id: &str, path: &Path, checksum: &str) -> Asset {
    Asset {
        id: id.to_string(),
        original_path: path.to_string_lossy().into_owned(),
        checksum: checksum.to_string(),
        library_id: None,
    }
}

pub fn imported(id: &str, path: &Path, library_id: &str) -> Asset {
    Asset {
        id: id.to_string(),
        original_path: path.to_string_lossy().into_owned(),
        // The catalog's own checksum for imported assets is never consulted.
        checksum: "unused".to_string(),
        library_id: Some(library_id.to_string()),
    }
}

pub fn group(duplicate_id: &str, assets: Vec<Asset>) -> DuplicateGroup {
    DuplicateGroup {
        duplicate_id: duplicate_id.to_string(),
        assets,
    }
}

/// Current-thread runtime whose single blocking thread is parked, so every
/// `tokio::fs` call stays queued and any per-file timeout expires.
pub struct StalledFsRuntime {
    // declared first: the parked thread must be released before the runtime
    // waits for its blocking pool on drop
    _release: mpsc::Sender<()>,
    runtime: tokio::runtime::Runtime,
}

impl StalledFsRuntime {
    pub fn new() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .max_blocking_threads(1)
            .build()
            .unwrap();
        let (release, parked) = mpsc::channel::<()>();
        runtime.spawn_blocking(move || {
            let _ = parked.recv();
        });
        Self {
            _release: release,
            runtime,
        }
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
