use serde::{Deserialize, Serialize};

/// Read-only snapshot of a catalog asset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub original_path: String,
    pub checksum: String,
    /// Set only for assets imported from an external library.
    #[serde(default)]
    pub library_id: Option<String>,
}

impl Asset {
    pub fn is_imported(&self) -> bool {
        self.library_id.is_some()
    }
}

/// Assets the catalog flagged as duplicates by a non-exact signature.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    #[serde(default)]
    pub duplicate_id: String,
    pub assets: Vec<Asset>,
}

/// An internal asset confirmed byte-identical to an imported one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalCandidate {
    pub id: String,
    pub original_path: String,
}

impl From<&Asset> for RemovalCandidate {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id.clone(),
            original_path: asset.original_path.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct BulkDeleteRequest<'a> {
    pub ids: &'a [String],
    pub force: bool,
}
