use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::catalog::{Asset, DuplicateGroup, RemovalCandidate};
use crate::config::AppConfig;
use crate::hasher::ContentChecksummer;
use crate::progress::{ProgressReporter, SilentReporter};

const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolutionStats {
    pub groups_inspected: usize,
    pub groups_without_upload: usize,
    pub groups_without_import: usize,
    pub groups_without_match: usize,
    pub checksum_failures: usize,
    pub candidates: usize,
}

#[derive(Debug, Default, Clone)]
pub struct Resolution {
    pub candidates: Vec<RemovalCandidate>,
    pub stats: ResolutionStats,
}

enum GroupOutcome {
    NoUpload,
    NoImport,
    NoMatch { failures: usize },
    Remove { candidate: RemovalCandidate, failures: usize },
}

/// Decides which uploaded assets are exact-content copies of imported ones.
///
/// Per group, the first asset without a library id is the upload under test.
/// Every imported asset's file is checksummed and compared, as an opaque
/// string, against the upload's catalog-declared checksum. One match is
/// enough to queue the upload for removal. Imported assets are never queued.
#[derive(Debug, Clone)]
pub struct DuplicateGroupResolver {
    checksummer: ContentChecksummer,
    concurrency: usize,
}

impl DuplicateGroupResolver {
    pub fn new(checksummer: ContentChecksummer) -> Self {
        Self {
            checksummer,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(ContentChecksummer::from_config(config))
            .with_concurrency(config.verify_concurrency)
    }

    /// Maximum number of groups verified at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn resolve_removals(&self, groups: &[DuplicateGroup]) -> Vec<RemovalCandidate> {
        self.resolve(groups, &SilentReporter).await.candidates
    }

    pub async fn resolve(
        &self,
        groups: &[DuplicateGroup],
        reporter: &dyn ProgressReporter,
    ) -> Resolution {
        let total = groups.len();
        let mut resolution = Resolution::default();
        let mut seen: HashSet<String> = HashSet::new();

        // `buffered` keeps output in input order while verifying groups concurrently
        let mut outcomes = stream::iter(groups)
            .map(|group| self.resolve_group(group))
            .buffered(self.concurrency);

        let mut verified = 0usize;
        while let Some(outcome) = outcomes.next().await {
            verified += 1;
            reporter.on_group_verified(verified, total);

            let stats = &mut resolution.stats;
            stats.groups_inspected += 1;
            match outcome {
                GroupOutcome::NoUpload => stats.groups_without_upload += 1,
                GroupOutcome::NoImport => stats.groups_without_import += 1,
                GroupOutcome::NoMatch { failures } => {
                    stats.groups_without_match += 1;
                    stats.checksum_failures += failures;
                }
                GroupOutcome::Remove {
                    candidate,
                    failures,
                } => {
                    stats.checksum_failures += failures;
                    if seen.insert(candidate.id.clone()) {
                        stats.candidates += 1;
                        resolution.candidates.push(candidate);
                    }
                }
            }
        }

        resolution
    }

    async fn resolve_group(&self, group: &DuplicateGroup) -> GroupOutcome {
        let mut uploads = group.assets.iter().filter(|asset| !asset.is_imported());
        let Some(upload) = uploads.next() else {
            return GroupOutcome::NoUpload;
        };
        let ignored_uploads = uploads.count();
        if ignored_uploads > 0 {
            debug!(
                "Group {} has {} additional uploaded asset(s); only {} is considered",
                group.duplicate_id, ignored_uploads, upload.id
            );
        }

        let imported: Vec<&Asset> = group.assets.iter().filter(|a| a.is_imported()).collect();
        if imported.is_empty() {
            return GroupOutcome::NoImport;
        }

        let (matches, failures) = self.find_exact_content_duplicates(upload, &imported).await;
        if matches.is_empty() {
            debug!(
                "Uploaded asset {} ({}) has no imported asset with identical content",
                upload.id, upload.original_path
            );
            return GroupOutcome::NoMatch { failures };
        }

        let matched: Vec<String> = matches
            .iter()
            .map(|asset| format!("{} ({})", asset.id, asset.original_path))
            .collect();
        info!(
            "The uploaded asset {} ({}) is an exact duplicate of the imported asset(s): {}; will delete {}",
            upload.id,
            upload.original_path,
            matched.join(", "),
            upload.id
        );

        GroupOutcome::Remove {
            candidate: RemovalCandidate::from(upload),
            failures,
        }
    }

    /// Returns the imported assets whose file content hashes to the upload's
    /// declared checksum, plus the number of files that could not be read.
    async fn find_exact_content_duplicates<'a>(
        &self,
        upload: &Asset,
        imported: &[&'a Asset],
    ) -> (Vec<&'a Asset>, usize) {
        let checks = imported.iter().map(|asset| async move {
            let result = self
                .checksummer
                .checksum(Path::new(&asset.original_path))
                .await;
            (*asset, result)
        });

        let mut matches = Vec::new();
        let mut failures = 0usize;
        for (asset, result) in join_all(checks).await {
            match result {
                Ok(digest) if digest == upload.checksum => matches.push(asset),
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        "Could not checksum imported asset {} ({}): {}; treating as non-matching",
                        asset.id, asset.original_path, e
                    );
                    failures += 1;
                }
            }
        }

        (matches, failures)
    }
}

impl Default for DuplicateGroupResolver {
    fn default() -> Self {
        Self::new(ContentChecksummer::default())
    }
}
