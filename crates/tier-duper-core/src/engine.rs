use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::analysis::{
    DeletionReport, DuplicateGroupResolver, ResolutionStats, SafeDeletionExecutor,
};
use crate::catalog::{Catalog, CatalogConnector, RemovalCandidate};
use crate::config::{AppConfig, TenantConfig};
use crate::error::Error;
use crate::progress::ProgressReporter;

/// Drives resolution and deletion across tenants, one tenant at a time.
pub struct TenantBatchRunner<K: CatalogConnector> {
    connector: K,
    resolver: DuplicateGroupResolver,
    executor: SafeDeletionExecutor,
    dry_run: bool,
}

#[derive(Debug)]
pub struct TenantRun {
    pub duplicate_groups: usize,
    pub resolution: ResolutionStats,
    pub candidates: Vec<RemovalCandidate>,
    /// `None` for dry runs and when there was nothing to remove.
    pub deletion: Option<DeletionReport>,
    pub resolve_duration: Duration,
    pub delete_duration: Duration,
}

#[derive(Debug)]
pub struct TenantOutcome {
    pub internal_library: String,
    pub external_library: String,
    pub result: Result<TenantRun, Error>,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<TenantOutcome>,
}

impl TenantOutcome {
    /// File-phase report, also when the bulk delete that followed it failed.
    pub fn deletion_report(&self) -> Option<&DeletionReport> {
        match &self.result {
            Ok(run) => run.deletion.as_ref(),
            Err(Error::BulkDelete { report, .. }) => Some(report),
            Err(_) => None,
        }
    }
}

impl BatchSummary {
    pub fn failed_tenants(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    pub fn candidates_found(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|run| run.candidates.len())
            .sum()
    }

    /// Files unlinked by this run.
    pub fn files_removed(&self) -> usize {
        self.reports().map(|report| report.files_removed).sum()
    }

    /// Files that were already gone when this run tried to unlink them.
    pub fn files_already_absent(&self) -> usize {
        self.reports().map(|report| report.files_already_absent).sum()
    }

    pub fn file_failures(&self) -> usize {
        self.reports().map(|report| report.file_failures.len()).sum()
    }

    fn reports(&self) -> impl Iterator<Item = &DeletionReport> {
        self.outcomes.iter().filter_map(TenantOutcome::deletion_report)
    }
}

impl<K: CatalogConnector> TenantBatchRunner<K> {
    pub fn new(
        connector: K,
        resolver: DuplicateGroupResolver,
        executor: SafeDeletionExecutor,
    ) -> Self {
        Self {
            connector,
            resolver,
            executor,
            dry_run: false,
        }
    }

    pub fn from_config(connector: K, config: &AppConfig) -> Self {
        Self::new(
            connector,
            DuplicateGroupResolver::from_config(config),
            SafeDeletionExecutor::from_config(config),
        )
    }

    /// Resolve candidates without touching files or catalog records.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process every tenant in input order. Each tenant finishes before the
    /// next one is bound; a failing tenant is recorded and the loop moves on.
    pub async fn run_all(
        &self,
        tenants: &[TenantConfig],
        reporter: &dyn ProgressReporter,
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for (position, tenant) in tenants.iter().enumerate() {
            reporter.on_tenant_start(position + 1, tenants.len(), tenant);
            let result = self.run_tenant(tenant, reporter).await;
            if let Err(err) = &result {
                error!(
                    "Processing {} against {} failed: {}",
                    tenant.internal_library, tenant.external_library, err
                );
            }

            let outcome = TenantOutcome {
                internal_library: tenant.internal_library.clone(),
                external_library: tenant.external_library.clone(),
                result,
            };
            reporter.on_tenant_complete(&outcome);
            summary.outcomes.push(outcome);
        }

        summary
    }

    pub async fn run_tenant(
        &self,
        tenant: &TenantConfig,
        reporter: &dyn ProgressReporter,
    ) -> Result<TenantRun, Error> {
        info!(
            "Checking {} for duplicates of assets in {} ...",
            tenant.internal_library, tenant.external_library
        );

        // The session lives only for this tenant and is dropped on return.
        let catalog = self.connector.bind(tenant)?;
        self.reconcile(&catalog, reporter).await
    }

    async fn reconcile<C>(
        &self,
        catalog: &C,
        reporter: &dyn ProgressReporter,
    ) -> Result<TenantRun, Error>
    where
        C: Catalog + ?Sized,
    {
        let resolve_start = Instant::now();
        let groups = catalog.list_duplicate_groups().await?;
        info!("There are currently {} duplicates in total.", groups.len());
        reporter.on_groups_fetched(groups.len());

        let resolution = self.resolver.resolve(&groups, reporter).await;
        let resolve_duration = resolve_start.elapsed();
        debug!(
            "Resolution completed in {:.2}s: {:?}",
            resolve_duration.as_secs_f64(),
            resolution.stats
        );

        let mut run = TenantRun {
            duplicate_groups: groups.len(),
            resolution: resolution.stats,
            candidates: resolution.candidates,
            deletion: None,
            resolve_duration,
            delete_duration: Duration::ZERO,
        };

        if run.candidates.is_empty() {
            info!("The internal library has no assets with content exactly matching any of the imported library assets");
            return Ok(run);
        }

        info!(
            "Found {} internal library assets with content exactly matching some of the imported library assets",
            run.candidates.len()
        );

        if self.dry_run {
            for candidate in &run.candidates {
                info!(
                    "[dry run] would remove {} ({})",
                    candidate.id, candidate.original_path
                );
            }
            return Ok(run);
        }

        reporter.on_removal_start(run.candidates.len());
        let delete_start = Instant::now();
        let report = self.executor.remove(catalog, &run.candidates).await?;
        run.delete_duration = delete_start.elapsed();
        run.deletion = Some(report);

        Ok(run)
    }
}
