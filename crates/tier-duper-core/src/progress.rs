use crate::engine::TenantOutcome;
use crate::TenantConfig;

/// Trait for reporting reconciliation progress.
///
/// The CLI implements it with indicatif spinners. All methods have default
/// no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_tenant_start(&self, _position: usize, _total: usize, _tenant: &TenantConfig) {}
    fn on_groups_fetched(&self, _groups: usize) {}
    fn on_group_verified(&self, _verified: usize, _total: usize) {}
    fn on_removal_start(&self, _candidates: usize) {}
    fn on_tenant_complete(&self, _outcome: &TenantOutcome) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
