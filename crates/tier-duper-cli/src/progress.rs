use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use tier_duper_core::{ProgressReporter, TenantConfig, TenantOutcome};

/// CLI progress reporter using indicatif progress bars.
///
/// - Fetch phase: spinner (group count unknown until the catalog answers)
/// - Verify phase: progress bar over duplicate groups
/// - Removal phase: spinner
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }

    fn spinner(message: String) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }
}

impl ProgressReporter for CliReporter {
    fn on_tenant_start(&self, position: usize, total: usize, tenant: &TenantConfig) {
        self.set_bar(Self::spinner(format!(
            "[{}/{}] Fetching duplicates for {}...",
            position, total, tenant.internal_library
        )));
    }

    fn on_groups_fetched(&self, groups: usize) {
        let pb = ProgressBar::new(groups as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  Verifying [{bar:40.cyan/blue}] {pos}/{len} groups ({eta})",
            )
            .unwrap()
            .progress_chars("=> "),
        );
        self.set_bar(pb);
    }

    fn on_group_verified(&self, verified: usize, _total: usize) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_position(verified as u64);
        }
    }

    fn on_removal_start(&self, candidates: usize) {
        self.set_bar(Self::spinner(format!(
            "Removing {} duplicate upload(s)...",
            candidates
        )));
    }

    fn on_tenant_complete(&self, outcome: &TenantOutcome) {
        self.finish_bar();
        match &outcome.result {
            Ok(run) => eprintln!(
                "  \x1b[32m✓\x1b[0m {}: {} groups, {} exact duplicate(s) in {:.2}s",
                outcome.internal_library,
                run.duplicate_groups,
                run.candidates.len(),
                (run.resolve_duration + run.delete_duration).as_secs_f64()
            ),
            Err(err) => eprintln!(
                "  \x1b[31m✗\x1b[0m {}: {}",
                outcome.internal_library, err
            ),
        }
    }
}
