mod commands;
mod logging;
mod progress;

use std::path::Path;
use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use progress::CliReporter;
use tier_duper_core::config::load_tenants;
use tier_duper_core::{AppConfig, BatchSummary, HttpConnector, TenantBatchRunner};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = match tier_duper_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let guard = logging::init_logger(&config);

    let args = Cli::parse();

    let exit_code = match args.command {
        Some(Commands::Run { dry_run }) => report(run_process(&config, dry_run).await),
        Some(Commands::Resolve) => report(run_resolve(&config).await),
        Some(Commands::ListTenants) => report(run_list_tenants(&config).await),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            0
        }
        None => {
            let _ = Cli::command().print_long_help();
            0
        }
    };

    // flush the file appender before exiting
    drop(guard);
    process::exit(exit_code);
}

fn report(result: anyhow::Result<i32>) -> i32 {
    result.unwrap_or_else(|err| {
        error!("Error: {:#}", err);
        1
    })
}

async fn reconcile(config: &AppConfig, dry_run: bool) -> anyhow::Result<BatchSummary> {
    let tenants = load_tenants(Path::new(&config.tenants_file))
        .await
        .context("Could not load tenant configuration")?;
    info!("Loaded {} tenant(s) from {}", tenants.len(), config.tenants_file);

    let runner = TenantBatchRunner::from_config(HttpConnector::from_config(config), config)
        .with_dry_run(dry_run);
    let reporter = CliReporter::new();
    Ok(runner.run_all(&tenants, &reporter).await)
}

async fn run_process(config: &AppConfig, dry_run: bool) -> anyhow::Result<i32> {
    let summary = reconcile(config, dry_run).await?;

    println!();
    info!(
        "{} tenant(s), {} failed, {} exact duplicate(s), {} file(s) removed, {} already absent, {} not removed",
        format!("{}", summary.outcomes.len()).cyan(),
        format!("{}", summary.failed_tenants()).red(),
        format!("{}", summary.candidates_found()).yellow(),
        format!("{}", summary.files_removed()).green(),
        format!("{}", summary.files_already_absent()).green(),
        format!("{}", summary.file_failures()).red(),
    );
    for outcome in &summary.outcomes {
        if let Some(report) = outcome.deletion_report() {
            for failure in &report.file_failures {
                error!(
                    "{}: could not remove {} ({}): {}",
                    outcome.internal_library, failure.path, failure.id, failure.error
                );
            }
        }
    }

    Ok(if summary.failed_tenants() > 0 { 1 } else { 0 })
}

async fn run_resolve(config: &AppConfig) -> anyhow::Result<i32> {
    let summary = reconcile(config, true).await?;

    for outcome in &summary.outcomes {
        match &outcome.result {
            Ok(run) => {
                println!(
                    "{} vs {}: {} candidate(s)",
                    outcome.internal_library.bold(),
                    outcome.external_library,
                    format!("{}", run.candidates.len()).yellow()
                );
                for candidate in &run.candidates {
                    println!("  {}  {}", candidate.id, candidate.original_path);
                }
            }
            Err(err) => println!(
                "{}: {}",
                outcome.internal_library.bold(),
                err.to_string().red()
            ),
        }
    }

    Ok(if summary.failed_tenants() > 0 { 1 } else { 0 })
}

async fn run_list_tenants(config: &AppConfig) -> anyhow::Result<i32> {
    let tenants = load_tenants(Path::new(&config.tenants_file)).await?;
    for (position, tenant) in tenants.iter().enumerate() {
        println!(
            "{}. {} -> {}",
            position + 1,
            tenant.internal_library,
            tenant.external_library
        );
    }
    Ok(0)
}
