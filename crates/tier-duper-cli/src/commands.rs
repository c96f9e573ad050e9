use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tier-duper")]
#[command(
    about = "Removes uploaded assets that are exact copies of imported library assets",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile every configured tenant, deleting confirmed duplicates
    Run {
        /// Resolve removal candidates without deleting anything
        #[arg(long)]
        dry_run: bool,
    },
    /// List removal candidates per tenant without deleting anything
    Resolve,
    /// Print the tenant labels from the tenant file
    ListTenants,
    /// Print configuration values
    PrintConfig,
}
