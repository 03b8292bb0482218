//! Credentia CLI: Command-line client for a Credentia registry node.
//!
//! Subcommands: issue, share, verify, verify-hash, revoke, history, status.

mod client;
mod commands;

use clap::{Parser, Subcommand};

/// Credentia: Cross-organization academic credential registry.
#[derive(Parser, Debug)]
#[command(name = "credentia", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Issue a credential into your organization's partition.
    Issue(commands::issue::IssueArgs),
    /// Share a credential with another organization.
    Share(commands::share::ShareArgs),
    /// Show your organization's view of a credential.
    Verify(commands::verify::VerifyArgs),
    /// Recompute a credential's hash and compare it with the stored one.
    VerifyHash(commands::verify_hash::VerifyHashArgs),
    /// Revoke a credential.
    Revoke(commands::revoke::RevokeArgs),
    /// Show the audit history of a credential.
    History(commands::history::HistoryArgs),
    /// Check that a node is up.
    Status(commands::status::StatusArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Issue(args) => commands::issue::run(args).await,
        Commands::Share(args) => commands::share::run(args).await,
        Commands::Verify(args) => commands::verify::run(args).await,
        Commands::VerifyHash(args) => commands::verify_hash::run(args).await,
        Commands::Revoke(args) => commands::revoke::run(args).await,
        Commands::History(args) => commands::history::run(args).await,
        Commands::Status(args) => commands::status::run(args).await,
    }
}
