//! `credentia status`: Query the health of a running node.

use clap::Args;
use serde::Deserialize;

use crate::client::{field, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_secs: u64,
    organizations: usize,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node)?;
    match client.get::<HealthResponse>(&["health"]).await {
        Ok(health) => {
            println!("Node Status:");
            field("Status", health.status);
            field("Version", health.version);
            field("Uptime", format!("{}s", health.uptime_secs));
            field("Orgs", health.organizations);
        }
        Err(e) => {
            println!("Could not reach node at {}", args.node.endpoint);
            println!("  Error: {e:#}");
            println!();
            println!("Is the node running? Start it with: credentia-node");
        }
    }
    Ok(())
}
