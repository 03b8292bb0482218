//! `credentia history`: Print the audit trail of a credential.

use clap::Args;
use serde::Deserialize;

use crate::client::{NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Credential to inspect.
    pub cred_id: String,

    /// Print the node's JSON response unchanged instead of a table.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Deserialize)]
struct AuditEvent {
    action: String,
    #[serde(rename = "mspID")]
    msp_id: String,
    #[serde(rename = "txID")]
    tx_id: String,
    timestamp: String,
    #[serde(default)]
    note: String,
}

pub async fn run(args: &HistoryArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node)?;
    let raw: serde_json::Value = client.get(&["history", args.cred_id.as_str()]).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&raw)?);
        return Ok(());
    }

    let events: Vec<AuditEvent> = serde_json::from_value(raw)?;

    if events.is_empty() {
        println!("No history for {}", args.cred_id);
        return Ok(());
    }

    println!("History of {} ({} events):", args.cred_id, events.len());
    for event in &events {
        println!(
            "  {}  {:<7} {:<12} {}  {}",
            event.timestamp, event.action, event.msp_id, event.tx_id, event.note
        );
    }
    Ok(())
}
