//! `credentia share`: Share a credential with another organization.

use clap::Args;
use serde::{Deserialize, Serialize};

use crate::client::{field, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct ShareArgs {
    /// Credential to share.
    pub cred_id: String,

    /// Organization (MSP id) to share with.
    #[arg(short, long)]
    pub target: String,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Serialize)]
struct ShareRequest<'a> {
    #[serde(rename = "credID")]
    cred_id: &'a str,
    #[serde(rename = "targetMSP")]
    target_msp: &'a str,
}

#[derive(Deserialize)]
struct ShareResponse {
    #[serde(rename = "sourceMSP")]
    source_msp: String,
    #[serde(rename = "targetMSP")]
    target_msp: String,
    #[serde(rename = "txID")]
    tx_id: String,
    timestamp: String,
}

pub async fn run(args: &ShareArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node)?;
    let body = ShareRequest {
        cred_id: &args.cred_id,
        target_msp: &args.target,
    };

    let data: ShareResponse = client.post(&["share"], &body).await?;
    println!("Credential shared!");
    field("ID", &args.cred_id);
    field("From", data.source_msp);
    field("To", data.target_msp);
    field("Tx", data.tx_id);
    field("At", data.timestamp);
    Ok(())
}
