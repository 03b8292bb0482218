//! `credentia revoke`: Revoke a credential.

use clap::Args;
use serde::{Deserialize, Serialize};

use crate::client::{field, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// Credential to revoke.
    pub cred_id: String,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Serialize)]
struct RevokeRequest<'a> {
    #[serde(rename = "credID")]
    cred_id: &'a str,
}

#[derive(Deserialize)]
struct RevokeResponse {
    #[serde(rename = "txID")]
    tx_id: String,
    #[serde(rename = "alreadyRevoked")]
    already_revoked: bool,
}

pub async fn run(args: &RevokeArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node)?;
    let data: RevokeResponse = client
        .post(
            &["revoke"],
            &RevokeRequest {
                cred_id: &args.cred_id,
            },
        )
        .await?;

    if data.already_revoked {
        println!("Credential was already revoked.");
    } else {
        println!("Credential revoked!");
    }
    field("ID", &args.cred_id);
    field("Tx", data.tx_id);
    Ok(())
}
