//! `credentia verify`: Show a credential as your organization holds it.

use clap::Args;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::client::{field, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Credential to look up.
    pub cred_id: String,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Deserialize)]
struct CredentialView {
    credential: BTreeMap<String, String>,
    #[serde(rename = "storedHash")]
    stored_hash: String,
    state: String,
    #[serde(rename = "ownerMSP")]
    owner_msp: String,
    #[serde(rename = "holderMSP")]
    holder_msp: String,
}

pub async fn run(args: &VerifyArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node)?;
    let view: CredentialView = client.get(&["verify", args.cred_id.as_str()]).await?;

    println!("Credential {}", args.cred_id);
    field("State", view.state);
    field("Owner", view.owner_msp);
    field("Holder", view.holder_msp);
    field("Hash", view.stored_hash);
    for (name, value) in &view.credential {
        field(name, value);
    }
    Ok(())
}
