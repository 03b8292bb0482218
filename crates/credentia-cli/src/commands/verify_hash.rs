//! `credentia verify-hash`: Check a credential against its commitment.

use clap::Args;
use serde::Deserialize;

use crate::client::{field, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct VerifyHashArgs {
    /// Credential to verify.
    pub cred_id: String,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Deserialize)]
struct IntegrityReport {
    #[serde(rename = "isHashValid")]
    is_hash_valid: bool,
    #[serde(rename = "storedHash")]
    stored_hash: String,
    #[serde(rename = "computedHash")]
    computed_hash: String,
    state: String,
    checks: Vec<VerifyCheck>,
}

#[derive(Deserialize)]
struct VerifyCheck {
    name: String,
    passed: bool,
    detail: Option<String>,
}

pub async fn run(args: &VerifyHashArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node)?;
    let report: IntegrityReport = client.get(&["verify-hash", args.cred_id.as_str()]).await?;

    if report.is_hash_valid {
        println!("Credential hash is VALID");
    } else {
        println!("Credential hash is INVALID");
    }
    field("State", report.state);
    field("Stored", report.stored_hash);
    field("Computed", report.computed_hash);
    println!();
    for check in &report.checks {
        let icon = if check.passed { "PASS" } else { "FAIL" };
        print!("  [{}] {}", icon, check.name);
        if let Some(ref detail) = check.detail {
            print!(": {}", detail);
        }
        println!();
    }
    Ok(())
}
