//! `credentia issue`: Issue a credential.

use clap::Args;
use serde::{Deserialize, Serialize};

use crate::client::{field, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Unique credential identifier.
    #[arg(long)]
    pub cred_id: String,

    #[arg(long)]
    pub student_id: String,

    #[arg(long)]
    pub student_name: String,

    #[arg(long)]
    pub university: String,

    #[arg(long)]
    pub degree: String,

    /// Grade point average, kept exactly as typed.
    #[arg(long)]
    pub gpa: String,

    /// Issue date, kept exactly as typed.
    #[arg(long)]
    pub issue_date: String,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Serialize)]
struct IssueRequest<'a> {
    #[serde(rename = "credID")]
    cred_id: &'a str,
    #[serde(rename = "studentID")]
    student_id: &'a str,
    #[serde(rename = "studentName")]
    student_name: &'a str,
    university: &'a str,
    degree: &'a str,
    gpa: &'a str,
    #[serde(rename = "issueDate")]
    issue_date: &'a str,
}

#[derive(Deserialize)]
struct IssueResponse {
    #[serde(rename = "storedHash")]
    stored_hash: String,
    #[serde(rename = "ownerMSP")]
    owner_msp: String,
    state: String,
    #[serde(rename = "txID")]
    tx_id: String,
}

pub async fn run(args: &IssueArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node)?;
    let body = IssueRequest {
        cred_id: &args.cred_id,
        student_id: &args.student_id,
        student_name: &args.student_name,
        university: &args.university,
        degree: &args.degree,
        gpa: &args.gpa,
        issue_date: &args.issue_date,
    };

    let data: IssueResponse = client.post(&["issue"], &body).await?;
    println!("Credential issued!");
    field("ID", &args.cred_id);
    field("Owner", data.owner_msp);
    field("State", data.state);
    field("Hash", data.stored_hash);
    field("Tx", data.tx_id);
    Ok(())
}
