//! Thin HTTP client shared by every subcommand.

use anyhow::Context;
use clap::Args;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection options common to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct NodeArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9001")]
    pub endpoint: String,

    /// Organization (MSP id) to act as. Defaults to the node's organization.
    #[arg(short, long)]
    pub org: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    kind: String,
    message: String,
}

pub struct NodeClient {
    http: reqwest::Client,
    endpoint: reqwest::Url,
    org: Option<String>,
}

impl NodeClient {
    pub fn new(args: &NodeArgs) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(args.timeout))
            .build()?;
        let endpoint = reqwest::Url::parse(&args.endpoint)
            .with_context(|| format!("invalid endpoint {}", args.endpoint))?;
        Ok(Self {
            http,
            endpoint,
            org: args.org.clone(),
        })
    }

    fn with_org(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.org {
            Some(org) => req.header("x-msp-id", org),
            None => req,
        }
    }

    /// GET the route made of `segments`; each segment is percent-encoded.
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> anyhow::Result<T> {
        let url = route_url(&self.endpoint, segments)?;
        let req = self.with_org(self.http.get(url));
        self.send(req).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> anyhow::Result<T> {
        let url = route_url(&self.endpoint, segments)?;
        let req = self.with_org(self.http.post(url).json(body));
        self.send(req).await
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> anyhow::Result<T> {
        let resp = req
            .send()
            .await
            .with_context(|| format!("could not reach node at {}", self.endpoint))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        match resp.json::<ErrorResponse>().await {
            Ok(err) => anyhow::bail!(
                "{} (HTTP {}): {}",
                err.error.kind,
                status,
                err.error.message
            ),
            Err(_) => anyhow::bail!("request failed (HTTP {})", status),
        }
    }
}

/// Append `segments` to the endpoint path. Ids may contain `/`, `?`, `#` or
/// spaces, so they are never spliced into the URL as text.
fn route_url(endpoint: &reqwest::Url, segments: &[&str]) -> anyhow::Result<reqwest::Url> {
    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("endpoint {endpoint} cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Print one labelled line, aligned like the rest of the output.
pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<14}{}", format!("{label}:"), value);
}
