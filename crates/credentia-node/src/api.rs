//! HTTP API server for the Credentia node.
//!
//! Provides REST endpoints for issuing, sharing, verifying and revoking
//! credentials, reading their audit history, and a liveness probe.

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use credentia_core::{AuditEvent, CoreError, MspId, RawCredentialFields, ShareRecord, StoredCredential};
use credentia_registry::{IntegrityReport, IssueReceipt, RevokeAck};

use crate::error::ApiError;
use crate::state::NodeState;

/// Header naming the calling organization.
pub const MSP_HEADER: &str = "x-msp-id";

/// The organization a request acts for: the `x-msp-id` header, or the
/// node's default organization when the header is absent.
#[derive(Debug, Clone)]
pub struct CallerMsp(pub MspId);

impl FromRequestParts<Arc<NodeState>> for CallerMsp {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<NodeState>,
    ) -> Result<Self, Self::Rejection> {
        match parts.headers.get(MSP_HEADER) {
            None => Ok(Self(state.default_msp.clone())),
            Some(value) => {
                let value = value.to_str().map_err(|_| {
                    ApiError::InvalidField(format!("{MSP_HEADER} header is not valid text"))
                })?;
                Ok(Self(MspId::new(value)?))
            }
        }
    }
}

// --- Request / response types ---

#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    #[serde(flatten)]
    pub fields: RawCredentialFields,
    /// Accepted for compatibility and discarded; the commitment is always
    /// computed by the node.
    #[serde(default)]
    pub hash: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    #[serde(rename = "credID", default)]
    pub cred_id: Option<String>,
    #[serde(rename = "targetMSP", default)]
    pub target_msp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    #[serde(rename = "credID", default)]
    pub cred_id: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub organizations: usize,
}

fn require(value: Option<String>, field: &'static str) -> Result<String, ApiError> {
    value.ok_or(ApiError::Core(CoreError::MissingField(field)))
}

// --- Handlers ---

async fn handle_health(State(state): State<Arc<NodeState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        organizations: state.registry.organizations().len(),
    })
}

async fn handle_issue(
    State(state): State<Arc<NodeState>>,
    CallerMsp(caller): CallerMsp,
    body: Result<Json<IssueRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IssueReceipt>), ApiError> {
    let Json(req) = body?;
    if req.hash.is_some() {
        tracing::warn!(
            caller = %caller,
            credential_id = ?req.fields.cred_id,
            "ignoring client-supplied hash"
        );
    }
    let fields = req.fields.validate()?;
    let receipt = state.registry.issue(&caller, fields).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn handle_share(
    State(state): State<Arc<NodeState>>,
    CallerMsp(caller): CallerMsp,
    body: Result<Json<ShareRequest>, JsonRejection>,
) -> Result<Json<ShareRecord>, ApiError> {
    let Json(req) = body?;
    let cred_id = require(req.cred_id, "credID")?;
    let target = MspId::new(require(req.target_msp, "targetMSP")?)?;
    let share = state.registry.share(&caller, &cred_id, &target).await?;
    Ok(Json(share))
}

async fn handle_revoke(
    State(state): State<Arc<NodeState>>,
    CallerMsp(caller): CallerMsp,
    body: Result<Json<RevokeRequest>, JsonRejection>,
) -> Result<Json<RevokeAck>, ApiError> {
    let Json(req) = body?;
    let cred_id = require(req.cred_id, "credID")?;
    let ack = state.registry.revoke(&caller, &cred_id).await?;
    Ok(Json(ack))
}

async fn handle_verify(
    State(state): State<Arc<NodeState>>,
    CallerMsp(caller): CallerMsp,
    Path(cred_id): Path<String>,
) -> Result<Json<StoredCredential>, ApiError> {
    Ok(Json(state.registry.view(&caller, &cred_id)?))
}

async fn handle_verify_hash(
    State(state): State<Arc<NodeState>>,
    CallerMsp(caller): CallerMsp,
    Path(cred_id): Path<String>,
) -> Result<Json<IntegrityReport>, ApiError> {
    Ok(Json(state.registry.verify_hash(&caller, &cred_id)?))
}

async fn handle_history(
    State(state): State<Arc<NodeState>>,
    Path(cred_id): Path<String>,
) -> Result<Json<Vec<AuditEvent>>, ApiError> {
    Ok(Json(state.registry.history(&cred_id)?))
}

// --- Server ---

pub fn build_router(state: Arc<NodeState>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/issue", post(handle_issue))
        .route("/share", post(handle_share))
        .route("/revoke", post(handle_revoke))
        .route("/verify/{cred_id}", get(handle_verify))
        .route("/verify-hash/{cred_id}", get(handle_verify_hash))
        .route("/history/{cred_id}", get(handle_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on an already bound listener until `shutdown` resolves.
pub async fn start_api_server(
    listener: TcpListener,
    state: Arc<NodeState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = build_router(state);
    let listen_addr = listener.local_addr()?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("HTTP API server stopped");
    Ok(())
}
