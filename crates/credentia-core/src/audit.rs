use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::MspId;

/// Lifecycle action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Issue,
    Share,
    Verify,
    Revoke,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue => write!(f, "ISSUE"),
            Self::Share => write!(f, "SHARE"),
            Self::Verify => write!(f, "VERIFY"),
            Self::Revoke => write!(f, "REVOKE"),
        }
    }
}

/// An immutable audit-trail entry. Appended once per lifecycle operation to
/// the acting organization's log and never edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    #[serde(rename = "credID")]
    pub cred_id: String,
    pub action: AuditAction,
    /// Organization that performed the action.
    #[serde(rename = "mspID")]
    pub msp_id: MspId,
    #[serde(rename = "txID")]
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
    /// Free text; always present, possibly empty.
    #[serde(default)]
    pub note: String,
    /// Global insertion counter, the tie-breaker for equal timestamps.
    pub sequence: u64,
    /// Destination organization of a share.
    #[serde(rename = "targetMSP", default, skip_serializing_if = "Option::is_none")]
    pub target_msp: Option<MspId>,
}

impl AuditEvent {
    pub fn new(
        cred_id: impl Into<String>,
        action: AuditAction,
        msp_id: MspId,
        tx_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        sequence: u64,
    ) -> Self {
        Self {
            cred_id: cred_id.into(),
            action,
            msp_id,
            tx_id: tx_id.into(),
            timestamp,
            note: String::new(),
            sequence,
            target_msp: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_target(mut self, target: MspId) -> Self {
        self.target_msp = Some(target);
        self
    }

    /// Total order used by the audit trail: timestamp, then sequence.
    pub fn ordering_key(&self) -> (DateTime<Utc>, u64) {
        (self.timestamp, self.sequence)
    }
}
