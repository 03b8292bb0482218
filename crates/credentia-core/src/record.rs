use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credential_state::CredentialState;
use crate::types::{CredentialFields, MspId};

/// A credential as held in one organization's private partition.
///
/// The issuing organization holds the original (`holder_msp == owner_msp`);
/// every organization it was shared with holds a read-only view carrying
/// the same fields and the same `stored_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    /// The committed fields.
    pub credential: CredentialFields,
    /// SHA-256 commitment computed once at issuance, lowercase hex.
    #[serde(rename = "storedHash")]
    pub stored_hash: String,
    /// Lifecycle state as seen by this partition.
    pub state: CredentialState,
    /// Organization that issued the credential.
    #[serde(rename = "ownerMSP")]
    pub owner_msp: MspId,
    /// Organization whose partition holds this record.
    #[serde(rename = "holderMSP")]
    pub holder_msp: MspId,
    /// Transaction that issued the credential.
    #[serde(rename = "issueTxID")]
    pub issue_tx_id: String,
    /// Issuance time.
    #[serde(rename = "issuedAt")]
    pub issued_at: DateTime<Utc>,
    /// Transaction that revoked the credential, once revoked.
    #[serde(rename = "revokeTxID", default, skip_serializing_if = "Option::is_none")]
    pub revoke_tx_id: Option<String>,
    /// Shares made by the issuer. Always empty on a shared view.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shares: Vec<ShareRecord>,
}

impl StoredCredential {
    pub fn cred_id(&self) -> &str {
        &self.credential.cred_id
    }

    /// Whether this record is a copy held by a non-issuing organization.
    pub fn is_shared_view(&self) -> bool {
        self.holder_msp != self.owner_msp
    }

    /// Build the read-only view handed to `target`. Fields and commitment are
    /// copied as stored, never recomputed.
    pub fn view_for(&self, target: &MspId) -> StoredCredential {
        StoredCredential {
            credential: self.credential.clone(),
            stored_hash: self.stored_hash.clone(),
            state: CredentialState::Shared,
            owner_msp: self.owner_msp.clone(),
            holder_msp: target.clone(),
            issue_tx_id: self.issue_tx_id.clone(),
            issued_at: self.issued_at,
            revoke_tx_id: None,
            shares: Vec::new(),
        }
    }

    /// Distinct organizations this credential has been shared with, in
    /// first-share order.
    pub fn share_targets(&self) -> Vec<MspId> {
        let mut targets: Vec<MspId> = Vec::new();
        for share in &self.shares {
            if !targets.contains(&share.target_msp) {
                targets.push(share.target_msp.clone());
            }
        }
        targets
    }
}

/// One act of sharing a credential with another organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    #[serde(rename = "credID")]
    pub cred_id: String,
    #[serde(rename = "sourceMSP")]
    pub source_msp: MspId,
    #[serde(rename = "targetMSP")]
    pub target_msp: MspId,
    #[serde(rename = "txID")]
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
}
