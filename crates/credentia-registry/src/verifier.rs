//! Verification engine.
//!
//! Recomputes the SHA-256 commitment of a stored credential and compares it
//! with the value captured at issuance. A mismatch is a finding reported in
//! the result, never an error. Revocation is reported alongside hash
//! validity and does not change it.

use serde::Serialize;

use credentia_core::{
    CredentialFields, CredentialState, ErrorKind, LifecycleOp, MspId, StoredCredential,
};
use credentia_crypto::{digest_fields, is_digest_hex};

use crate::error::RegistryError;
use crate::registry::CredentialRegistry;

/// A single verification check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationCheck {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl VerificationCheck {
    fn new(name: &str, passed: bool, detail: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed,
            detail,
        }
    }
}

/// Outcome of a hash verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    #[serde(rename = "credID")]
    pub cred_id: String,
    #[serde(rename = "isHashValid")]
    pub is_hash_valid: bool,
    #[serde(rename = "storedHash")]
    pub stored_hash: String,
    #[serde(rename = "computedHash")]
    pub computed_hash: String,
    pub state: CredentialState,
    #[serde(rename = "ownerMSP")]
    pub owner_msp: MspId,
    #[serde(rename = "holderMSP")]
    pub holder_msp: MspId,
    /// `HashMismatch` when the stored fields no longer match their commitment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finding: Option<ErrorKind>,
    pub checks: Vec<VerificationCheck>,
    pub credential: CredentialFields,
}

impl IntegrityReport {
    pub fn is_revoked(&self) -> bool {
        self.state == CredentialState::Revoked
    }
}

/// Verify a stored record. Pure; reads nothing but the record.
pub fn verify_record(record: &StoredCredential) -> IntegrityReport {
    let computed_hash = digest_fields(&record.credential);
    let is_hash_valid = computed_hash == record.stored_hash;

    let mut checks = Vec::with_capacity(4);
    checks.push(VerificationCheck::new(
        "record_present",
        true,
        Some(format!("held by {}", record.holder_msp)),
    ));
    checks.push(VerificationCheck::new(
        "stored_hash_well_formed",
        is_digest_hex(&record.stored_hash),
        None,
    ));
    checks.push(VerificationCheck::new(
        "hash_matches",
        is_hash_valid,
        (!is_hash_valid).then(|| {
            format!(
                "stored {} but fields hash to {}",
                record.stored_hash, computed_hash
            )
        }),
    ));
    let revoked = record.state == CredentialState::Revoked;
    checks.push(VerificationCheck::new(
        "not_revoked",
        !revoked,
        revoked.then(|| {
            match &record.revoke_tx_id {
                Some(tx) => format!("revoked by {} in {}", record.owner_msp, tx),
                None => format!("revoked by {}", record.owner_msp),
            }
        }),
    ));

    if !is_hash_valid {
        tracing::warn!(
            credential_id = %record.cred_id(),
            holder = %record.holder_msp,
            "stored credential does not match its commitment"
        );
    }

    IntegrityReport {
        cred_id: record.cred_id().to_string(),
        is_hash_valid,
        stored_hash: record.stored_hash.clone(),
        computed_hash,
        state: record.state,
        owner_msp: record.owner_msp.clone(),
        holder_msp: record.holder_msp.clone(),
        finding: (!is_hash_valid).then_some(ErrorKind::HashMismatch),
        checks,
        credential: record.credential.clone(),
    }
}

impl CredentialRegistry {
    /// Return the caller's view of a credential, whatever its state.
    pub fn view(&self, caller: &MspId, cred_id: &str) -> Result<StoredCredential, RegistryError> {
        let record = self.lookup(caller, cred_id)?;
        // Reads are valid in every state; this only asserts it.
        credentia_core::CredentialStateMachine::transition(record.state, LifecycleOp::Verify)?;
        Ok(record)
    }

    /// Recompute the commitment of the caller's copy and compare it with the
    /// stored one. Takes no credential lock.
    pub fn verify_hash(
        &self,
        caller: &MspId,
        cred_id: &str,
    ) -> Result<IntegrityReport, RegistryError> {
        let record = self.view(caller, cred_id)?;
        let report = verify_record(&record);

        tracing::info!(
            credential_id = %cred_id,
            caller = %caller,
            valid = report.is_hash_valid,
            state = %report.state,
            "credential verified"
        );

        if self.config().record_verifications {
            self.record_verification(caller, &report)?;
        }

        Ok(report)
    }
}
