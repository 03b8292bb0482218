//! Credential store.
//!
//! Owns every organization's partition, the per-credential locks, and the
//! audit trail. Mutations run under the credential's lock, are committed to
//! the journal as one batch, and only then become visible.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

use credentia_core::{
    validate_cred_id, AuditAction, AuditEvent, CredentialFields, CredentialState,
    CredentialStateMachine, LifecycleOp, MspId, ShareRecord, StoredCredential,
};
use credentia_crypto::{digest_fields, is_digest_hex};

use crate::audit::AuditTrail;
use crate::clock::{Clock, SystemClock};
use crate::error::RegistryError;
use crate::journal::{CommitBatch, Journal, NullJournal};
use crate::partition::Partition;
use crate::verifier::IntegrityReport;

/// Registry tuning.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Upper bound on waiting for a credential's lock.
    pub lock_timeout: Duration,
    /// Append a VERIFY event to the caller's log on every hash verification.
    pub record_verifications: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            record_verifications: false,
        }
    }
}

/// Result of a successful issuance.
#[derive(Debug, Clone, Serialize)]
pub struct IssueReceipt {
    #[serde(flatten)]
    pub record: StoredCredential,
    #[serde(rename = "txID")]
    pub tx_id: String,
}

/// Result of a revocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevokeAck {
    #[serde(rename = "credID")]
    pub cred_id: String,
    /// The transaction that made the credential terminal.
    #[serde(rename = "txID")]
    pub tx_id: String,
    /// True when the credential was already revoked before this call.
    #[serde(rename = "alreadyRevoked")]
    pub already_revoked: bool,
}

/// What a [`CredentialRegistry::restore`] loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub records: usize,
    pub events: usize,
    pub organizations: usize,
}

/// Cross-organization credential registry.
pub struct CredentialRegistry {
    config: RegistryConfig,
    partitions: DashMap<MspId, Arc<Partition>>,
    locks: DashMap<String, Arc<Mutex<()>>>,
    audit: AuditTrail,
    journal: Arc<dyn Journal>,
    clock: Arc<dyn Clock>,
}

/// Held credential lock. Dropping it releases the mutex and removes the
/// map entry once no other task holds or waits on it.
struct CredentialLock<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    cred_id: String,
}

impl Drop for CredentialLock<'_> {
    fn drop(&mut self) {
        self.guard.take();
        release_lock_entry(self.locks, &self.cred_id);
    }
}

/// Entries are cloned out under the shard lock, so a count of one means
/// nobody else can be using this mutex.
fn release_lock_entry(locks: &DashMap<String, Arc<Mutex<()>>>, cred_id: &str) {
    locks.remove_if(cred_id, |_, mutex| Arc::strong_count(mutex) == 1);
}

impl CredentialRegistry {
    /// Create an in-memory registry on the system clock.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            partitions: DashMap::new(),
            locks: DashMap::new(),
            audit: AuditTrail::new(),
            journal: Arc::new(NullJournal),
            clock: Arc::new(SystemClock),
        }
    }

    /// Persist every mutation through `journal` before applying it.
    pub fn with_journal(mut self, journal: Arc<dyn Journal>) -> Self {
        self.journal = journal;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The partition of one organization, if it holds anything.
    pub fn partition(&self, msp: &MspId) -> Option<Arc<Partition>> {
        self.partitions.get(msp).map(|e| Arc::clone(e.value()))
    }

    /// Organizations with a partition, sorted.
    pub fn organizations(&self) -> Vec<MspId> {
        let mut orgs: Vec<MspId> = self.partitions.iter().map(|e| e.key().clone()).collect();
        orgs.sort();
        orgs
    }

    pub fn audit_trail(&self) -> &AuditTrail {
        &self.audit
    }

    fn partition_or_create(&self, msp: &MspId) -> Arc<Partition> {
        let entry = self
            .partitions
            .entry(msp.clone())
            .or_insert_with(|| Arc::new(Partition::new(msp.clone())));
        Arc::clone(entry.value())
    }

    /// Acquire the lock of one credential id, waiting at most `lock_timeout`.
    async fn lock(&self, cred_id: &str) -> Result<CredentialLock<'_>, RegistryError> {
        let mutex = Arc::clone(&self.locks.entry(cred_id.to_string()).or_default());
        let acquired = tokio::time::timeout(self.config.lock_timeout, mutex.lock_owned()).await;
        match acquired {
            Ok(guard) => Ok(CredentialLock {
                guard: Some(guard),
                locks: &self.locks,
                cred_id: cred_id.to_string(),
            }),
            Err(_) => {
                release_lock_entry(&self.locks, cred_id);
                tracing::warn!(
                    credential_id = %cred_id,
                    waited_ms = self.config.lock_timeout.as_millis() as u64,
                    "credential lock wait timed out"
                );
                Err(RegistryError::Timeout {
                    cred_id: cred_id.to_string(),
                    waited: self.config.lock_timeout,
                })
            }
        }
    }

    #[cfg(test)]
    fn lock_entries(&self) -> usize {
        self.locks.len()
    }

    pub(crate) fn lookup(
        &self,
        caller: &MspId,
        cred_id: &str,
    ) -> Result<StoredCredential, RegistryError> {
        validate_cred_id(cred_id)?;
        self.partition(caller)
            .and_then(|p| p.get(cred_id))
            .ok_or_else(|| RegistryError::NotFound {
                cred_id: cred_id.to_string(),
                msp: caller.clone(),
            })
    }

    fn new_tx_id() -> String {
        uuid::Uuid::now_v7().to_string()
    }

    fn event(
        &self,
        cred_id: &str,
        action: AuditAction,
        msp: &MspId,
        tx_id: &str,
        now: DateTime<Utc>,
    ) -> AuditEvent {
        AuditEvent::new(
            cred_id,
            action,
            msp.clone(),
            tx_id,
            now,
            self.audit.next_sequence(),
        )
    }

    /// Journal the batch, then make it visible.
    fn commit(&self, batch: CommitBatch) -> Result<(), RegistryError> {
        self.journal.commit(&batch).map_err(|e| {
            tracing::error!(error = %e, "journal rejected commit batch");
            e
        })?;
        for record in batch.records {
            self.partition_or_create(&record.holder_msp).put(record);
        }
        for event in batch.events {
            self.audit.append(event);
        }
        Ok(())
    }

    /// Issue a credential into the caller's partition.
    ///
    /// The commitment is computed here from the validated fields; any hash a
    /// client supplied has already been discarded. Fails with `Conflict` if
    /// the id already exists in the caller's partition.
    pub async fn issue(
        &self,
        caller: &MspId,
        fields: CredentialFields,
    ) -> Result<IssueReceipt, RegistryError> {
        validate_cred_id(&fields.cred_id)?;
        let _guard = self.lock(&fields.cred_id).await?;

        if self
            .partition(caller)
            .is_some_and(|p| p.contains(&fields.cred_id))
        {
            return Err(RegistryError::Conflict {
                cred_id: fields.cred_id.clone(),
                msp: caller.clone(),
            });
        }

        let now = self.clock.now();
        let tx_id = Self::new_tx_id();
        let stored_hash = digest_fields(&fields);
        let record = StoredCredential {
            credential: fields,
            stored_hash,
            state: CredentialStateMachine::initial(),
            owner_msp: caller.clone(),
            holder_msp: caller.clone(),
            issue_tx_id: tx_id.clone(),
            issued_at: now,
            revoke_tx_id: None,
            shares: Vec::new(),
        };
        let event = self
            .event(record.cred_id(), AuditAction::Issue, caller, &tx_id, now)
            .with_note(format!("issued by {caller}"));

        self.commit(CommitBatch {
            records: vec![record.clone()],
            events: vec![event],
        })?;

        tracing::info!(
            credential_id = %record.cred_id(),
            issuer = %caller,
            tx_id = %tx_id,
            "credential issued"
        );

        Ok(IssueReceipt { record, tx_id })
    }

    /// Copy a credential from the caller's partition into `target`'s.
    ///
    /// Only the issuing organization may share. The copy carries the
    /// stored fields and commitment unchanged.
    pub async fn share(
        &self,
        caller: &MspId,
        cred_id: &str,
        target: &MspId,
    ) -> Result<ShareRecord, RegistryError> {
        validate_cred_id(cred_id)?;
        if target == caller {
            return Err(RegistryError::InvalidField(format!(
                "targetMSP: cannot share credential {cred_id} with its own holder {caller}"
            )));
        }

        let _guard = self.lock(cred_id).await?;
        let record = self.lookup(caller, cred_id)?;

        if record.is_shared_view() {
            return Err(RegistryError::InvalidState(format!(
                "credential {cred_id} held by {caller} is a shared view; only {} may share it",
                record.owner_msp
            )));
        }
        let state = CredentialStateMachine::transition(record.state, LifecycleOp::Share)?;

        // The target may hold its own credential under the same id.
        if let Some(existing) = self.partition(target).and_then(|p| p.get(cred_id)) {
            if existing.owner_msp != *caller {
                tracing::warn!(
                    credential_id = %cred_id,
                    source = %caller,
                    target = %target,
                    owner = %existing.owner_msp,
                    "share rejected: target already holds this id"
                );
                return Err(RegistryError::Conflict {
                    cred_id: cred_id.to_string(),
                    msp: target.clone(),
                });
            }
        }

        let now = self.clock.now();
        let tx_id = Self::new_tx_id();
        let share = ShareRecord {
            cred_id: cred_id.to_string(),
            source_msp: caller.clone(),
            target_msp: target.clone(),
            tx_id: tx_id.clone(),
            timestamp: now,
        };

        let view = record.view_for(target);
        let mut updated = record;
        updated.state = state;
        updated.shares.push(share.clone());

        let event = self
            .event(cred_id, AuditAction::Share, caller, &tx_id, now)
            .with_target(target.clone())
            .with_note(format!("shared with {target}"));

        self.commit(CommitBatch {
            records: vec![updated, view],
            events: vec![event],
        })?;

        tracing::info!(
            credential_id = %cred_id,
            source = %caller,
            target = %target,
            tx_id = %tx_id,
            "credential shared"
        );

        Ok(share)
    }

    /// Revoke a credential. Terminal and idempotent: revoking an already
    /// revoked credential returns the original revocation and records
    /// nothing new.
    ///
    /// The new state is written to the issuer's record and to every shared
    /// view in the same batch.
    pub async fn revoke(&self, caller: &MspId, cred_id: &str) -> Result<RevokeAck, RegistryError> {
        validate_cred_id(cred_id)?;
        let _guard = self.lock(cred_id).await?;
        let record = self.lookup(caller, cred_id)?;

        if record.is_shared_view() {
            return Err(RegistryError::InvalidState(format!(
                "credential {cred_id} held by {caller} is a shared view; only {} may revoke it",
                record.owner_msp
            )));
        }

        if record.state == CredentialState::Revoked {
            tracing::info!(
                credential_id = %cred_id,
                caller = %caller,
                "credential already revoked"
            );
            return Ok(RevokeAck {
                cred_id: cred_id.to_string(),
                tx_id: record.revoke_tx_id.unwrap_or_default(),
                already_revoked: true,
            });
        }

        let state = CredentialStateMachine::transition(record.state, LifecycleOp::Revoke)?;
        let now = self.clock.now();
        let tx_id = Self::new_tx_id();

        let mut records = Vec::new();
        for target in record.share_targets() {
            if let Some(mut view) = self.partition(&target).and_then(|p| p.get(cred_id)) {
                view.state = state;
                view.revoke_tx_id = Some(tx_id.clone());
                records.push(view);
            }
        }
        let mut updated = record;
        updated.state = state;
        updated.revoke_tx_id = Some(tx_id.clone());
        records.insert(0, updated);

        let event = self
            .event(cred_id, AuditAction::Revoke, caller, &tx_id, now)
            .with_note(format!("revoked by {caller}"));

        self.commit(CommitBatch {
            records,
            events: vec![event],
        })?;

        tracing::info!(
            credential_id = %cred_id,
            issuer = %caller,
            tx_id = %tx_id,
            "credential revoked"
        );

        Ok(RevokeAck {
            cred_id: cred_id.to_string(),
            tx_id,
            already_revoked: false,
        })
    }

    /// All audit events for a credential across organizations, ordered by
    /// timestamp then sequence. Empty if nothing was ever recorded.
    pub fn history(&self, cred_id: &str) -> Result<Vec<AuditEvent>, RegistryError> {
        validate_cred_id(cred_id)?;
        Ok(self.audit.history(cred_id))
    }

    pub(crate) fn record_verification(
        &self,
        caller: &MspId,
        report: &IntegrityReport,
    ) -> Result<(), RegistryError> {
        let now = self.clock.now();
        let tx_id = Self::new_tx_id();
        let note = if report.is_hash_valid {
            "hash valid".to_string()
        } else {
            "hash mismatch".to_string()
        };
        let event = self
            .event(&report.cred_id, AuditAction::Verify, caller, &tx_id, now)
            .with_note(note);
        self.commit(CommitBatch {
            records: Vec::new(),
            events: vec![event],
        })
    }

    /// Load previously journaled state into an empty registry.
    ///
    /// Records are taken as stored; commitments are not recomputed, so a
    /// record altered at rest shows up as a hash mismatch on verification.
    pub fn restore(
        &self,
        records: impl IntoIterator<Item = StoredCredential>,
        events: impl IntoIterator<Item = AuditEvent>,
    ) -> RestoreSummary {
        let mut summary = RestoreSummary::default();

        for record in records {
            if !is_digest_hex(&record.stored_hash) {
                tracing::warn!(
                    credential_id = %record.cred_id(),
                    holder = %record.holder_msp,
                    "restored record has a malformed commitment"
                );
            }
            self.partition_or_create(&record.holder_msp).put(record);
            summary.records += 1;
        }
        for event in events {
            self.audit.observe_sequence(event.sequence);
            self.audit.append(event);
            summary.events += 1;
        }
        summary.organizations = self.partitions.len();

        tracing::info!(
            records = summary.records,
            events = summary.events,
            organizations = summary.organizations,
            "registry restored"
        );

        summary
    }
}

impl Default for CredentialRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
