use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use credentia_core::{AuditEvent, MspId};

/// Append-only audit log of a single organization.
pub struct OrgAuditLog {
    msp: MspId,
    /// Credential ID → events in append order.
    entries: DashMap<String, Vec<AuditEvent>>,
}

impl OrgAuditLog {
    pub fn new(msp: MspId) -> Self {
        Self {
            msp,
            entries: DashMap::new(),
        }
    }

    pub fn msp(&self) -> &MspId {
        &self.msp
    }

    fn append(&self, event: AuditEvent) {
        self.entries
            .entry(event.cred_id.clone())
            .or_default()
            .push(event);
    }

    /// Events this organization recorded for a credential, in append order.
    pub fn events_for(&self, cred_id: &str) -> Vec<AuditEvent> {
        self.entries
            .get(cred_id)
            .map(|e| e.value().clone())
            .unwrap_or_default()
    }

    /// Total number of events in this log.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The set of all organizations' audit logs, and the assembler that merges
/// them into one ordered trail per credential.
pub struct AuditTrail {
    logs: DashMap<MspId, Arc<OrgAuditLog>>,
    /// Last sequence number handed out.
    sequence: AtomicU64,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self {
            logs: DashMap::new(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Reserve the next sequence number. Strictly increasing, starting at 1.
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Make sure future sequence numbers are above `seen`.
    pub fn observe_sequence(&self, seen: u64) {
        self.sequence.fetch_max(seen, Ordering::SeqCst);
    }

    /// Append an event to the log of the organization that produced it.
    pub fn append(&self, event: AuditEvent) {
        let log = self.log_or_create(&event.msp_id);
        tracing::debug!(
            msp = %event.msp_id,
            credential_id = %event.cred_id,
            action = %event.action,
            sequence = event.sequence,
            "audit event appended"
        );
        log.append(event);
    }

    /// The log of one organization, if it has recorded anything.
    pub fn log(&self, msp: &MspId) -> Option<Arc<OrgAuditLog>> {
        self.logs.get(msp).map(|e| Arc::clone(e.value()))
    }

    fn log_or_create(&self, msp: &MspId) -> Arc<OrgAuditLog> {
        let entry = self
            .logs
            .entry(msp.clone())
            .or_insert_with(|| Arc::new(OrgAuditLog::new(msp.clone())));
        Arc::clone(entry.value())
    }

    /// Every event for `cred_id` across all organizations, ascending by
    /// timestamp with ties broken by sequence. Empty when nothing was
    /// recorded. Reads a snapshot and never mutates.
    pub fn history(&self, cred_id: &str) -> Vec<AuditEvent> {
        let logs: Vec<Arc<OrgAuditLog>> =
            self.logs.iter().map(|e| Arc::clone(e.value())).collect();

        let mut merged: Vec<AuditEvent> = logs
            .iter()
            .flat_map(|log| log.events_for(cred_id))
            .collect();
        merged.sort_by_key(|e| e.ordering_key());
        merged
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new()
    }
}
