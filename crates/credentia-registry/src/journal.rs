//! The write seam between the registry and durable storage.
//!
//! Every mutation is expressed as one [`CommitBatch`] and handed to the
//! journal while the credential's lock is held. Only after the journal
//! accepts the batch does the registry make it visible in memory, so a
//! failed commit leaves no trace.

use credentia_core::{AuditEvent, StoredCredential};

use crate::error::RegistryError;

/// Records and audit events that must become durable together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitBatch {
    /// Records to upsert, each keyed by `(holder_msp, cred_id)`.
    pub records: Vec<StoredCredential>,
    /// Events to append, each to the log of its `msp_id`.
    pub events: Vec<AuditEvent>,
}

impl CommitBatch {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.events.is_empty()
    }
}

/// Atomic persistence for commit batches.
pub trait Journal: Send + Sync {
    /// Persist the whole batch or nothing.
    fn commit(&self, batch: &CommitBatch) -> Result<(), RegistryError>;
}

/// Journal for purely in-memory registries.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullJournal;

impl Journal for NullJournal {
    fn commit(&self, _batch: &CommitBatch) -> Result<(), RegistryError> {
        Ok(())
    }
}
