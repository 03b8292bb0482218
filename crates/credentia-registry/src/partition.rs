use dashmap::DashMap;

use credentia_core::{MspId, StoredCredential};

/// One organization's private credential store.
///
/// Partitions never reference each other: a credential reaches another
/// organization only as an explicit copy written by a share.
pub struct Partition {
    /// Organization that owns this partition.
    msp: MspId,
    /// Credential ID → record.
    records: DashMap<String, StoredCredential>,
}

impl Partition {
    /// Create an empty partition.
    pub fn new(msp: MspId) -> Self {
        Self {
            msp,
            records: DashMap::new(),
        }
    }

    /// Get the owning organization.
    pub fn msp(&self) -> &MspId {
        &self.msp
    }

    /// Get a snapshot of a record by credential ID.
    pub fn get(&self, cred_id: &str) -> Option<StoredCredential> {
        self.records.get(cred_id).map(|e| e.clone())
    }

    pub fn contains(&self, cred_id: &str) -> bool {
        self.records.contains_key(cred_id)
    }

    /// List all credential IDs, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of records in the partition.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the partition is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Upsert a record. Callers must hold the credential's lock.
    pub(crate) fn put(&self, record: StoredCredential) {
        debug_assert_eq!(record.holder_msp, self.msp);
        let id = record.cred_id().to_string();
        self.records.insert(id.clone(), record);
        tracing::debug!(msp = %self.msp, credential_id = %id, "record written to partition");
    }
}
