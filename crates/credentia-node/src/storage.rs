//! RocksDB storage backend for the Credentia node.
//!
//! Implements the registry's [`Journal`]: every commit batch becomes one
//! RocksDB `WriteBatch`, so records and their audit events land together.

use anyhow::Result;
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;

use credentia_core::{AuditEvent, StoredCredential};
use credentia_registry::{CommitBatch, Journal, RegistryError};

/// Column family names for different data types.
const CF_CREDENTIALS: &str = "credentials";
const CF_AUDIT: &str = "audit";

/// Separator inside composite keys. Rejected in MSP ids and credential ids.
const KEY_SEP: u8 = 0;

/// RocksDB-backed storage for the Credentia node.
pub struct Storage {
    db: DB,
}

/// `<holder msp>\0<credID>`: one key namespace per organization.
fn credential_key(record: &StoredCredential) -> Vec<u8> {
    let mut key = Vec::with_capacity(record.holder_msp.as_str().len() + record.cred_id().len() + 1);
    key.extend_from_slice(record.holder_msp.as_str().as_bytes());
    key.push(KEY_SEP);
    key.extend_from_slice(record.cred_id().as_bytes());
    key
}

/// `<credID>\0<sequence>` with the sequence zero-padded so keys sort numerically.
fn audit_key(event: &AuditEvent) -> Vec<u8> {
    let mut key = Vec::with_capacity(event.cred_id.len() + 21);
    key.extend_from_slice(event.cred_id.as_bytes());
    key.push(KEY_SEP);
    key.extend_from_slice(format!("{:020}", event.sequence).as_bytes());
    key
}

impl Storage {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_CREDENTIALS, Options::default()),
            ColumnFamilyDescriptor::new(CF_AUDIT, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self { db })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", name))
    }

    /// Write a batch of records and events atomically.
    pub fn write_batch(&self, batch: &CommitBatch) -> Result<()> {
        let credentials = self.cf(CF_CREDENTIALS)?;
        let audit = self.cf(CF_AUDIT)?;

        let mut wb = WriteBatch::default();
        for record in &batch.records {
            wb.put_cf(credentials, credential_key(record), serde_json::to_vec(record)?);
        }
        for event in &batch.events {
            wb.put_cf(audit, audit_key(event), serde_json::to_vec(event)?);
        }
        self.db.write(wb)?;
        Ok(())
    }

    /// Get one organization's record.
    pub fn get_credential(&self, msp: &str, cred_id: &str) -> Result<Option<StoredCredential>> {
        let mut key = Vec::with_capacity(msp.len() + cred_id.len() + 1);
        key.extend_from_slice(msp.as_bytes());
        key.push(KEY_SEP);
        key.extend_from_slice(cred_id.as_bytes());

        match self.db.get_cf(self.cf(CF_CREDENTIALS)?, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Load every stored record across all organizations.
    pub fn load_credentials(&self) -> Result<Vec<StoredCredential>> {
        let mut records = Vec::new();
        for item in self.db.iterator_cf(self.cf(CF_CREDENTIALS)?, IteratorMode::Start) {
            let (_, value) = item?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }

    /// Load every audit event.
    pub fn load_events(&self) -> Result<Vec<AuditEvent>> {
        let mut events = Vec::new();
        for item in self.db.iterator_cf(self.cf(CF_AUDIT)?, IteratorMode::Start) {
            let (_, value) = item?;
            events.push(serde_json::from_slice(&value)?);
        }
        Ok(events)
    }

    /// Flush memtables to disk.
    pub fn flush(&self) -> Result<()> {
        self.db.flush_cf(self.cf(CF_CREDENTIALS)?)?;
        self.db.flush_cf(self.cf(CF_AUDIT)?)?;
        Ok(())
    }

    /// Overwrite a stored record in place, bypassing the registry.
    #[cfg(test)]
    pub(crate) fn put_raw(&self, record: &StoredCredential) -> Result<()> {
        self.db.put_cf(
            self.cf(CF_CREDENTIALS)?,
            credential_key(record),
            serde_json::to_vec(record)?,
        )?;
        Ok(())
    }
}

impl Journal for Storage {
    fn commit(&self, batch: &CommitBatch) -> Result<(), RegistryError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.write_batch(batch)
            .map_err(|e| RegistryError::Journal(e.to_string()))
    }
}
