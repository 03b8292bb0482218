//! Credentia Registry: Per-organization credential partitions, the
//! verification engine, and the cross-organization audit trail.

pub mod audit;
pub mod clock;
pub mod error;
pub mod journal;
pub mod partition;
pub mod registry;
pub mod verifier;

pub use audit::{AuditTrail, OrgAuditLog};
pub use clock::{Clock, SystemClock};
pub use error::RegistryError;
pub use journal::{CommitBatch, Journal, NullJournal};
pub use partition::Partition;
pub use registry::{CredentialRegistry, IssueReceipt, RegistryConfig, RestoreSummary, RevokeAck};
pub use verifier::{verify_record, IntegrityReport, VerificationCheck};
