//! Credentia Core: Fundamental types, canonical encoding, errors, and the
//! credential lifecycle for cross-organization academic credentials.

pub mod audit;
pub mod canonical;
pub mod credential_state;
pub mod error;
pub mod record;
pub mod types;

pub use audit::{AuditAction, AuditEvent};
pub use canonical::{canonicalize, canonicalize_raw, CanonicalString};
pub use credential_state::{CredentialState, CredentialStateMachine, LifecycleOp};
pub use error::{CoreError, ErrorKind};
pub use record::{ShareRecord, StoredCredential};
pub use types::{validate_cred_id, CredentialFields, MspId, RawCredentialFields};
