use std::fmt;

use serde::{Deserialize, Serialize};

use crate::credential_state::{CredentialState, LifecycleOp};

/// Machine-readable classification shared by every layer, from the
/// state machine up to the HTTP error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed or missing input.
    InvalidField,
    /// Duplicate issuance.
    Conflict,
    /// Unknown credential id in the queried partition.
    NotFound,
    /// Illegal lifecycle transition.
    InvalidState,
    /// Verification finding: recomputed digest differs from the stored one.
    HashMismatch,
    /// The store could not be reached within its bound. Retryable.
    Timeout,
    /// Unexpected failure.
    Internal,
}

impl ErrorKind {
    /// Whether a caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidField => "InvalidField",
            Self::Conflict => "Conflict",
            Self::NotFound => "NotFound",
            Self::InvalidState => "InvalidState",
            Self::HashMismatch => "HashMismatch",
            Self::Timeout => "Timeout",
            Self::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("operation {op} not permitted on a credential in state {from}")]
    InvalidStateTransition {
        from: CredentialState,
        op: LifecycleOp,
    },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidStateTransition { .. } => ErrorKind::InvalidState,
            Self::MissingField(_) | Self::InvalidField { .. } => ErrorKind::InvalidField,
        }
    }
}
