use std::time::Duration;

use credentia_core::{CoreError, ErrorKind, MspId};

/// Credential registry errors.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid field: {0}")]
    InvalidField(String),

    #[error("credential {cred_id} already exists in {msp}")]
    Conflict { cred_id: String, msp: MspId },

    #[error("credential {cred_id} not found in {msp} partition")]
    NotFound { cred_id: String, msp: MspId },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("timed out after {waited:?} waiting for credential {cred_id}")]
    Timeout { cred_id: String, waited: Duration },

    #[error("journal commit failed: {0}")]
    Journal(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidField(_) => ErrorKind::InvalidField,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Journal(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

impl From<CoreError> for RegistryError {
    fn from(err: CoreError) -> Self {
        match err.kind() {
            ErrorKind::InvalidState => Self::InvalidState(err.to_string()),
            ErrorKind::InvalidField => Self::InvalidField(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}
