use std::fmt;

use crate::error::CoreError;

/// The states of a credential lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CredentialState {
    /// Credential has been issued and committed by its university.
    Issued,
    /// Credential has been shared with at least one other organization.
    Shared,
    /// Credential has been permanently revoked. Final state.
    Revoked,
}

impl CredentialState {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Revoked)
    }
}

impl fmt::Display for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issued => write!(f, "Issued"),
            Self::Shared => write!(f, "Shared"),
            Self::Revoked => write!(f, "Revoked"),
        }
    }
}

/// Operations that are checked against the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    /// University commits a new credential.
    Issue,
    /// Credential view is copied to another organization.
    Share,
    /// Integrity check by any holder. Read-only.
    Verify,
    /// Audit trail read. Read-only.
    History,
    /// University permanently withdraws the credential.
    Revoke,
}

impl LifecycleOp {
    /// Whether the operation leaves the state untouched.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Verify | Self::History)
    }
}

impl fmt::Display for LifecycleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue => write!(f, "Issue"),
            Self::Share => write!(f, "Share"),
            Self::Verify => write!(f, "Verify"),
            Self::History => write!(f, "History"),
            Self::Revoke => write!(f, "Revoke"),
        }
    }
}

/// Manages credential state transitions.
///
/// Valid transitions:
/// - (none) → Issued (Issue)
/// - Issued → Shared (Share)
/// - Shared → Shared (Share, once per additional organization)
/// - Issued → Revoked (Revoke)
/// - Shared → Revoked (Revoke)
/// - any → same state (Verify, History)
pub struct CredentialStateMachine;

impl CredentialStateMachine {
    /// State of a freshly issued credential.
    pub fn initial() -> CredentialState {
        CredentialState::Issued
    }

    /// Attempt a state transition for an operation on an existing credential.
    /// Returns the new state on success, or an error for invalid transitions.
    pub fn transition(
        current: CredentialState,
        op: LifecycleOp,
    ) -> Result<CredentialState, CoreError> {
        let new_state = match (current, op) {
            (state, op) if op.is_read_only() => state,

            (CredentialState::Issued | CredentialState::Shared, LifecycleOp::Share) => {
                CredentialState::Shared
            }
            (CredentialState::Issued | CredentialState::Shared, LifecycleOp::Revoke) => {
                CredentialState::Revoked
            }

            // Issue only applies to an absent credential; Revoked is terminal.
            _ => {
                return Err(CoreError::InvalidStateTransition { from: current, op });
            }
        };

        if new_state != current {
            tracing::debug!(
                from = %current,
                to = %new_state,
                op = %op,
                "credential state transition"
            );
        }

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: CredentialState, op: LifecycleOp) -> bool {
        Self::transition(current, op).is_ok()
    }
}
