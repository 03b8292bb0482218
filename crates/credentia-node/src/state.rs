//! Shared state handed to every HTTP handler.

use std::sync::Arc;
use std::time::Instant;

use credentia_core::MspId;
use credentia_registry::CredentialRegistry;

pub struct NodeState {
    /// The credential registry serving all organizations.
    pub registry: Arc<CredentialRegistry>,
    /// Organization assumed when a request carries no `x-msp-id`.
    pub default_msp: MspId,
    /// When the node started.
    pub start_time: Instant,
}

impl NodeState {
    pub fn new(registry: Arc<CredentialRegistry>, default_msp: MspId) -> Self {
        Self {
            registry,
            default_msp,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
