//! The Credentia node orchestrator.
//!
//! Opens the RocksDB journal, restores the registry from it, and serves the
//! HTTP API in a background task until shut down.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use credentia_core::MspId;
use credentia_registry::CredentialRegistry;

use crate::config::CredentiaConfig;
use crate::state::NodeState;
use crate::storage::Storage;

/// A running registry node.
pub struct CredentiaNode {
    /// Node configuration.
    config: CredentiaConfig,
    /// Organization used for requests without an `x-msp-id` header.
    default_msp: MspId,
    /// Persistent journal, open once started.
    storage: Option<Arc<Storage>>,
    /// The registry, restored from storage on start.
    registry: Option<Arc<CredentialRegistry>>,
    /// Address the API is bound to.
    api_addr: Option<SocketAddr>,
    /// Signals the API server to stop.
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// The API server task.
    api_task: Option<JoinHandle<()>>,
}

impl CredentiaNode {
    /// Create a node with the given config. Nothing is opened until `start`.
    pub fn new(config: CredentiaConfig) -> Result<Self> {
        let default_msp = config.default_msp()?;
        tracing::info!(default_msp = %default_msp, "Credentia node created");

        Ok(Self {
            config,
            default_msp,
            storage: None,
            registry: None,
            api_addr: None,
            shutdown_tx: None,
            api_task: None,
        })
    }

    /// Open storage, restore the registry, and start the HTTP API.
    pub async fn start(&mut self) -> Result<()> {
        tracing::info!("starting Credentia node");

        let storage = Arc::new(Storage::open(&self.config.storage.data_dir)?);
        tracing::info!(path = %self.config.storage.data_dir.display(), "storage initialized");

        let registry = CredentialRegistry::new(self.config.registry_config())
            .with_journal(storage.clone());
        let records = storage.load_credentials()?;
        let events = storage.load_events()?;
        registry.restore(records, events);
        let registry = Arc::new(registry);

        let node_state = Arc::new(NodeState::new(registry.clone(), self.default_msp.clone()));

        let listener = TcpListener::bind(self.config.api_addr()).await?;
        let api_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let api_task = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = crate::api::start_api_server(listener, node_state, shutdown).await {
                tracing::error!(error = %e, "HTTP API server error");
            }
        });

        self.storage = Some(storage);
        self.registry = Some(registry);
        self.api_addr = Some(api_addr);
        self.shutdown_tx = Some(shutdown_tx);
        self.api_task = Some(api_task);

        Ok(())
    }

    /// Run until the API server exits.
    pub async fn run(&mut self) -> Result<()> {
        let task = self
            .api_task
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;
        // Keep the handle if this future is dropped, so shutdown can join it.
        let result = task.await;
        self.api_task = None;
        result?;
        Ok(())
    }

    /// Stop the API server and flush storage.
    pub async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("shutting down Credentia node");

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.api_task.take() {
            task.await?;
        }
        self.registry = None;
        if let Some(storage) = self.storage.take() {
            storage.flush()?;
        }

        tracing::info!("Credentia node shut down");
        Ok(())
    }

    /// The registry, once started.
    pub fn registry(&self) -> Option<Arc<CredentialRegistry>> {
        self.registry.clone()
    }

    /// Bound API address, once started.
    pub fn api_addr(&self) -> Option<SocketAddr> {
        self.api_addr
    }

    pub fn default_msp(&self) -> &MspId {
        &self.default_msp
    }

    pub fn config(&self) -> &CredentiaConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credentia_core::{CredentialFields, CredentialState};

    fn config(dir: &std::path::Path) -> CredentiaConfig {
        let mut config = CredentiaConfig::default();
        config.storage.data_dir = dir.to_path_buf();
        config.api.port = 0;
        config
    }

    fn fields() -> CredentialFields {
        CredentialFields::new(
            "CRED3001",
            "S-301",
            "Asha Patel",
            "UniA",
            "B.Tech",
            "8.8",
            "2025-10-01",
        )
        .unwrap()
    }

    #[test]
    fn test_node_creation() {
        let node = CredentiaNode::new(CredentiaConfig::default()).unwrap();
        assert_eq!(node.default_msp().as_str(), "Org1MSP");
        assert!(node.registry().is_none());
    }

    #[test]
    fn test_node_rejects_blank_default_msp() {
        let mut config = CredentiaConfig::default();
        config.organization.default_msp = String::new();
        assert!(CredentiaNode::new(config).is_err());
    }

    #[tokio::test]
    async fn test_run_before_start_fails() {
        let mut node = CredentiaNode::new(CredentiaConfig::default()).unwrap();
        assert!(node.run().await.is_err());
    }

    #[tokio::test]
    async fn test_node_start_and_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let mut node = CredentiaNode::new(config(dir.path())).unwrap();
        node.start().await.expect("start failed");
        assert!(node.api_addr().is_some_and(|a| a.port() != 0));
        node.shutdown().await.expect("shutdown failed");
        assert!(node.registry().is_none());
    }

    #[tokio::test]
    async fn test_state_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let org1 = MspId::new("Org1MSP").unwrap();
        let org2 = MspId::new("Org2MSP").unwrap();

        {
            let mut node = CredentiaNode::new(config(dir.path())).unwrap();
            node.start().await.unwrap();
            let registry = node.registry().unwrap();
            registry.issue(&org1, fields()).await.unwrap();
            registry.share(&org1, "CRED3001", &org2).await.unwrap();
            drop(registry);
            node.shutdown().await.unwrap();
        }

        let mut node = CredentiaNode::new(config(dir.path())).unwrap();
        node.start().await.unwrap();
        let registry = node.registry().unwrap();

        let view = registry.view(&org2, "CRED3001").unwrap();
        assert_eq!(view.state, CredentialState::Shared);
        assert!(registry.verify_hash(&org2, "CRED3001").unwrap().is_hash_valid);

        registry.revoke(&org1, "CRED3001").await.unwrap();
        let history = registry.history("CRED3001").unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].sequence < w[1].sequence));

        drop(registry);
        node.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_tampered_record_detected_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        let org1 = MspId::new("Org1MSP").unwrap();

        {
            let mut node = CredentiaNode::new(config(dir.path())).unwrap();
            node.start().await.unwrap();
            node.registry()
                .unwrap()
                .issue(&org1, fields())
                .await
                .unwrap();
            node.shutdown().await.unwrap();
        }

        {
            let storage = Storage::open(dir.path()).unwrap();
            let mut record = storage.get_credential("Org1MSP", "CRED3001").unwrap().unwrap();
            record.credential.gpa = "9.9".into();
            storage.put_raw(&record).unwrap();
            storage.flush().unwrap();
        }

        let mut node = CredentiaNode::new(config(dir.path())).unwrap();
        node.start().await.unwrap();
        let report = node
            .registry()
            .unwrap()
            .verify_hash(&org1, "CRED3001")
            .unwrap();
        assert!(!report.is_hash_valid);
        assert_ne!(report.stored_hash, report.computed_hash);
        node.shutdown().await.unwrap();
    }
}
