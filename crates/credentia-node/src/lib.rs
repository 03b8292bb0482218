//! Credentia Node: Hosts the credential registry behind an HTTP API and
//! journals every mutation to RocksDB.

pub mod api;
pub mod config;
pub mod error;
pub mod node;
pub mod state;
pub mod storage;

pub use config::CredentiaConfig;
pub use error::ApiError;
pub use node::CredentiaNode;
pub use state::NodeState;
pub use storage::Storage;
