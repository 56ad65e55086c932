//! Approval Core Library
//!
//! Coordination protocol for sequential multi-party approvals: the request
//! coordinator, the dispatch node, the notification fan-out and the clients
//! they use to reach each other.

pub mod clients;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod notification;
pub mod relay;
pub mod store;
pub mod workflow;

// Re-export main types for easy access
pub use config::{ApprovalConfig, StoreBackend};
pub use error::{ApprovalError, Result};

pub use clients::{
    directory_from_config, EmployeeDirectory, GrpcCoordinatorClient, GrpcDispatchClient, HttpNotifier,
};
pub use dispatch::{DispatchNode, DispatchQueue};
pub use notification::{ChannelRegistry, ConnectionId};
pub use store::{FileWorkflowStore, MemoryWorkflowStore, WorkflowStore};
pub use workflow::{Coordinator, DispatchSink, Notifier, ResultRelay};

use std::sync::Arc;

/// Build the workflow store the configuration asks for
pub fn store_from_config(config: &config::StoreConfig) -> Result<Arc<dyn WorkflowStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryWorkflowStore::new())),
        StoreBackend::File => Ok(Arc::new(FileWorkflowStore::new(&config.path)?)),
    }
}
