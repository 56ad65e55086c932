//! Configuration management for the approval nodes

use crate::error::{ApprovalError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment prefix for overrides, e.g. `APPROVAL__PEERS__DISPATCH_GRPC_URL`
pub const ENV_PREFIX: &str = "APPROVAL";

/// Main configuration structure. Every section has defaults so `{}` is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprovalConfig {
    #[serde(default)]
    pub coordinator: CoordinatorConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub notification: NotificationConfig,

    #[serde(default)]
    pub peers: PeersConfig,

    #[serde(default)]
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    #[serde(default = "default_coordinator_http")]
    pub http_addr: SocketAddr,

    #[serde(default = "default_coordinator_grpc")]
    pub grpc_addr: SocketAddr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_dispatch_http")]
    pub http_addr: SocketAddr,

    #[serde(default = "default_dispatch_grpc")]
    pub grpc_addr: SocketAddr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Trigger endpoint (`POST /notify`)
    #[serde(default = "default_notification_http")]
    pub http_addr: SocketAddr,

    /// Push channel endpoint (`GET /ws?userId=`)
    #[serde(default = "default_notification_ws")]
    pub ws_addr: SocketAddr,
}

/// Where each node finds its peers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeersConfig {
    #[serde(default = "default_dispatch_grpc_url")]
    pub dispatch_grpc_url: String,

    #[serde(default = "default_coordinator_grpc_url")]
    pub coordinator_grpc_url: String,

    #[serde(alias = "notification_service_url", default = "default_notification_url")]
    pub notification_url: String,
}

/// Employee directory collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Employee service base URL; `GET {base_url}/employees/{id}` must answer 200
    #[serde(alias = "url", default)]
    pub base_url: Option<String>,

    /// Static allow-list, used when no base URL is configured
    #[serde(default)]
    pub known_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_backend")]
    pub backend: StoreBackend,

    /// Directory holding one JSON document per request (file backend only)
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

// Default functions
fn default_coordinator_http() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5002))
}

fn default_coordinator_grpc() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 50052))
}

fn default_dispatch_http() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5003))
}

fn default_dispatch_grpc() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 50053))
}

fn default_notification_http() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5004))
}

fn default_notification_ws() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8085))
}

fn default_dispatch_grpc_url() -> String {
    "http://localhost:50053".to_string()
}

fn default_coordinator_grpc_url() -> String {
    "http://localhost:50052".to_string()
}

fn default_notification_url() -> String {
    "http://localhost:5004".to_string()
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/approvals")
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            http_addr: default_coordinator_http(),
            grpc_addr: default_coordinator_grpc(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            http_addr: default_dispatch_http(),
            grpc_addr: default_dispatch_grpc(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            http_addr: default_notification_http(),
            ws_addr: default_notification_ws(),
        }
    }
}

impl Default for PeersConfig {
    fn default() -> Self {
        Self {
            dispatch_grpc_url: default_dispatch_grpc_url(),
            coordinator_grpc_url: default_coordinator_grpc_url(),
            notification_url: default_notification_url(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: default_store_path(),
        }
    }
}

impl ApprovalConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ApprovalError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_json_str(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ApprovalError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load an optional JSON file, then apply `APPROVAL__SECTION__FIELD` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path).format(config::FileFormat::Json),
            );
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| ApprovalError::Config(format!("Failed to load config: {}", e)))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| ApprovalError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("peers.dispatch_grpc_url", &self.peers.dispatch_grpc_url),
            ("peers.coordinator_grpc_url", &self.peers.coordinator_grpc_url),
            ("peers.notification_url", &self.peers.notification_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ApprovalError::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        if let Some(base_url) = &self.directory.base_url {
            if base_url.trim().is_empty() {
                return Err(ApprovalError::Config(
                    "directory.base_url must not be empty when set".to_string(),
                ));
            }
        }

        if self.store.backend == StoreBackend::File && self.store.path.as_os_str().is_empty() {
            return Err(ApprovalError::Config(
                "store.path is required for the file backend".to_string(),
            ));
        }

        Ok(())
    }
}
