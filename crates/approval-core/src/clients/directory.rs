//! Employee directory collaborator
//!
//! The coordinator only asks one question: does this id exist?

use crate::config::DirectoryConfig;
use crate::error::Result;
use approval_types::EmployeeId;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use std::sync::Arc;

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn exists(&self, id: EmployeeId) -> Result<bool>;
}

/// Employee service over HTTP: `GET {base_url}/employees/{id}`
pub struct HttpDirectory {
    client: Client,
    base_url: String,
}

impl HttpDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        log::info!("Employee directory at {}", base_url);

        Self {
            client: Client::new(),
            base_url,
        }
    }
}

/// A lookup that fails or gets an unexpected answer counts as "does not exist"
#[async_trait]
impl EmployeeDirectory for HttpDirectory {
    async fn exists(&self, id: EmployeeId) -> Result<bool> {
        let url = format!("{}/employees/{}", self.base_url, id);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Employee directory lookup for {} failed: {}", id, e);
                return Ok(false);
            }
        };

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                log::warn!("Employee directory answered {} for GET {}", status, url);
                Ok(false)
            }
        }
    }
}

/// Fixed allow-list
pub struct StaticDirectory {
    known: HashSet<EmployeeId>,
}

impl StaticDirectory {
    pub fn new<I: IntoIterator<Item = EmployeeId>>(ids: I) -> Self {
        Self {
            known: ids.into_iter().collect(),
        }
    }
}

#[async_trait]
impl EmployeeDirectory for StaticDirectory {
    async fn exists(&self, id: EmployeeId) -> Result<bool> {
        Ok(self.known.contains(&id))
    }
}

/// Resolves every id; used when no directory is configured
pub struct OpenDirectory;

#[async_trait]
impl EmployeeDirectory for OpenDirectory {
    async fn exists(&self, _id: EmployeeId) -> Result<bool> {
        Ok(true)
    }
}

/// Pick the directory implementation the configuration asks for
pub fn directory_from_config(config: &DirectoryConfig) -> Arc<dyn EmployeeDirectory> {
    if let Some(base_url) = &config.base_url {
        return Arc::new(HttpDirectory::new(base_url.clone()));
    }

    match &config.known_ids {
        Some(ids) => Arc::new(StaticDirectory::new(ids.iter().copied().map(EmployeeId::new))),
        None => {
            log::warn!("No employee directory configured, every id will be accepted");
            Arc::new(OpenDirectory)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_directory_lookup() {
        let directory = StaticDirectory::new([EmployeeId::new(1), EmployeeId::new(2)]);
        assert!(directory.exists(EmployeeId::new(2)).await.unwrap());
        assert!(!directory.exists(EmployeeId::new(3)).await.unwrap());
    }

    #[tokio::test]
    async fn test_directory_from_config_prefers_static_list_without_url() {
        let config = DirectoryConfig {
            base_url: None,
            known_ids: Some(vec![7]),
        };
        let directory = directory_from_config(&config);
        assert!(directory.exists(EmployeeId::new(7)).await.unwrap());
        assert!(!directory.exists(EmployeeId::new(8)).await.unwrap());

        let open = directory_from_config(&DirectoryConfig::default());
        assert!(open.exists(EmployeeId::new(12345)).await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_directory_resolves_nobody() {
        // Port 9 (discard) is not expected to run an HTTP server
        let directory = HttpDirectory::new("http://127.0.0.1:9/");
        assert!(!directory.exists(EmployeeId::new(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_directory_server_error_resolves_nobody() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                .await
                .unwrap();
        });

        let directory = HttpDirectory::new(format!("http://{}", addr));
        assert!(!directory.exists(EmployeeId::new(1)).await.unwrap());
    }
}
