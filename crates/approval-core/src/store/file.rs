//! File-backed workflow store
//! One JSON document per request, written atomically via rename

use super::{apply_decision, sort_newest_first, WorkflowStore};
use crate::error::{ApprovalError, Result};
use approval_types::{ApprovalRequest, Decision, RequestId};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Durable store that survives restarts
pub struct FileWorkflowStore {
    root_path: PathBuf,
    // Serialises read-modify-write cycles so updates stay atomic per document
    write_lock: Mutex<()>,
}

impl FileWorkflowStore {
    /// Create store rooted at `root_path`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(root_path: P) -> Result<Self> {
        let root_path = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root_path)?;

        log::info!("Workflow store rooted at {}", root_path.display());
        Ok(Self {
            root_path,
            write_lock: Mutex::new(()),
        })
    }

    fn document_path(&self, id: RequestId) -> PathBuf {
        self.root_path.join(format!("approval_{}.json", id))
    }

    fn write_document(&self, doc: &ApprovalRequest) -> Result<()> {
        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| ApprovalError::Store(format!("Failed to serialize request: {}", e)))?;

        let path = self.document_path(doc.request_id);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)?;

        Ok(())
    }

    fn read_document(&self, path: &Path) -> Result<ApprovalRequest> {
        let json = fs::read_to_string(path)?;

        serde_json::from_str(&json)
            .map_err(|e| ApprovalError::Store(format!("Failed to deserialize {}: {}", path.display(), e)))
    }

    fn load(&self, id: RequestId) -> Result<Option<ApprovalRequest>> {
        let path = self.document_path(id);
        if !path.exists() {
            return Ok(None);
        }
        self.read_document(&path).map(Some)
    }

    /// Read, mutate and write back one document under the write lock
    async fn modify<F>(&self, id: RequestId, mutate: F) -> Result<Option<ApprovalRequest>>
    where
        F: FnOnce(&mut ApprovalRequest) -> bool + Send,
    {
        let _guard = self.write_lock.lock().await;

        let Some(mut doc) = self.load(id)? else {
            return Ok(None);
        };
        if !mutate(&mut doc) {
            return Ok(None);
        }
        self.write_document(&doc)?;
        Ok(Some(doc))
    }
}

#[async_trait]
impl WorkflowStore for FileWorkflowStore {
    async fn insert(&self, request: ApprovalRequest) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        if self.document_path(request.request_id).exists() {
            return Err(ApprovalError::Store(format!(
                "Request {} already exists",
                request.request_id
            )));
        }
        self.write_document(&request)?;

        log::debug!("Persisted request {} to {}", request.request_id, self.root_path.display());
        Ok(())
    }

    async fn get(&self, id: RequestId) -> Result<Option<ApprovalRequest>> {
        self.load(id)
    }

    async fn list(&self) -> Result<Vec<ApprovalRequest>> {
        let mut docs = Vec::new();

        for entry in fs::read_dir(&self.root_path)? {
            let entry = entry?;

            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
                match self.read_document(&path) {
                    Ok(doc) => docs.push(doc),
                    Err(e) => log::warn!("Skipping unreadable document {}: {}", path.display(), e),
                }
            }
        }

        sort_newest_first(&mut docs);
        Ok(docs)
    }

    async fn record_decision(
        &self,
        id: RequestId,
        step_number: u32,
        decision: Decision,
    ) -> Result<Option<ApprovalRequest>> {
        self.modify(id, |doc| apply_decision(doc, step_number, decision)).await
    }
}
