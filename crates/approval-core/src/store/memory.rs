//! In-memory workflow store

use super::{apply_decision, sort_newest_first, WorkflowStore};
use crate::error::{ApprovalError, Result};
use approval_types::{ApprovalRequest, Decision, RequestId};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store; documents live as long as the process
#[derive(Debug, Default)]
pub struct MemoryWorkflowStore {
    documents: RwLock<HashMap<RequestId, ApprovalRequest>>,
}

impl MemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn insert(&self, request: ApprovalRequest) -> Result<()> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(&request.request_id) {
            return Err(ApprovalError::Store(format!(
                "Request {} already exists",
                request.request_id
            )));
        }
        documents.insert(request.request_id, request);
        Ok(())
    }

    async fn get(&self, id: RequestId) -> Result<Option<ApprovalRequest>> {
        Ok(self.documents.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<ApprovalRequest>> {
        let mut docs: Vec<ApprovalRequest> = self.documents.read().await.values().cloned().collect();
        sort_newest_first(&mut docs);
        Ok(docs)
    }

    async fn record_decision(
        &self,
        id: RequestId,
        step_number: u32,
        decision: Decision,
    ) -> Result<Option<ApprovalRequest>> {
        let mut documents = self.documents.write().await;
        Ok(documents
            .get_mut(&id)
            .and_then(|doc| apply_decision(doc, step_number, decision).then(|| doc.clone())))
    }
}
