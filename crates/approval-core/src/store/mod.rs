//! Workflow store: durable keyed storage for approval documents
//!
//! The coordinator never mutates a document in place. It goes through the
//! update-by-filter primitive below, which is atomic per document, so two
//! decisions can never both move the same step out of `pending` and a step
//! decision never lands without its final status.

pub mod file;
pub mod memory;

use crate::error::Result;
use approval_types::{ApprovalRequest, Decision, FinalStatus, RequestId, StepStatus};
use async_trait::async_trait;
use chrono::Utc;

pub use file::FileWorkflowStore;
pub use memory::MemoryWorkflowStore;

#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Insert a new document; fails if the id is already taken
    async fn insert(&self, request: ApprovalRequest) -> Result<()>;

    async fn get(&self, id: RequestId) -> Result<Option<ApprovalRequest>>;

    /// All documents, newest first by `created_at`
    async fn list(&self) -> Result<Vec<ApprovalRequest>>;

    /// Record `decision` on `step_number` in a single write, provided the
    /// request is open and the step is still pending. A rejection, or an
    /// approval of the last pending step, sets `final_status` in the same
    /// write. Returns the updated document, or `None` when the filter
    /// matched nothing.
    async fn record_decision(
        &self,
        id: RequestId,
        step_number: u32,
        decision: Decision,
    ) -> Result<Option<ApprovalRequest>>;
}

/// Filter-and-set for one decision, shared by the store backends
pub(crate) fn apply_decision(doc: &mut ApprovalRequest, step_number: u32, decision: Decision) -> bool {
    if doc.is_terminal() {
        return false;
    }
    match doc.steps.iter_mut().find(|s| s.step_number == step_number) {
        Some(step) if step.status == StepStatus::Pending => step.status = decision.as_step_status(),
        _ => return false,
    }

    doc.final_status = match decision {
        Decision::Rejected => FinalStatus::Rejected,
        Decision::Approved if doc.steps.iter().all(|s| s.status == StepStatus::Approved) => {
            FinalStatus::Approved
        }
        Decision::Approved => FinalStatus::InProgress,
    };
    doc.updated_at = Utc::now();
    true
}

pub(crate) fn sort_newest_first(docs: &mut [ApprovalRequest]) {
    docs.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then(b.request_id.cmp(&a.request_id))
    });
}
