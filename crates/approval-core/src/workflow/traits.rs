//! Seams between the coordinator, the dispatch node and the fan-out
//!
//! Each trait has a network implementation in `clients` and an in-process
//! implementation, so a single binary and the tests can wire the nodes
//! together without sockets.

use crate::error::Result;
use approval_types::{ApprovalRequest, DeliveryOutcome, EmployeeId, NotificationPayload, StepReport};
use async_trait::async_trait;

/// Hands the active step of a request to the dispatch node (`Submit`)
#[async_trait]
pub trait DispatchSink: Send + Sync {
    async fn submit(&self, request: &ApprovalRequest) -> Result<()>;
}

/// Carries an approver's decision back to the coordinator (`ReportResult`)
#[async_trait]
pub trait ResultRelay: Send + Sync {
    async fn report_result(&self, report: StepReport) -> Result<()>;
}

/// Best-effort push to a requester. `Skipped` is a normal outcome, not an error.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, target: EmployeeId, payload: NotificationPayload) -> Result<DeliveryOutcome>;
}
