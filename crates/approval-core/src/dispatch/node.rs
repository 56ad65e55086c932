//! Dispatch Node: serves queues to approvers and relays their decisions

use super::queue::DispatchQueue;
use crate::error::{ApprovalError, Result};
use crate::workflow::ResultRelay;
use approval_types::{Decision, EmployeeId, RequestId, StepReport, WorkItem};
use std::sync::Arc;

pub struct DispatchNode {
    queue: Arc<DispatchQueue>,
    relay: Arc<dyn ResultRelay>,
}

impl DispatchNode {
    pub fn new(queue: Arc<DispatchQueue>, relay: Arc<dyn ResultRelay>) -> Self {
        Self { queue, relay }
    }

    /// Approvers with at least one queued work item
    pub fn approvers_waiting(&self) -> usize {
        self.queue.approver_count()
    }

    pub fn submit(&self, item: WorkItem) {
        self.queue.submit(item);
    }

    pub fn get_queue(&self, approver_id: EmployeeId) -> Vec<WorkItem> {
        self.queue.get(approver_id)
    }

    /// Remove the approver's work item and relay the decision to the coordinator
    ///
    /// The item is gone before the relay call, so a failed relay loses the
    /// decision on this side. That is logged for manual reconciliation. A
    /// decision the coordinator stored but could not advance is not lost.
    pub async fn decide(
        &self,
        approver_id: EmployeeId,
        request_id: RequestId,
        decision: Decision,
    ) -> Result<StepReport> {
        let item = self
            .queue
            .take(approver_id, request_id)
            .ok_or(ApprovalError::NotFoundInQueue {
                approver_id,
                request_id,
            })?;

        let report = StepReport {
            request_id,
            step_number: item.step_number,
            approver_id,
            decision,
        };

        match self.relay.report_result(report).await {
            Ok(()) => {
                log::info!(
                    "Approver {} {} step {} of request {}",
                    approver_id,
                    decision,
                    item.step_number,
                    request_id
                );
                Ok(report)
            }
            Err(e @ ApprovalError::UpstreamUnavailable { .. }) => {
                log::error!(
                    "Decision '{}' by approver {} on step {} of request {} was lost: {}",
                    decision,
                    approver_id,
                    item.step_number,
                    request_id,
                    e
                );
                Err(e.for_request(request_id))
            }
            Err(e @ ApprovalError::NextStepNotDispatched { .. }) => {
                log::warn!(
                    "Decision '{}' by approver {} on step {} of request {} was recorded, next step is not queued: {}",
                    decision,
                    approver_id,
                    item.step_number,
                    request_id,
                    e
                );
                Err(e)
            }
            Err(e) => {
                log::warn!(
                    "Coordinator refused decision by approver {} on request {}: {}",
                    approver_id,
                    request_id,
                    e
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRelay {
        reports: Mutex<Vec<StepReport>>,
        fail: bool,
        stall_next_step: bool,
    }

    #[async_trait]
    impl ResultRelay for RecordingRelay {
        async fn report_result(&self, report: StepReport) -> Result<()> {
            if self.fail {
                return Err(ApprovalError::upstream("coordinator", "Test error"));
            }
            self.reports.lock().unwrap().push(report);
            if self.stall_next_step {
                return Err(ApprovalError::NextStepNotDispatched {
                    request_id: report.request_id,
                    reason: "dispatch node unavailable: Test error".to_string(),
                });
            }
            Ok(())
        }
    }

    fn work_item() -> WorkItem {
        WorkItem {
            request_id: RequestId::new(10),
            title: "Purchase".to_string(),
            content: "Two monitors".to_string(),
            approver_id: EmployeeId::new(5),
            step_number: 2,
        }
    }

    #[tokio::test]
    async fn test_decide_relays_stored_step_number() {
        let relay = Arc::new(RecordingRelay::default());
        let node = DispatchNode::new(Arc::new(DispatchQueue::new()), relay.clone());
        node.submit(work_item());

        let report = node
            .decide(EmployeeId::new(5), RequestId::new(10), Decision::Approved)
            .await
            .unwrap();

        assert_eq!(report.step_number, 2);
        assert_eq!(*relay.reports.lock().unwrap(), vec![report]);
        assert!(node.get_queue(EmployeeId::new(5)).is_empty());
    }

    #[tokio::test]
    async fn test_decide_without_work_item_changes_nothing() {
        let relay = Arc::new(RecordingRelay::default());
        let node = DispatchNode::new(Arc::new(DispatchQueue::new()), relay.clone());
        node.submit(work_item());

        let err = node
            .decide(EmployeeId::new(6), RequestId::new(10), Decision::Approved)
            .await
            .unwrap_err();

        assert!(matches!(err, ApprovalError::NotFoundInQueue { .. }));
        assert!(relay.reports.lock().unwrap().is_empty());
        assert_eq!(node.get_queue(EmployeeId::new(5)).len(), 1);
    }

    #[tokio::test]
    async fn test_failed_relay_still_consumes_work_item() {
        let relay = Arc::new(RecordingRelay {
            fail: true,
            ..Default::default()
        });
        let node = DispatchNode::new(Arc::new(DispatchQueue::new()), relay);
        node.submit(work_item());

        let err = node
            .decide(EmployeeId::new(5), RequestId::new(10), Decision::Rejected)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "UpstreamUnavailable");
        assert!(node.get_queue(EmployeeId::new(5)).is_empty());
    }

    #[tokio::test]
    async fn test_recorded_decision_without_next_step_is_not_an_outage() {
        let relay = Arc::new(RecordingRelay {
            stall_next_step: true,
            ..Default::default()
        });
        let node = DispatchNode::new(Arc::new(DispatchQueue::new()), relay.clone());
        node.submit(work_item());

        let err = node
            .decide(EmployeeId::new(5), RequestId::new(10), Decision::Approved)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "NextStepNotDispatched");
        assert_eq!(relay.reports.lock().unwrap().len(), 1);
        assert_eq!(node.approvers_waiting(), 0);
    }
}
