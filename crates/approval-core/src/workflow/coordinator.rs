//! Request Coordinator
//!
//! Owns the lifecycle of every approval document. Each `report_result` call
//! stores one step decision, together with the final status it implies, and
//! then runs exactly one state machine transition: dispatch the next step or
//! notify the requester.

use super::state_machine::{check_report, next_transition, Transition};
use super::traits::{DispatchSink, Notifier, ResultRelay};
use crate::clients::EmployeeDirectory;
use crate::error::{ApprovalError, Result};
use crate::store::WorkflowStore;
use approval_types::{
    ApprovalRequest, DeliveryOutcome, EmployeeId, NewApprovalRequest, NotificationPayload, RequestId,
    StepReport,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Time-derived request ids, strictly increasing within the process
#[derive(Debug, Default)]
pub struct RequestIdGenerator {
    last: AtomicI64,
}

impl RequestIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> RequestId {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return RequestId::new(candidate),
                Err(current) => last = current,
            }
        }
    }
}

pub struct Coordinator {
    store: Arc<dyn WorkflowStore>,
    directory: Arc<dyn EmployeeDirectory>,
    dispatch: Arc<dyn DispatchSink>,
    notifier: Arc<dyn Notifier>,
    ids: RequestIdGenerator,
}

impl Coordinator {
    pub fn new(
        store: Arc<dyn WorkflowStore>,
        directory: Arc<dyn EmployeeDirectory>,
        dispatch: Arc<dyn DispatchSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            directory,
            dispatch,
            notifier,
            ids: RequestIdGenerator::new(),
        }
    }

    /// Create a request and dispatch its first step
    ///
    /// If the dispatch node cannot be reached the document is kept
    /// `in_progress` without a queued work item, and the error carries the id.
    pub async fn create_request(&self, body: NewApprovalRequest) -> Result<RequestId> {
        validate_new_request(&body)?;

        if !self.directory.exists(body.requester_id).await? {
            return Err(ApprovalError::UnknownRequester(body.requester_id));
        }
        let mut checked = HashSet::new();
        for spec in &body.steps {
            if checked.insert(spec.approver_id) && !self.directory.exists(spec.approver_id).await? {
                return Err(ApprovalError::UnknownApprover(spec.approver_id));
            }
        }

        let request_id = self.ids.next_id();
        let document = ApprovalRequest::new(
            request_id,
            body.requester_id,
            body.title.trim().to_string(),
            body.content,
            &body.steps,
        );
        self.store.insert(document.clone()).await?;
        log::info!(
            "Created request {} for requester {} with {} step(s)",
            request_id,
            body.requester_id,
            document.steps.len()
        );

        self.dispatch_step(&document, document.steps[0].step_number).await?;
        Ok(request_id)
    }

    /// Apply one relayed decision and advance the state machine
    ///
    /// The decision and any final status are stored in one write. If the
    /// next step cannot be dispatched afterwards the decision stays recorded
    /// and the caller gets `NextStepNotDispatched`.
    pub async fn report_result(&self, report: StepReport) -> Result<ApprovalRequest> {
        let document = self
            .store
            .get(report.request_id)
            .await?
            .ok_or(ApprovalError::NotFound(report.request_id))?;
        check_report(&document, &report)?;

        let updated = match self
            .store
            .record_decision(report.request_id, report.step_number, report.decision)
            .await?
        {
            Some(doc) => doc,
            None => return Err(self.lost_race(&report).await),
        };
        log::info!(
            "Recorded {} for step {} of request {} by approver {}",
            report.decision,
            report.step_number,
            report.request_id,
            report.approver_id
        );

        match next_transition(&updated, report.approver_id, report.decision) {
            Transition::Dispatch(item) => {
                self.dispatch_step(&updated, item.step_number)
                    .await
                    .map_err(|e| ApprovalError::NextStepNotDispatched {
                        request_id: report.request_id,
                        reason: e.to_string(),
                    })?;
                Ok(updated)
            }
            Transition::Finalize { status, payload } => {
                log::info!("Request {} finalized as {}", report.request_id, status);
                self.send_notification(updated.requester_id, payload).await;
                Ok(updated)
            }
        }
    }

    pub async fn get(&self, id: RequestId) -> Result<ApprovalRequest> {
        self.store.get(id).await?.ok_or(ApprovalError::NotFound(id))
    }

    /// All requests, newest first
    pub async fn list(&self) -> Result<Vec<ApprovalRequest>> {
        self.store.list().await
    }

    async fn dispatch_step(&self, document: &ApprovalRequest, step_number: u32) -> Result<()> {
        match self.dispatch.submit(document).await {
            Ok(()) => {
                log::info!("Dispatched step {} of request {}", step_number, document.request_id);
                Ok(())
            }
            Err(e) => {
                log::error!(
                    "Request {} is in progress at step {} but no work item was queued: {}",
                    document.request_id,
                    step_number,
                    e
                );
                Err(e.for_request(document.request_id))
            }
        }
    }

    async fn send_notification(&self, target: EmployeeId, payload: NotificationPayload) {
        let request_id = payload.request_id;
        match self.notifier.notify(target, payload).await {
            Ok(DeliveryOutcome::Sent) => {
                log::info!("Notified requester {} about request {}", target, request_id)
            }
            Ok(DeliveryOutcome::Skipped) => {
                log::debug!("Requester {} not connected, result of request {} dropped", target, request_id)
            }
            Err(e) => log::warn!(
                "Notification for request {} to requester {} failed: {}",
                request_id,
                target,
                e
            ),
        }
    }

    /// The compare-and-set matched nothing: another decision got there first
    async fn lost_race(&self, report: &StepReport) -> ApprovalError {
        match self.store.get(report.request_id).await {
            Ok(Some(doc)) if doc.is_terminal() => ApprovalError::AlreadyFinalized(report.request_id),
            Ok(None) => ApprovalError::NotFound(report.request_id),
            Err(e) => e,
            Ok(Some(_)) => ApprovalError::StaleStep {
                request_id: report.request_id,
                step_number: report.step_number,
                approver_id: report.approver_id,
            },
        }
    }
}

#[async_trait]
impl ResultRelay for Coordinator {
    async fn report_result(&self, report: StepReport) -> Result<()> {
        Coordinator::report_result(self, report).await.map(|_| ())
    }
}

/// Steps must be non-empty and numbered 1..N in order; title must be present
pub fn validate_new_request(body: &NewApprovalRequest) -> Result<()> {
    if body.title.trim().is_empty() {
        return Err(ApprovalError::Validation("title must not be empty".to_string()));
    }
    if body.steps.is_empty() {
        return Err(ApprovalError::Validation("at least one step is required".to_string()));
    }
    for (index, spec) in body.steps.iter().enumerate() {
        if spec.step as usize != index + 1 {
            return Err(ApprovalError::Validation(
                "Steps must be sequential starting from 1".to_string(),
            ));
        }
    }
    Ok(())
}
