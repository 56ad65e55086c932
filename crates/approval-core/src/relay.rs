//! Result Relay Protocol: mapping between domain types and wire messages

use crate::error::{ApprovalError, Result};
use approval_grpc::{ReportResultRequest, Step as WireStep, SubmitRequest};
use approval_types::{ApprovalRequest, Decision, EmployeeId, RequestId, StepReport, StepStatus, WorkItem};

/// Full document snapshot sent with `Submit`
pub fn submit_request(request: &ApprovalRequest) -> SubmitRequest {
    SubmitRequest {
        request_id: request.request_id.value(),
        requester_id: request.requester_id.to_string(),
        title: request.title.clone(),
        content: request.content.clone(),
        steps: request
            .steps
            .iter()
            .map(|s| WireStep {
                step: s.step_number as i32,
                approver_id: s.approver_id.value(),
                status: s.status.as_str().to_string(),
            })
            .collect(),
    }
}

/// Work item for the lowest-numbered pending step of a `Submit`
pub fn work_item_from_submit(submit: &SubmitRequest) -> Result<WorkItem> {
    let mut active: Option<&WireStep> = None;
    for step in &submit.steps {
        let status: StepStatus = step.status.parse()?;
        if status == StepStatus::Pending && active.map_or(true, |a| step.step < a.step) {
            active = Some(step);
        }
    }

    let active = active.ok_or_else(|| {
        ApprovalError::Validation(format!(
            "Submit for request {} has no pending step",
            submit.request_id
        ))
    })?;
    let step_number = u32::try_from(active.step)
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| ApprovalError::Validation(format!("invalid step number {}", active.step)))?;

    Ok(WorkItem {
        request_id: RequestId::new(submit.request_id),
        title: submit.title.clone(),
        content: submit.content.clone(),
        approver_id: EmployeeId::new(active.approver_id),
        step_number,
    })
}

pub fn report_request(report: &StepReport) -> ReportResultRequest {
    ReportResultRequest {
        request_id: report.request_id.value(),
        step: report.step_number as i32,
        approver_id: report.approver_id.value(),
        status: report.decision.as_str().to_string(),
    }
}

pub fn report_from_wire(message: &ReportResultRequest) -> Result<StepReport> {
    let decision: Decision = message.status.parse()?;
    let step_number = u32::try_from(message.step)
        .map_err(|_| ApprovalError::Validation(format!("invalid step number {}", message.step)))?;

    Ok(StepReport {
        request_id: RequestId::new(message.request_id),
        step_number,
        approver_id: EmployeeId::new(message.approver_id),
        decision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approval_types::StepSpec;

    #[test]
    fn test_submit_targets_first_pending_step() {
        let mut request = ApprovalRequest::new(
            RequestId::new(11),
            EmployeeId::new(1),
            "Offsite".to_string(),
            "Team offsite".to_string(),
            &[
                StepSpec { step: 1, approver_id: EmployeeId::new(2) },
                StepSpec { step: 2, approver_id: EmployeeId::new(3) },
            ],
        );
        request.steps[0].status = StepStatus::Approved;

        let wire = submit_request(&request);
        assert_eq!(wire.requester_id, "1");
        assert_eq!(wire.steps[0].status, "approved");

        let item = work_item_from_submit(&wire).unwrap();
        assert_eq!(item.step_number, 2);
        assert_eq!(item.approver_id, EmployeeId::new(3));
        assert_eq!(item.content, "Team offsite");
    }

    #[test]
    fn test_submit_without_pending_step_is_invalid() {
        let wire = SubmitRequest {
            request_id: 3,
            requester_id: "1".to_string(),
            title: "t".to_string(),
            content: String::new(),
            steps: vec![WireStep {
                step: 1,
                approver_id: 2,
                status: "approved".to_string(),
            }],
        };
        assert_eq!(work_item_from_submit(&wire).unwrap_err().kind(), "ValidationError");
    }

    #[test]
    fn test_report_rejects_unknown_status() {
        let message = ReportResultRequest {
            request_id: 1,
            step: 1,
            approver_id: 2,
            status: "maybe".to_string(),
        };
        assert_eq!(report_from_wire(&message).unwrap_err().kind(), "ValidationError");

        let message = ReportResultRequest { status: "rejected".to_string(), ..message };
        let report = report_from_wire(&message).unwrap();
        assert_eq!(report.decision, Decision::Rejected);
        assert_eq!(report_request(&report), message);
    }
}
