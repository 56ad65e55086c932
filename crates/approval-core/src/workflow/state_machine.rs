//! Sequential step state machine
//!
//! States are "step k pending" for each k, plus the terminal `approved` and
//! `rejected`. Only a decision on the active step moves the machine, and the
//! terminal states have no outgoing transitions.

use crate::error::{ApprovalError, Result};
use approval_types::{
    ApprovalRequest, Decision, EmployeeId, FinalStatus, NotificationPayload, StepReport, WorkItem,
};

/// What the coordinator must do after a step decision has been stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Hand the next pending step to its approver
    Dispatch(WorkItem),
    /// Close the request and tell the requester
    Finalize {
        status: FinalStatus,
        payload: NotificationPayload,
    },
}

/// Reject reports that do not target the active step of an open request
pub fn check_report(doc: &ApprovalRequest, report: &StepReport) -> Result<()> {
    if doc.is_terminal() {
        return Err(ApprovalError::AlreadyFinalized(doc.request_id));
    }

    match doc.active_step() {
        Some(active)
            if active.step_number == report.step_number
                && active.approver_id == report.approver_id =>
        {
            Ok(())
        }
        _ => Err(ApprovalError::StaleStep {
            request_id: doc.request_id,
            step_number: report.step_number,
            approver_id: report.approver_id,
        }),
    }
}

/// Next transition for a document whose decision, and any final status, is already recorded
pub fn next_transition(doc: &ApprovalRequest, decided_by: EmployeeId, decision: Decision) -> Transition {
    match decision {
        Decision::Rejected => Transition::Finalize {
            status: FinalStatus::Rejected,
            payload: NotificationPayload::rejected(doc.request_id, decided_by),
        },
        Decision::Approved => match doc.active_work_item() {
            Some(item) => Transition::Dispatch(item),
            None => Transition::Finalize {
                status: FinalStatus::Approved,
                payload: NotificationPayload::approved(doc.request_id),
            },
        },
    }
}
