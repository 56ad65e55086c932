//! Shared types for the approval workflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an approval request, assigned by the coordinator at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(i64);

impl RequestId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Employee identity as known to the directory (requesters and approvers alike)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(i64);

impl EmployeeId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EmployeeId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| ParseError::EmployeeId(s.to_string()))
    }
}

/// Error raised when a wire string does not name a known value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown step status '{0}'")]
    StepStatus(String),

    #[error("unknown final status '{0}'")]
    FinalStatus(String),

    #[error("unknown decision '{0}', expected 'approved' or 'rejected'")]
    Decision(String),

    #[error("invalid employee id '{0}'")]
    EmployeeId(String),
}

/// Status of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Approved,
    Rejected,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(ParseError::StepStatus(other.to_string())),
        }
    }
}

/// Overall status of a request. Both `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    InProgress,
    Approved,
    Rejected,
}

impl FinalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinalStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(Self::InProgress),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(ParseError::FinalStatus(other.to_string())),
        }
    }
}

/// An approver's verdict on the step they hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn as_step_status(&self) -> StepStatus {
        match self {
            Self::Approved => StepStatus::Approved,
            Self::Rejected => StepStatus::Rejected,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(ParseError::Decision(other.to_string())),
        }
    }
}

/// Step as submitted by the requester, before any status exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSpec {
    pub step: u32,
    pub approver_id: EmployeeId,
}

/// One step of an approval chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(rename = "step")]
    pub step_number: u32,
    pub approver_id: EmployeeId,
    pub status: StepStatus,
}

impl Step {
    pub fn pending(step_number: u32, approver_id: EmployeeId) -> Self {
        Self {
            step_number,
            approver_id,
            status: StepStatus::Pending,
        }
    }
}

/// Canonical approval document owned by the workflow store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub request_id: RequestId,
    pub requester_id: EmployeeId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub steps: Vec<Step>,
    pub final_status: FinalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApprovalRequest {
    /// Build a fresh in-progress document with every step pending
    pub fn new(
        request_id: RequestId,
        requester_id: EmployeeId,
        title: String,
        content: String,
        steps: &[StepSpec],
    ) -> Self {
        let now = Utc::now();
        Self {
            request_id,
            requester_id,
            title,
            content,
            steps: steps
                .iter()
                .map(|s| Step::pending(s.step, s.approver_id))
                .collect(),
            final_status: FinalStatus::InProgress,
            created_at: now,
            updated_at: now,
        }
    }

    /// Lowest-numbered pending step, only while the request is in progress
    pub fn active_step(&self) -> Option<&Step> {
        if self.is_terminal() {
            return None;
        }
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Pending)
            .min_by_key(|s| s.step_number)
    }

    /// A rejected step closes the request even if `final_status` lags behind
    pub fn is_terminal(&self) -> bool {
        self.final_status.is_terminal() || self.steps.iter().any(|s| s.status == StepStatus::Rejected)
    }

    /// Work item for the active step, if there is one
    pub fn active_work_item(&self) -> Option<WorkItem> {
        self.active_step().map(|step| WorkItem {
            request_id: self.request_id,
            title: self.title.clone(),
            content: self.content.clone(),
            approver_id: step.approver_id,
            step_number: step.step_number,
        })
    }
}

/// "This approver must currently decide this step of this request"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub request_id: RequestId,
    pub title: String,
    pub content: String,
    pub approver_id: EmployeeId,
    #[serde(rename = "step")]
    pub step_number: u32,
}

/// Body of a create call, before the coordinator assigns an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApprovalRequest {
    pub requester_id: EmployeeId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// A decision relayed from the dispatch node back to the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub request_id: RequestId,
    #[serde(rename = "step")]
    pub step_number: u32,
    pub approver_id: EmployeeId,
    pub decision: Decision,
}

/// Terminal result pushed to the requester
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationResult {
    Approved,
    Rejected,
}

/// Payload of a push notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub request_id: RequestId,
    pub result: NotificationResult,
    pub final_result: NotificationResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<EmployeeId>,
}

impl NotificationPayload {
    pub fn approved(request_id: RequestId) -> Self {
        Self {
            request_id,
            result: NotificationResult::Approved,
            final_result: NotificationResult::Approved,
            rejected_by: None,
        }
    }

    pub fn rejected(request_id: RequestId, rejected_by: EmployeeId) -> Self {
        Self {
            request_id,
            result: NotificationResult::Rejected,
            final_result: NotificationResult::Rejected,
            rejected_by: Some(rejected_by),
        }
    }
}

/// What happened to a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOutcome {
    /// Handed to a live channel
    Sent,
    /// Nobody connected for the target; dropped for good
    Skipped,
}

/// Body of `POST /notify`; the payload is passed through untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    pub target_id: EmployeeId,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyResponse {
    pub status: DeliveryOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_step_request() -> ApprovalRequest {
        ApprovalRequest::new(
            RequestId::new(1),
            EmployeeId::new(10),
            "Laptop".to_string(),
            "New laptop for onboarding".to_string(),
            &[
                StepSpec { step: 1, approver_id: EmployeeId::new(20) },
                StepSpec { step: 2, approver_id: EmployeeId::new(30) },
            ],
        )
    }

    #[test]
    fn test_new_request_starts_in_progress_with_pending_steps() {
        let request = two_step_request();
        assert_eq!(request.final_status, FinalStatus::InProgress);
        assert!(request.steps.iter().all(|s| s.status == StepStatus::Pending));
        assert_eq!(request.active_step().unwrap().step_number, 1);
    }

    #[test]
    fn test_active_step_skips_approved_steps() {
        let mut request = two_step_request();
        request.steps[0].status = StepStatus::Approved;
        let item = request.active_work_item().unwrap();
        assert_eq!(item.step_number, 2);
        assert_eq!(item.approver_id, EmployeeId::new(30));
    }

    #[test]
    fn test_terminal_request_has_no_active_step() {
        let mut request = two_step_request();
        request.steps[0].status = StepStatus::Rejected;
        request.final_status = FinalStatus::Rejected;
        assert!(request.active_step().is_none());
        assert!(request.active_work_item().is_none());
    }

    #[test]
    fn test_rejected_step_closes_request_before_final_status_is_set() {
        let mut request = two_step_request();
        request.steps[0].status = StepStatus::Rejected;
        assert_eq!(request.final_status, FinalStatus::InProgress);

        assert!(request.is_terminal());
        assert!(request.active_step().is_none());
    }

    #[test]
    fn test_document_json_shape() {
        let request = two_step_request();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["requestId"], 1);
        assert_eq!(json["finalStatus"], "in_progress");
        assert_eq!(json["steps"][0]["step"], 1);
        assert_eq!(json["steps"][0]["approverId"], 20);
        assert_eq!(json["steps"][0]["status"], "pending");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_notification_payload_omits_rejected_by_when_approved() {
        let json = serde_json::to_string(&NotificationPayload::approved(RequestId::new(7))).unwrap();
        assert!(json.contains("\"result\":\"approved\""));
        assert!(json.contains("\"finalResult\":\"approved\""));
        assert!(!json.contains("rejectedBy"));

        let json = serde_json::to_value(NotificationPayload::rejected(
            RequestId::new(7),
            EmployeeId::new(20),
        ))
        .unwrap();
        assert_eq!(json["rejectedBy"], 20);
    }

    #[test]
    fn test_new_request_body_defaults() {
        let body: NewApprovalRequest =
            serde_json::from_str(r#"{"requesterId": 1, "title": "Trip"}"#).unwrap();
        assert!(body.steps.is_empty());
        assert_eq!(body.content, "");

        let notify: NotifyRequest =
            serde_json::from_str(r#"{"targetId": 5, "payload": {"x": 1}}"#).unwrap();
        assert_eq!(notify.target_id, EmployeeId::new(5));
        let status = serde_json::to_string(&NotifyResponse { status: DeliveryOutcome::Skipped }).unwrap();
        assert_eq!(status, r#"{"status":"skipped"}"#);
    }

    #[test]
    fn test_decision_parsing() {
        assert_eq!("approved".parse::<Decision>().unwrap(), Decision::Approved);
        assert_eq!("rejected".parse::<Decision>().unwrap(), Decision::Rejected);
        assert_eq!(
            "maybe".parse::<Decision>(),
            Err(ParseError::Decision("maybe".to_string()))
        );
        assert_eq!(Decision::Rejected.as_step_status(), StepStatus::Rejected);
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in [StepStatus::Pending, StepStatus::Approved, StepStatus::Rejected] {
            assert_eq!(status.as_str().parse::<StepStatus>().unwrap(), status);
        }
        assert!(FinalStatus::Approved.is_terminal());
        assert!(!FinalStatus::InProgress.is_terminal());
        assert_eq!(" 42".parse::<EmployeeId>().unwrap(), EmployeeId::new(42));
    }
}
