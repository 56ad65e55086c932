//! Error types for the approval workflow

use approval_types::{EmployeeId, ParseError, RequestId};
use thiserror::Error;

/// gRPC metadata key carrying [`ApprovalError::kind`] on error statuses
pub const ERROR_KIND_METADATA: &str = "x-approval-error-kind";

/// Main error type for all approval operations
#[derive(Error, Debug)]
pub enum ApprovalError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Approver {0} does not exist")]
    UnknownApprover(EmployeeId),

    #[error("Requester {0} does not exist")]
    UnknownRequester(EmployeeId),

    #[error("Request {0} not found")]
    NotFound(RequestId),

    #[error("Request {request_id} is not queued for approver {approver_id}")]
    NotFoundInQueue {
        approver_id: EmployeeId,
        request_id: RequestId,
    },

    #[error("{peer} unavailable: {reason}")]
    UpstreamUnavailable {
        peer: String,
        reason: String,
        request_id: Option<RequestId>,
    },

    #[error("Decision on request {request_id} was recorded but its next step was not dispatched: {reason}")]
    NextStepNotDispatched { request_id: RequestId, reason: String },

    #[error("Step {step_number} of request {request_id} is not awaiting a decision from approver {approver_id}")]
    StaleStep {
        request_id: RequestId,
        step_number: u32,
        approver_id: EmployeeId,
    },

    #[error("Request {0} is already finalized")]
    AlreadyFinalized(RequestId),

    #[error("Workflow store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ApprovalError {
    pub fn upstream(peer: impl Into<String>, reason: impl ToString) -> Self {
        Self::UpstreamUnavailable {
            peer: peer.into(),
            reason: reason.to_string(),
            request_id: None,
        }
    }

    /// Attach the request whose side effects were already applied
    pub fn for_request(self, id: RequestId) -> Self {
        match self {
            Self::UpstreamUnavailable { peer, reason, .. } => Self::UpstreamUnavailable {
                peer,
                reason,
                request_id: Some(id),
            },
            other => other,
        }
    }

    /// Stable machine-readable kind used in HTTP bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::UnknownApprover(_) => "UnknownApprover",
            Self::UnknownRequester(_) => "UnknownRequester",
            Self::NotFound(_) => "NotFound",
            Self::NotFoundInQueue { .. } => "NotFoundInQueue",
            Self::UpstreamUnavailable { .. } => "UpstreamUnavailable",
            Self::NextStepNotDispatched { .. } => "NextStepNotDispatched",
            Self::StaleStep { .. } => "StaleStep",
            Self::AlreadyFinalized(_) => "AlreadyFinalized",
            Self::Store(_) | Self::Io(_) | Self::Json(_) => "StoreError",
            Self::Config(_) => "ConfigError",
            Self::Http(_) => "HttpError",
        }
    }

    /// HTTP status code for the request-facing surfaces
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::UnknownApprover(_) | Self::UnknownRequester(_) => 400,
            Self::NotFound(_) | Self::NotFoundInQueue { .. } => 404,
            Self::StaleStep { .. } | Self::AlreadyFinalized(_) => 409,
            Self::UpstreamUnavailable { .. } | Self::NextStepNotDispatched { .. } | Self::Http(_) => 502,
            Self::Store(_) | Self::Config(_) | Self::Io(_) | Self::Json(_) => 500,
        }
    }
}

impl From<ParseError> for ApprovalError {
    fn from(e: ParseError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<ApprovalError> for tonic::Status {
    fn from(e: ApprovalError) -> Self {
        let kind = e.kind();
        let message = e.to_string();
        let mut status = match e {
            ApprovalError::Validation(_)
            | ApprovalError::UnknownApprover(_)
            | ApprovalError::UnknownRequester(_) => tonic::Status::invalid_argument(message),
            ApprovalError::NotFound(_) | ApprovalError::NotFoundInQueue { .. } => {
                tonic::Status::not_found(message)
            }
            ApprovalError::StaleStep { .. } | ApprovalError::AlreadyFinalized(_) => {
                tonic::Status::failed_precondition(message)
            }
            ApprovalError::UpstreamUnavailable { .. }
            | ApprovalError::NextStepNotDispatched { .. }
            | ApprovalError::Http(_) => tonic::Status::unavailable(message),
            _ => tonic::Status::internal(message),
        };
        status
            .metadata_mut()
            .insert(ERROR_KIND_METADATA, tonic::metadata::MetadataValue::from_static(kind));
        status
    }
}

/// Result type for approval operations
pub type Result<T> = std::result::Result<T, ApprovalError>;
