//! Coordinator client using gRPC

use crate::error::{ApprovalError, Result, ERROR_KIND_METADATA};
use crate::relay;
use crate::workflow::ResultRelay;
use approval_grpc::CoordinatorServiceClient;
use approval_types::StepReport;
use async_trait::async_trait;
use tonic::transport::Channel;
use tonic::{Code, Status};

const PEER: &str = "coordinator";

pub struct GrpcCoordinatorClient {
    grpc_url: String,
}

impl GrpcCoordinatorClient {
    pub fn new(grpc_url: impl Into<String>) -> Self {
        let grpc_url = grpc_url.into();
        log::info!("GrpcCoordinatorClient configured for gRPC endpoint: {}", grpc_url);

        Self { grpc_url }
    }
}

#[async_trait]
impl ResultRelay for GrpcCoordinatorClient {
    async fn report_result(&self, report: StepReport) -> Result<()> {
        let channel = Channel::from_shared(self.grpc_url.clone())
            .map_err(|e| ApprovalError::Config(format!("Invalid gRPC URL: {}", e)))?
            .connect()
            .await
            .map_err(|e| {
                ApprovalError::upstream(PEER, format!("connect to {} failed: {}", self.grpc_url, e))
            })?;
        let mut client = CoordinatorServiceClient::new(channel);

        client
            .report_result(relay::report_request(&report))
            .await
            .map(|_| ())
            .map_err(|status| error_from_status(&status, &report))
    }
}

/// Rebuild the coordinator's refusal from the kind it attached to the status
fn error_from_status(status: &Status, report: &StepReport) -> ApprovalError {
    let kind = status
        .metadata()
        .get(ERROR_KIND_METADATA)
        .and_then(|value| value.to_str().ok());

    match (kind, status.code()) {
        (Some("NotFound"), _) | (None, Code::NotFound) => ApprovalError::NotFound(report.request_id),
        (Some("AlreadyFinalized"), _) => ApprovalError::AlreadyFinalized(report.request_id),
        (Some("StaleStep"), _) | (None, Code::FailedPrecondition) => ApprovalError::StaleStep {
            request_id: report.request_id,
            step_number: report.step_number,
            approver_id: report.approver_id,
        },
        (Some("NextStepNotDispatched"), _) => ApprovalError::NextStepNotDispatched {
            request_id: report.request_id,
            reason: status.message().to_string(),
        },
        (Some("ValidationError"), _) | (None, Code::InvalidArgument) => {
            ApprovalError::Validation(status.message().to_string())
        }
        _ => ApprovalError::upstream(PEER, status.message()),
    }
}
