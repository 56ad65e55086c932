//! Dispatch node client using gRPC

use crate::error::{ApprovalError, Result};
use crate::relay;
use crate::workflow::DispatchSink;
use approval_grpc::{DispatchServiceClient, SUBMIT_RECEIVED};
use approval_types::ApprovalRequest;
use async_trait::async_trait;
use tonic::transport::Channel;

const PEER: &str = "dispatch node";

pub struct GrpcDispatchClient {
    grpc_url: String,
}

impl GrpcDispatchClient {
    pub fn new(grpc_url: impl Into<String>) -> Self {
        let grpc_url = grpc_url.into();
        log::info!("GrpcDispatchClient configured for gRPC endpoint: {}", grpc_url);

        Self { grpc_url }
    }

    async fn connect(&self) -> Result<DispatchServiceClient<Channel>> {
        // Connection on demand; a failed connect is never retried
        let channel = Channel::from_shared(self.grpc_url.clone())
            .map_err(|e| ApprovalError::Config(format!("Invalid gRPC URL: {}", e)))?
            .connect()
            .await
            .map_err(|e| {
                ApprovalError::upstream(PEER, format!("connect to {} failed: {}", self.grpc_url, e))
            })?;

        Ok(DispatchServiceClient::new(channel))
    }
}

#[async_trait]
impl DispatchSink for GrpcDispatchClient {
    async fn submit(&self, request: &ApprovalRequest) -> Result<()> {
        let mut client = self.connect().await?;

        let response = client
            .submit(relay::submit_request(request))
            .await
            .map_err(|status| ApprovalError::upstream(PEER, status.message()))?
            .into_inner();

        if response.status != SUBMIT_RECEIVED {
            log::warn!(
                "Dispatch node answered '{}' for request {}",
                response.status,
                request.request_id
            );
        }
        Ok(())
    }
}
