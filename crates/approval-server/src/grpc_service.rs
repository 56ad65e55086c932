//! gRPC services of the result relay protocol

use approval_core::{relay, Coordinator, DispatchNode};
use approval_grpc::{
    CoordinatorService, CoordinatorServiceServer, DispatchService, DispatchServiceServer,
    ReportResultRequest, ReportResultResponse, SubmitRequest, SubmitResponse, REPORT_SUCCESS,
    SUBMIT_RECEIVED,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tonic::{Request, Response, Status};

/// `DispatchService.Submit`, served by the dispatch node
pub struct DispatchGrpcService {
    node: Arc<DispatchNode>,
}

impl DispatchGrpcService {
    pub fn new(node: Arc<DispatchNode>) -> Self {
        Self { node }
    }
}

#[tonic::async_trait]
impl DispatchService for DispatchGrpcService {
    async fn submit(&self, request: Request<SubmitRequest>) -> Result<Response<SubmitResponse>, Status> {
        let submit = request.into_inner();
        log::debug!("Submit received for request {}", submit.request_id);

        let item = relay::work_item_from_submit(&submit)?;
        self.node.submit(item);

        Ok(Response::new(SubmitResponse {
            status: SUBMIT_RECEIVED.to_string(),
        }))
    }
}

/// `CoordinatorService.ReportResult`, served by the coordinator
pub struct CoordinatorGrpcService {
    coordinator: Arc<Coordinator>,
}

impl CoordinatorGrpcService {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self { coordinator }
    }
}

#[tonic::async_trait]
impl CoordinatorService for CoordinatorGrpcService {
    async fn report_result(
        &self,
        request: Request<ReportResultRequest>,
    ) -> Result<Response<ReportResultResponse>, Status> {
        let report = relay::report_from_wire(&request.into_inner())?;

        match self.coordinator.report_result(report).await {
            Ok(_) => Ok(Response::new(ReportResultResponse {
                status: REPORT_SUCCESS.to_string(),
            })),
            Err(e) => {
                log::warn!("ReportResult for request {} failed: {}", report.request_id, e);
                Err(e.into())
            }
        }
    }
}

pub async fn start_dispatch_grpc_server(
    node: Arc<DispatchNode>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service = DispatchServiceServer::new(DispatchGrpcService::new(node));

    log::info!("Starting dispatch gRPC server on {}", addr);
    match tonic::transport::Server::builder().add_service(service).serve(addr).await {
        Ok(_) => {
            log::info!("Dispatch gRPC server stopped normally");
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to start dispatch gRPC server on {}: {}", addr, e);
            Err(Box::new(e))
        }
    }
}

pub async fn start_coordinator_grpc_server(
    coordinator: Arc<Coordinator>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service = CoordinatorServiceServer::new(CoordinatorGrpcService::new(coordinator));

    log::info!("Starting coordinator gRPC server on {}", addr);
    match tonic::transport::Server::builder().add_service(service).serve(addr).await {
        Ok(_) => {
            log::info!("Coordinator gRPC server stopped normally");
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to start coordinator gRPC server on {}: {}", addr, e);
            Err(Box::new(e))
        }
    }
}
