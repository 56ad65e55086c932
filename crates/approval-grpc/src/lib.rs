//! gRPC code for the result relay protocol between coordinator and dispatch node

pub mod approval {
    pub mod v1 {
        // Checked-in output of the proto compiler for proto/approval.proto
        include!("generated/approval.v1.rs");
    }
}

// Convenience re-exports
pub use approval::v1::*;

// Re-export service traits
pub use approval::v1::dispatch_service_server::{DispatchService, DispatchServiceServer};
pub use approval::v1::coordinator_service_server::{CoordinatorService, CoordinatorServiceServer};

// Re-export client types
pub use approval::v1::dispatch_service_client::DispatchServiceClient;
pub use approval::v1::coordinator_service_client::CoordinatorServiceClient;

/// Status string returned by `Submit` when the work item was queued
pub const SUBMIT_RECEIVED: &str = "received";

/// Status string returned by `ReportResult` when the decision was applied
pub const REPORT_SUCCESS: &str = "success";
