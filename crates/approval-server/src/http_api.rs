//! Request-facing HTTP surfaces of the coordinator and the dispatch node

use approval_core::{ApprovalError, Coordinator, DispatchNode};
use approval_types::{ApprovalRequest, Decision, EmployeeId, NewApprovalRequest, RequestId, StepReport, WorkItem};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DELETE_REFUSED: &str = "Deletion is not allowed. The process ends only upon rejection.";

#[derive(Debug)]
pub enum ApiError {
    Approval(ApprovalError),
    Http { status: StatusCode, message: String },
}

impl From<ApprovalError> for ApiError {
    fn from(e: ApprovalError) -> Self {
        Self::Approval(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Approval(ApprovalError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Http { status, message } => {
                (status, Json(serde_json::json!({ "error": message }))).into_response()
            }
            ApiError::Approval(err) => {
                let status =
                    StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let mut body = serde_json::json!({ "error": err.to_string(), "kind": err.kind() });
                match &err {
                    ApprovalError::UpstreamUnavailable {
                        request_id: Some(id), ..
                    }
                    | ApprovalError::NextStepNotDispatched { request_id: id, .. } => {
                        body["requestId"] = serde_json::json!(id);
                    }
                    _ => {}
                }
                (status, Json(body)).into_response()
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub request_id: RequestId,
}

#[derive(Debug, Deserialize)]
pub struct DecisionBody {
    pub status: String,
}

async fn health(role: &'static str) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "role": role }))
}

pub fn coordinator_router(coordinator: Arc<Coordinator>) -> Router {
    Router::new()
        .route("/approvals", post(create_approval).get(list_approvals))
        .route("/approvals/:id", get(get_approval).delete(delete_approval))
        .route("/health", get(|| health("coordinator")))
        .with_state(coordinator)
}

async fn create_approval(
    State(coordinator): State<Arc<Coordinator>>,
    body: Result<Json<NewApprovalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let Json(body) = body?;
    let request_id = coordinator.create_request(body).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { request_id })))
}

async fn list_approvals(
    State(coordinator): State<Arc<Coordinator>>,
) -> Result<Json<Vec<ApprovalRequest>>, ApiError> {
    Ok(Json(coordinator.list().await?))
}

async fn get_approval(
    State(coordinator): State<Arc<Coordinator>>,
    Path(id): Path<i64>,
) -> Result<Json<ApprovalRequest>, ApiError> {
    Ok(Json(coordinator.get(RequestId::new(id)).await?))
}

async fn delete_approval(Path(_id): Path<i64>) -> ApiError {
    ApiError::Http {
        status: StatusCode::METHOD_NOT_ALLOWED,
        message: DELETE_REFUSED.to_string(),
    }
}

pub fn dispatch_router(node: Arc<DispatchNode>) -> Router {
    Router::new()
        .route("/process/:approver_id", get(get_queue))
        .route("/process/:approver_id/:request_id", post(decide))
        .route("/health", get(dispatch_health))
        .with_state(node)
}

async fn dispatch_health(State(node): State<Arc<DispatchNode>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "role": "dispatch",
        "approversWaiting": node.approvers_waiting()
    }))
}

async fn get_queue(
    State(node): State<Arc<DispatchNode>>,
    Path(approver_id): Path<i64>,
) -> Json<Vec<WorkItem>> {
    Json(node.get_queue(EmployeeId::new(approver_id)))
}

async fn decide(
    State(node): State<Arc<DispatchNode>>,
    Path((approver_id, request_id)): Path<(i64, i64)>,
    body: Result<Json<DecisionBody>, JsonRejection>,
) -> Result<Json<StepReport>, ApiError> {
    let Json(body) = body?;
    let decision: Decision = body.status.parse().map_err(ApprovalError::from)?;

    let report = node
        .decide(EmployeeId::new(approver_id), RequestId::new(request_id), decision)
        .await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approval_core::clients::StaticDirectory;
    use approval_core::{ChannelRegistry, DispatchQueue, MemoryWorkflowStore};
    use approval_types::FinalStatus;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    struct Apps {
        coordinator: Router,
        dispatch: Router,
    }

    fn apps() -> Apps {
        let queue = Arc::new(DispatchQueue::new());
        let coordinator = Arc::new(Coordinator::new(
            Arc::new(MemoryWorkflowStore::new()),
            Arc::new(StaticDirectory::new([1, 2, 3].map(EmployeeId::new))),
            queue.clone(),
            Arc::new(ChannelRegistry::new()),
        ));
        let node = Arc::new(DispatchNode::new(queue, coordinator.clone()));
        Apps {
            coordinator: coordinator_router(coordinator),
            dispatch: dispatch_router(node),
        }
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create(apps: &Apps, steps: serde_json::Value) -> Response {
        apps.coordinator
            .clone()
            .oneshot(json_request(
                "POST",
                "/approvals",
                serde_json::json!({
                    "requesterId": 1,
                    "title": "New monitor",
                    "content": "27 inch",
                    "steps": steps
                }),
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_approve_over_http() {
        let apps = apps();

        let response = create(&apps, serde_json::json!([{"step": 1, "approverId": 2}])).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = body_json(response).await["requestId"].as_i64().unwrap();

        let response = apps
            .dispatch
            .clone()
            .oneshot(empty_request("GET", "/process/2"))
            .await
            .unwrap();
        let queue = body_json(response).await;
        assert_eq!(queue[0]["requestId"], id);
        assert_eq!(queue[0]["step"], 1);

        let response = apps
            .dispatch
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/process/2/{}", id),
                serde_json::json!({"status": "approved"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = apps
            .coordinator
            .clone()
            .oneshot(empty_request("GET", &format!("/approvals/{}", id)))
            .await
            .unwrap();
        let doc: ApprovalRequest = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(doc.final_status, FinalStatus::Approved);
    }

    #[tokio::test]
    async fn test_create_with_gap_is_bad_request() {
        let apps = apps();
        let response = create(
            &apps,
            serde_json::json!([{"step": 1, "approverId": 2}, {"step": 3, "approverId": 3}]),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["kind"], "ValidationError");
    }

    #[tokio::test]
    async fn test_create_with_unknown_approver_is_bad_request() {
        let apps = apps();
        let response = create(&apps, serde_json::json!([{"step": 1, "approverId": 99}])).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["kind"], "UnknownApprover");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let apps = apps();
        let response = apps
            .coordinator
            .clone()
            .oneshot(json_request("POST", "/approvals", serde_json::json!({"title": 5})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_request_is_not_found() {
        let apps = apps();
        let response = apps
            .coordinator
            .clone()
            .oneshot(empty_request("GET", "/approvals/12345"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_is_refused() {
        let apps = apps();
        let response = apps
            .coordinator
            .clone()
            .oneshot(empty_request("DELETE", "/approvals/1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(response).await["error"], DELETE_REFUSED);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let apps = apps();
        let first = body_json(create(&apps, serde_json::json!([{"step": 1, "approverId": 2}])).await).await;
        let second = body_json(create(&apps, serde_json::json!([{"step": 1, "approverId": 3}])).await).await;

        let response = apps
            .coordinator
            .clone()
            .oneshot(empty_request("GET", "/approvals"))
            .await
            .unwrap();
        let list = body_json(response).await;
        assert_eq!(list[0]["requestId"], second["requestId"]);
        assert_eq!(list[1]["requestId"], first["requestId"]);
    }

    #[tokio::test]
    async fn test_empty_queue_and_unqueued_decision() {
        let apps = apps();

        let response = apps
            .dispatch
            .clone()
            .oneshot(empty_request("GET", "/process/2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));

        let response = apps
            .dispatch
            .clone()
            .oneshot(json_request("POST", "/process/2/1", serde_json::json!({"status": "approved"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["kind"], "NotFoundInQueue");
    }

    #[tokio::test]
    async fn test_unknown_decision_is_bad_request() {
        let apps = apps();
        let response = apps
            .dispatch
            .clone()
            .oneshot(json_request("POST", "/process/2/1", serde_json::json!({"status": "later"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dispatch_health_counts_waiting_approvers() {
        let apps = apps();
        create(&apps, serde_json::json!([{"step": 1, "approverId": 2}])).await;

        let response = apps
            .dispatch
            .clone()
            .oneshot(empty_request("GET", "/health"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["approversWaiting"], 1);
    }

    #[test]
    fn test_unqueued_next_step_reports_request_id() {
        let response = ApiError::from(ApprovalError::NextStepNotDispatched {
            request_id: RequestId::new(31),
            reason: "dispatch node unavailable".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
