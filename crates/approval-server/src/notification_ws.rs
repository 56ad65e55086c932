//! Notification fan-out: trigger endpoint and WebSocket push channel

use crate::http_api::ApiError;
use approval_core::{ApprovalError, ChannelRegistry};
use approval_types::{EmployeeId, NotifyRequest, NotifyResponse};
use axum::extract::rejection::JsonRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;

/// `POST /notify` and `GET /health`
pub fn notify_router(registry: Arc<ChannelRegistry>) -> Router {
    Router::new()
        .route("/notify", post(notify))
        .route("/health", get(health))
        .with_state(registry)
}

/// `GET /ws?userId=` upgrades to the push channel
pub fn push_router(registry: Arc<ChannelRegistry>) -> Router {
    Router::new().route("/ws", get(connect)).with_state(registry)
}

async fn health(State(registry): State<Arc<ChannelRegistry>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "role": "notification",
        "connections": registry.connected_count()
    }))
}

async fn notify(
    State(registry): State<Arc<ChannelRegistry>>,
    body: Result<Json<NotifyRequest>, JsonRejection>,
) -> Result<Json<NotifyResponse>, ApiError> {
    let Json(body) = body?;
    let status = registry.notify(body.target_id, body.payload);
    Ok(Json(NotifyResponse { status }))
}

#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    #[serde(rename = "userId", alias = "id")]
    pub user_id: Option<String>,
}

async fn connect(
    State(registry): State<Arc<ChannelRegistry>>,
    Query(params): Query<ConnectParams>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let raw = params
        .user_id
        .ok_or_else(|| ApprovalError::Validation("userId query parameter is required".to_string()))?;
    let user_id: EmployeeId = raw.parse().map_err(ApprovalError::from)?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, registry, user_id)))
}

/// Forward pushed payloads until either side goes away
async fn handle_socket(socket: WebSocket, registry: Arc<ChannelRegistry>, user_id: EmployeeId) {
    let (connection_id, mut outbox) = registry.connect(user_id);
    let (mut ws_sink, mut ws_stream) = socket.split();

    loop {
        tokio::select! {
            pushed = outbox.recv() => match pushed {
                Some(payload) => {
                    if let Err(e) = ws_sink.send(Message::Text(payload.to_string())).await {
                        log::warn!("Push to user {} failed: {}", user_id, e);
                        break;
                    }
                }
                // Replaced by a newer connection for the same user
                None => {
                    let _ = ws_sink.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = ws_stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    log::debug!("Socket error for user {}: {}", user_id, e);
                    break;
                }
                // Client messages carry no meaning after connect
                Some(Ok(_)) => {}
            },
        }
    }

    registry.disconnect(user_id, connection_id);
}
