use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::FutureExt;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::IngressError;
use crate::routes::ApiState;

/// Liveness answer for plain `GET`s on the receiver.
pub async fn probe() -> Json<Value> {
    Json(json!({ "message": "Webhook OK", "status": "active" }))
}

/// Delivery endpoint. Whatever happens inside, including a panic, the
/// sender gets a 200.
pub async fn receive(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    match AssertUnwindSafe(deliver(&state, &headers, body))
        .catch_unwind()
        .await
    {
        Ok(Ok(reply)) => (StatusCode::OK, Json(reply)).into_response(),
        Ok(Err(err)) => err.into_response(),
        Err(panic) => IngressError::from_panic(panic).into_response(),
    }
}

async fn deliver(
    state: &ApiState,
    headers: &HeaderMap,
    body: Body,
) -> Result<Value, IngressError> {
    let event_type = headers
        .get(state.event_header.as_str())
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let body = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "unreadable delivery body; treating as empty");
            Bytes::new()
        }
    };

    state.ingress.handle(event_type, &body).await.into_body()
}
