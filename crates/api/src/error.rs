use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::metrics;

/// Fault raised while handling a delivery. It never reaches the sender as a
/// failure: the response is always the plain acknowledgement.
#[derive(Debug, thiserror::Error)]
pub enum IngressError {
    #[error("failed to encode reply: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("handler panicked: {0}")]
    Panic(String),
}

impl IngressError {
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panic(message)
    }
}

impl IntoResponse for IngressError {
    fn into_response(self) -> Response {
        error!(error = %self, "webhook delivery fault; acknowledging anyway");
        metrics::WEBHOOK_DELIVERIES_TOTAL
            .with_label_values(&["fault"])
            .inc();
        metrics::WEBHOOK_FAULTS_TOTAL.inc();
        (StatusCode::OK, Json(json!({ "message": "ok" }))).into_response()
    }
}

#[derive(Debug)]
pub enum ApiError {
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = Json(ErrorBody { error: message });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
