use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use common::config::WebhookConfig;
use db::{EventQuery, Repositories};
use prometheus::Encoder;
use serde::Deserialize;
use serde_json::json;
use tracing::{instrument, warn};

use crate::dto::EventDto;
use crate::error::{ApiError, ApiResult};
use crate::ingress::Ingress;
use crate::metrics;
use crate::webhook;

const MAX_LIST_LIMIT: i64 = 1000;

pub struct ApiState {
    pub repositories: Arc<dyn Repositories>,
    pub ingress: Ingress,
    pub event_header: String,
    pub max_body_bytes: usize,
    pub metrics_path: String,
}

impl ApiState {
    pub fn new(
        repositories: Arc<dyn Repositories>,
        webhook: &WebhookConfig,
        metrics_path: impl Into<String>,
    ) -> Self {
        let ingress = Ingress::new(
            repositories.clone(),
            Duration::from_millis(webhook.store_timeout_ms),
        );
        Self {
            repositories,
            ingress,
            event_header: webhook.event_header.clone(),
            max_body_bytes: webhook.max_body_bytes,
            metrics_path: metrics_path.into(),
        }
    }
}

pub fn build_router(state: Arc<ApiState>) -> Router {
    let metrics_path = state.metrics_path.clone();
    Router::new()
        .route(
            "/webhook/receiver",
            get(webhook::probe).post(webhook::receive),
        )
        .route("/api/events", get(list_events))
        .route("/api/health", get(health))
        .route(&metrics_path, get(metrics))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    limit: Option<String>,
}

/// Display listing. A store failure degrades to an empty array, never an
/// error status.
#[instrument(skip(state))]
async fn list_events(
    State(state): State<Arc<ApiState>>,
    query: Option<Query<EventsQuery>>,
) -> Json<Vec<EventDto>> {
    let limit = query
        .and_then(|Query(query)| query.limit)
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .map(|limit| limit.clamp(1, MAX_LIST_LIMIT));

    match state
        .repositories
        .events()
        .list_recent(EventQuery { limit })
        .await
    {
        Ok(rows) => Json(rows.into_iter().map(EventDto::from).collect()),
        Err(err) => {
            metrics::EVENT_LIST_FAILURES_TOTAL.inc();
            warn!(error = %err, "failed to list events; returning empty list");
            Json(Vec::new())
        }
    }
}

#[instrument(skip(state))]
async fn health(State(state): State<Arc<ApiState>>) -> Response {
    match state.repositories.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "mongodb": "connected" })),
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, "store liveness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "mongodb": "disconnected",
                    "error": err.to_string(),
                })),
            )
                .into_response()
        }
    }
}

async fn metrics() -> ApiResult<impl IntoResponse> {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    let content_type = encoder.format_type().to_string();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok((
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, content_type)],
        buffer,
    ))
}
