#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api::{build_router, ApiState};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use common::config::WebhookConfig;
use db::errors::Result;
use db::models::{EventQuery, EventRow};
use db::{DbError, EventRepository, Repositories};
use normalizer::Event;
use serde_json::Value;
use tower::util::ServiceExt;

/// How the fake store reacts to writes.
#[derive(Clone, Copy, Debug, Default)]
pub enum StoreMode {
    #[default]
    Healthy,
    Failing,
    Stalled(Duration),
    Panicking,
}

#[derive(Default)]
pub struct MemoryEvents {
    mode: StoreMode,
    rows: Mutex<Vec<EventRow>>,
    attempts: AtomicUsize,
}

#[async_trait::async_trait]
impl EventRepository for MemoryEvents {
    async fn insert(&self, event: &Event) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            StoreMode::Healthy => {}
            StoreMode::Failing => return Err(DbError::Query(sqlx::Error::PoolTimedOut)),
            StoreMode::Stalled(delay) => tokio::time::sleep(delay).await,
            StoreMode::Panicking => panic!("store driver blew up"),
        }
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push(EventRow {
            id,
            request_id: event.request_id.clone(),
            author: event.author.clone(),
            action: event.action.as_str().to_string(),
            from_branch: event.from_branch.clone(),
            to_branch: event.to_branch.clone(),
            timestamp: event.timestamp.clone(),
            received_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_recent(&self, query: EventQuery) -> Result<Vec<EventRow>> {
        if matches!(self.mode, StoreMode::Failing) {
            return Err(DbError::Query(sqlx::Error::PoolTimedOut));
        }
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        if let Some(limit) = query.limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }
}

#[derive(Default)]
pub struct MemoryRepositories {
    pub events: MemoryEvents,
}

impl MemoryRepositories {
    pub fn with_mode(mode: StoreMode) -> Self {
        Self {
            events: MemoryEvents {
                mode,
                ..MemoryEvents::default()
            },
        }
    }

    pub fn seeded(rows: Vec<EventRow>) -> Self {
        Self {
            events: MemoryEvents {
                rows: Mutex::new(rows),
                ..MemoryEvents::default()
            },
        }
    }

    pub fn stored(&self) -> Vec<EventRow> {
        self.events.rows.lock().unwrap().clone()
    }

    pub fn write_attempts(&self) -> usize {
        self.events.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Repositories for MemoryRepositories {
    fn events(&self) -> &dyn EventRepository {
        &self.events
    }

    async fn ping(&self) -> Result<()> {
        match self.events.mode {
            StoreMode::Failing => Err(DbError::Query(sqlx::Error::PoolTimedOut)),
            _ => Ok(()),
        }
    }
}

pub fn webhook_config() -> WebhookConfig {
    WebhookConfig {
        store_timeout_ms: 100,
        ..WebhookConfig::default()
    }
}

pub fn app(repositories: Arc<dyn Repositories>) -> Router {
    build_router(Arc::new(ApiState::new(
        repositories,
        &webhook_config(),
        "/metrics",
    )))
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(request).await.unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

pub fn delivery(event_type: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::post("/webhook/receiver").header("content-type", "application/json");
    if let Some(event_type) = event_type {
        builder = builder.header("X-GitHub-Event", event_type);
    }
    builder.body(body.into()).unwrap()
}
