use std::sync::Arc;
use std::time::Duration;

use db::Repositories;
use normalizer::{normalize, parse_payload, Event, IgnoreReason, Normalized, PayloadExt};
use serde_json::{json, Value};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::error::IngressError;
use crate::metrics;

/// What the receiver answers for one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Pong { zen: String },
    Ignored(IgnoreReason),
    Stored(Event),
}

impl Reply {
    pub fn into_body(self) -> Result<Value, IngressError> {
        let body = match self {
            Reply::Pong { zen } => json!({ "message": "pong", "zen": zen }),
            Reply::Ignored(IgnoreReason::PullRequestAction(action)) => {
                json!({ "message": "ok", "action": action })
            }
            Reply::Ignored(IgnoreReason::UnsupportedEvent(event)) => {
                json!({ "message": "ok", "event": event })
            }
            Reply::Ignored(IgnoreReason::EmptyLabel | IgnoreReason::Ping) => {
                json!({ "message": "ok" })
            }
            Reply::Stored(event) => {
                let event = serde_json::to_value(event)?;
                json!({ "message": "Event stored", "event": event })
            }
        };
        Ok(body)
    }

    fn outcome(&self) -> &'static str {
        match self {
            Reply::Pong { .. } => "pong",
            Reply::Ignored(_) => "ignored",
            Reply::Stored(_) => "stored",
        }
    }
}

/// Turns raw deliveries into events and records them best-effort.
pub struct Ingress {
    repositories: Arc<dyn Repositories>,
    store_timeout: Duration,
}

impl Ingress {
    pub fn new(repositories: Arc<dyn Repositories>, store_timeout: Duration) -> Self {
        Self {
            repositories,
            store_timeout,
        }
    }

    /// Classifies and, for real events, persists one delivery. Store failures
    /// are logged and swallowed; the reply is the same either way.
    #[instrument(
        skip(self, event_type, body),
        fields(event_type = %event_type, body_len = body.len())
    )]
    pub async fn handle(&self, event_type: &str, body: &[u8]) -> Reply {
        let payload = parse_payload(body);

        let reply = if event_type.trim().eq_ignore_ascii_case("ping") {
            Reply::Pong {
                zen: payload.str_at(&["zen"]).to_owned(),
            }
        } else {
            match normalize(event_type, &payload) {
                Normalized::Ignored(reason) => {
                    debug!(%reason, "delivery ignored");
                    Reply::Ignored(reason)
                }
                Normalized::Event(event) => {
                    self.store(&event).await;
                    Reply::Stored(event)
                }
            }
        };

        metrics::WEBHOOK_DELIVERIES_TOTAL
            .with_label_values(&[reply.outcome()])
            .inc();
        reply
    }

    async fn store(&self, event: &Event) {
        match timeout(self.store_timeout, self.repositories.events().insert(event)).await {
            Ok(Ok(())) => {
                info!(
                    request_id = %event.request_id,
                    action = %event.action,
                    author = %event.author,
                    "event stored"
                );
            }
            Ok(Err(err)) => {
                metrics::WEBHOOK_STORE_FAILURES_TOTAL
                    .with_label_values(&["error"])
                    .inc();
                warn!(request_id = %event.request_id, error = %err, "event write failed; dropped");
            }
            Err(_) => {
                metrics::WEBHOOK_STORE_FAILURES_TOTAL
                    .with_label_values(&["timeout"])
                    .inc();
                warn!(
                    request_id = %event.request_id,
                    timeout_ms = self.store_timeout.as_millis(),
                    "event write timed out; dropped"
                );
            }
        }
    }
}
