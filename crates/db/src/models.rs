use chrono::{DateTime, Utc};
use normalizer::{Event, EventAction};
use sqlx::FromRow;

/// Stored form of an [`Event`]. `id` and `received_at` are assigned by the
/// database and never leave the store layer.
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: i64,
    pub request_id: String,
    pub author: String,
    pub action: String,
    pub from_branch: String,
    pub to_branch: String,
    pub timestamp: String,
    pub received_at: DateTime<Utc>,
}

impl EventRow {
    pub fn into_event(self) -> Event {
        Event {
            request_id: self.request_id,
            author: self.author,
            action: EventAction::from_tag(&self.action),
            from_branch: self.from_branch,
            to_branch: self.to_branch,
            timestamp: self.timestamp,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// `None` returns every stored event.
    pub limit: Option<i64>,
}
