use async_trait::async_trait;
use normalizer::Event;

use crate::errors::Result;
use crate::models::{EventQuery, EventRow};

/// Append-only event log.
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn insert(&self, event: &Event) -> Result<()>;
    /// Newest first by the formatted `timestamp` string.
    async fn list_recent(&self, query: EventQuery) -> Result<Vec<EventRow>>;
}

#[async_trait]
pub trait Repositories: Send + Sync {
    fn events(&self) -> &dyn EventRepository;
    /// Liveness probe against the backing store.
    async fn ping(&self) -> Result<()>;
}
