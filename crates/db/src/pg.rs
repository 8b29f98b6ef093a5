use std::sync::Arc;

use async_trait::async_trait;
use common::config::DatabaseConfig;
use normalizer::Event;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::time::{sleep, Duration};
use tracing::{instrument, warn};

use crate::errors::{DbError, Result};
use crate::models::{EventQuery, EventRow};
use crate::repositories::{EventRepository, Repositories};

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(DbError::Migration)
}

#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
    event_repo: Arc<PgEventRepository>,
}

impl PgDatabase {
    /// Connects with bounded exponential backoff and applies migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        const MAX_ATTEMPTS: u32 = 5;
        const BASE_DELAY_MS: u64 = 500;

        let mut attempts = 0;
        loop {
            match pool_options(config).connect(&config.url).await {
                Ok(pool) => {
                    run_migrations(&pool).await?;
                    return Ok(Self::from_pool(pool));
                }
                Err(err) => {
                    attempts += 1;
                    if attempts >= MAX_ATTEMPTS {
                        return Err(DbError::Query(err));
                    }

                    let exp = (attempts - 1).min(5);
                    let backoff = Duration::from_millis(BASE_DELAY_MS * (1u64 << exp));
                    warn!(
                        attempts,
                        error = %err,
                        wait_ms = backoff.as_millis(),
                        "database connection failed; retrying"
                    );
                    sleep(backoff).await;
                }
            }
        }
    }

    /// Builds a pool without touching the network. Connections are opened on
    /// first use, so a store that is down surfaces as per-query errors.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self> {
        pool_options(config)
            .connect_lazy(&config.url)
            .map(Self::from_pool)
            .map_err(DbError::Query)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let event_repo = Arc::new(PgEventRepository { pool: pool.clone() });
        Self { pool, event_repo }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_millis(config.acquire_timeout_ms))
}

#[async_trait]
impl Repositories for PgDatabase {
    fn events(&self) -> &dyn EventRepository {
        &*self.event_repo
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(DbError::Query)
    }
}

#[derive(Clone)]
struct PgEventRepository {
    pool: PgPool,
}

#[async_trait]
impl EventRepository for PgEventRepository {
    #[instrument(skip(self, event), fields(request_id = %event.request_id, action = %event.action))]
    async fn insert(&self, event: &Event) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO events (request_id, author, action, from_branch, to_branch, "timestamp")
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&event.request_id)
        .bind(&event.author)
        .bind(event.action.as_str())
        .bind(&event.from_branch)
        .bind(&event.to_branch)
        .bind(&event.timestamp)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(DbError::Query)
    }

    #[instrument(skip(self))]
    async fn list_recent(&self, query: EventQuery) -> Result<Vec<EventRow>> {
        // LIMIT NULL is LIMIT ALL in PostgreSQL.
        sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, request_id, author, action, from_branch, to_branch, "timestamp", received_at
            FROM events
            ORDER BY "timestamp" COLLATE "C" DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::Query)
    }
}
