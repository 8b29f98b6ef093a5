use std::env;

use anyhow::{Context, Result};
use common::config::{AppConfig, DatabaseConfig};
use db::pg::{run_migrations, PgDatabase};
use sqlx::{Executor, PgPool};
use tracing::debug;
use uuid::Uuid;

/// Creates throwaway databases on a server reachable through an admin URL
/// (a connection string without the database path).
pub struct DbFixture {
    admin_url: String,
}

impl DbFixture {
    pub fn from_env() -> Result<Self> {
        let admin_url = env::var("TEST_ADMIN_URL")
            .or_else(|_| env::var("DATABASE_URL"))
            .ok()
            .or_else(|| {
                AppConfig::load()
                    .ok()
                    .and_then(|config| config.database.test_admin_url)
            })
            .context("TEST_ADMIN_URL or DATABASE_URL must be set for tests")?;
        Ok(Self { admin_url })
    }

    pub async fn create(&self, prefix: &str) -> Result<DatabaseHandle> {
        let handle = self.create_unmigrated(prefix).await?;
        run_migrations(handle.pool()).await?;
        Ok(handle)
    }

    pub async fn create_unmigrated(&self, prefix: &str) -> Result<DatabaseHandle> {
        let db_name = format!("{}_{}", prefix, Uuid::new_v4().simple());
        let admin_pool = PgPool::connect(&self.admin_url).await?;
        let create_sql = format!("CREATE DATABASE \"{}\"", db_name);
        admin_pool.execute(create_sql.as_str()).await?;
        let database_url = format!("{}/{}", self.admin_url, db_name);
        let pool = PgPool::connect(&database_url).await?;
        debug!(database = %db_name, "created test database");
        Ok(DatabaseHandle {
            pool,
            name: db_name,
            admin_url: self.admin_url.clone(),
            database_url,
        })
    }
}

pub struct DatabaseHandle {
    pool: PgPool,
    name: String,
    admin_url: String,
    database_url: String,
}

impl DatabaseHandle {
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database_url.clone(),
            max_connections: 2,
            acquire_timeout_ms: 3_000,
            test_admin_url: Some(self.admin_url.clone()),
        }
    }

    /// Store handle over this database's pool, for driving the repositories.
    pub fn database(&self) -> PgDatabase {
        PgDatabase::from_pool(self.pool.clone())
    }

    pub async fn cleanup(self) -> Result<()> {
        drop(self.pool);
        let admin_pool = PgPool::connect(&self.admin_url).await?;
        let terminate_sql = format!(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}'",
            self.name
        );
        admin_pool.execute(terminate_sql.as_str()).await?;
        let drop_sql = format!("DROP DATABASE IF EXISTS \"{}\"", self.name);
        admin_pool.execute(drop_sql.as_str()).await?;
        Ok(())
    }
}
