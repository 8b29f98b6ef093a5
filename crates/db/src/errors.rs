#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("query error: {0}")]
    Query(#[source] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub type Result<T> = std::result::Result<T, DbError>;
