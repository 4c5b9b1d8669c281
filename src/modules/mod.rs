pub mod metrics;
pub mod snapshot;
pub mod target;

/// Persistence-layer failure surfaced through the repository traits.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("record not found")]
    NotFound,
}
