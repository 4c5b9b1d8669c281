use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::Snapshot;
use crate::modules::RepositoryError;

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Persistence seam for captured snapshots.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Most recent snapshot for a target, by creation time.
    async fn latest_for(&self, target_id: &str) -> Result<Option<Snapshot>>;
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;
    /// Full history for a target, newest first.
    async fn list_for(&self, target_id: &str) -> Result<Vec<Snapshot>>;
    async fn delete(&self, snapshot_id: &str) -> Result<bool>;
    async fn mark_resolved(&self, snapshot_id: &str, time: DateTime<Utc>) -> Result<bool>;
}
