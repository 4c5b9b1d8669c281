use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::Target;
use crate::modules::RepositoryError;

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Persistence seam for monitored targets, as used by the check path.
///
/// Management CRUD lives on the concrete store; the orchestration layer
/// only ever lists active targets, resolves one by id, and advances the
/// last-checked marker.
#[async_trait]
pub trait TargetRepository: Send + Sync {
    async fn list_active(&self) -> Result<Vec<Target>>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Target>>;
    async fn touch_last_checked(&self, id: &str, time: DateTime<Utc>) -> Result<()>;
}
