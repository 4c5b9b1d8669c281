use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, Pool};

use super::interface::SnapshotRepository;
use super::model::Snapshot;
use crate::modules::RepositoryError;

pub struct SnapshotCrud {
    pool: Pool<MySql>,
}

impl SnapshotCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotRepository for SnapshotCrud {
    async fn latest_for(&self, target_id: &str) -> Result<Option<Snapshot>, RepositoryError> {
        let snapshot = sqlx::query_as::<_, Snapshot>(
            "SELECT * FROM snapshots WHERE target_id = ? ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(target_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(snapshot)
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO snapshots (
                id, target_id, content_hash, content_length, text_excerpt,
                http_status, alert_tier, change_percentage, raw_blob_path,
                resolved, resolved_at, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&snapshot.id)
        .bind(&snapshot.target_id)
        .bind(&snapshot.content_hash)
        .bind(snapshot.content_length)
        .bind(&snapshot.text_excerpt)
        .bind(snapshot.http_status)
        .bind(snapshot.alert_tier)
        .bind(snapshot.change_percentage)
        .bind(&snapshot.raw_blob_path)
        .bind(snapshot.resolved)
        .bind(snapshot.resolved_at)
        .bind(snapshot.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for(&self, target_id: &str) -> Result<Vec<Snapshot>, RepositoryError> {
        let snapshots = sqlx::query_as::<_, Snapshot>(
            "SELECT * FROM snapshots WHERE target_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(target_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(snapshots)
    }

    async fn delete(&self, snapshot_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM snapshots WHERE id = ?")
            .bind(snapshot_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_resolved(
        &self,
        snapshot_id: &str,
        time: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE snapshots SET resolved = TRUE, resolved_at = ? WHERE id = ?",
        )
        .bind(time)
        .bind(snapshot_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
