use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, Pool};

use super::interface::TargetRepository;
use super::model::Target;
use super::schema::UpdateTargetRequest;
use crate::modules::RepositoryError;

pub struct TargetCrud {
    pool: Pool<MySql>,
}

impl TargetCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, target: &Target) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO targets (
                id, url, name, check_frequency_hours, is_active,
                yellow_threshold, red_threshold, webhook_url, webhook_payload,
                render_js, last_checked_at, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&target.id)
        .bind(&target.url)
        .bind(&target.name)
        .bind(target.check_frequency_hours)
        .bind(target.is_active)
        .bind(target.yellow_threshold)
        .bind(target.red_threshold)
        .bind(&target.webhook_url)
        .bind(&target.webhook_payload)
        .bind(target.render_js)
        .bind(target.last_checked_at)
        .bind(target.created_at)
        .bind(target.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_all(&self) -> Result<Vec<Target>, sqlx::Error> {
        sqlx::query_as::<_, Target>("SELECT * FROM targets ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Target>, sqlx::Error> {
        sqlx::query_as::<_, Target>("SELECT * FROM targets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Apply a partial update; unset fields keep their current value.
    pub async fn update(
        &self,
        id: &str,
        req: &UpdateTargetRequest,
    ) -> Result<Option<Target>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE targets SET
                url = COALESCE(?, url),
                name = COALESCE(?, name),
                check_frequency_hours = COALESCE(?, check_frequency_hours),
                is_active = COALESCE(?, is_active),
                yellow_threshold = COALESCE(?, yellow_threshold),
                red_threshold = COALESCE(?, red_threshold),
                webhook_url = COALESCE(?, webhook_url),
                webhook_payload = COALESCE(?, webhook_payload),
                render_js = COALESCE(?, render_js),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.url)
        .bind(&req.name)
        .bind(req.check_frequency_hours)
        .bind(req.is_active)
        .bind(req.yellow_threshold)
        .bind(req.red_threshold)
        .bind(&req.webhook_url)
        .bind(&req.webhook_payload)
        .bind(req.render_js)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM targets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TargetRepository for TargetCrud {
    async fn list_active(&self) -> Result<Vec<Target>, RepositoryError> {
        let targets = sqlx::query_as::<_, Target>(
            "SELECT * FROM targets WHERE is_active = TRUE ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(targets)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Target>, RepositoryError> {
        Ok(self.get(id).await?)
    }

    /// Advance the last-checked marker. The guard clause keeps it
    /// monotonically non-decreasing even if calls land out of order.
    async fn touch_last_checked(&self, id: &str, time: DateTime<Utc>) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE targets SET last_checked_at = ?
            WHERE id = ? AND (last_checked_at IS NULL OR last_checked_at <= ?)
            "#,
        )
        .bind(time)
        .bind(id)
        .bind(time)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
