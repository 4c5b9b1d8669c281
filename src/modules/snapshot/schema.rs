use chrono::{DateTime, Utc};
use serde::Serialize;

use super::model::Snapshot;
use crate::services::classifier::AlertTier;

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub id: String,
    pub target_id: String,
    pub content_hash: String,
    pub content_length: i64,
    pub text_excerpt: String,
    pub http_status: i32,
    pub alert_tier: AlertTier,
    pub change_percentage: f64,
    pub raw_blob_path: Option<String>,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Snapshot> for SnapshotResponse {
    fn from(s: Snapshot) -> Self {
        Self {
            id: s.id,
            target_id: s.target_id,
            content_hash: s.content_hash,
            content_length: s.content_length,
            text_excerpt: s.text_excerpt,
            http_status: s.http_status,
            alert_tier: s.alert_tier,
            change_percentage: s.change_percentage,
            raw_blob_path: s.raw_blob_path,
            resolved: s.resolved,
            resolved_at: s.resolved_at,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
