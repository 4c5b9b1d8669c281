use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::classifier::AlertTier;
use crate::services::fingerprint::Fingerprint;

/// Stored normalized text is truncated to this many characters; enough for
/// display and diff browsing, while the hash covers the full content.
pub const EXCERPT_MAX_CHARS: usize = 10_000;

/// One captured observation of a target.
///
/// Snapshots are immutable once created, except for the resolved flag,
/// which an operator flips through the API. The sequence per target is
/// append-only and ordered by creation time; "latest" is the row with the
/// max creation time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Snapshot {
    pub id: String,
    pub target_id: String,
    /// SHA-256 of the full normalized text, lowercase hex.
    pub content_hash: String,
    /// Character count of the full normalized text.
    pub content_length: i64,
    pub text_excerpt: String,
    pub http_status: i32,
    pub alert_tier: AlertTier,
    /// Change fraction relative to the immediately preceding snapshot.
    pub change_percentage: f64,
    pub raw_blob_path: Option<String>,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    /// The fingerprint this snapshot was captured with, for comparing the
    /// next capture against.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            hash: self.content_hash.clone(),
            length: self.content_length.max(0) as usize,
        }
    }

    /// Truncate normalized text to the stored excerpt length.
    pub fn excerpt_of(text: &str) -> String {
        text.chars().take(EXCERPT_MAX_CHARS).collect()
    }
}
