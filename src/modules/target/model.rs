use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::classifier::Thresholds;
use crate::services::fetch::RenderMode;

/// A URL under watch.
///
/// Owned by the orchestration layer: `last_checked_at` is advanced only by
/// the check path (and is monotonically non-decreasing), everything else
/// changes only through the management API.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Target {
    pub id: String,
    pub url: String,
    pub name: Option<String>,
    /// Hours between checks, >= 1.
    pub check_frequency_hours: i32,
    pub is_active: bool,
    /// Change fraction in [0, 1] that raises a yellow alert; defaulted at
    /// classification time when unset.
    pub yellow_threshold: Option<f64>,
    /// Change fraction in [0, 1] that raises a red alert.
    pub red_threshold: Option<f64>,
    pub webhook_url: Option<String>,
    /// Arbitrary JSON object merged into the webhook payload.
    pub webhook_payload: Option<serde_json::Value>,
    /// Fetch through the JS-rendering backend instead of a plain GET.
    pub render_js: bool,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Target {
    pub fn render_mode(&self) -> RenderMode {
        if self.render_js {
            RenderMode::Rendered
        } else {
            RenderMode::Plain
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds::from_target(self.yellow_threshold, self.red_threshold)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url)
    }
}
