use serde::{Deserialize, Serialize};
use validator::Validate;

use super::model::Target;
use crate::services::classifier::AlertTier;

// =============================================================================
// CREATE / UPDATE
// =============================================================================

fn default_frequency_hours() -> i32 {
    24
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTargetRequest {
    #[validate(url(message = "Invalid target URL"))]
    pub url: String,

    #[validate(length(max = 255))]
    pub name: Option<String>,

    #[serde(default = "default_frequency_hours")]
    #[validate(range(min = 1, message = "Check frequency must be at least 1 hour"))]
    pub check_frequency_hours: i32,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[validate(range(min = 0.0, max = 1.0))]
    pub yellow_threshold: Option<f64>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub red_threshold: Option<f64>,

    #[validate(url(message = "Invalid webhook URL"))]
    pub webhook_url: Option<String>,

    pub webhook_payload: Option<serde_json::Value>,

    #[serde(default)]
    pub render_js: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTargetRequest {
    #[validate(url(message = "Invalid target URL"))]
    pub url: Option<String>,

    #[validate(length(max = 255))]
    pub name: Option<String>,

    #[validate(range(min = 1, message = "Check frequency must be at least 1 hour"))]
    pub check_frequency_hours: Option<i32>,

    pub is_active: Option<bool>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub yellow_threshold: Option<f64>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub red_threshold: Option<f64>,

    #[validate(url(message = "Invalid webhook URL"))]
    pub webhook_url: Option<String>,

    pub webhook_payload: Option<serde_json::Value>,

    pub render_js: Option<bool>,
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Serialize)]
pub struct TargetResponse {
    pub id: String,
    pub url: String,
    pub name: Option<String>,
    pub check_frequency_hours: i32,
    pub is_active: bool,
    pub yellow_threshold: Option<f64>,
    pub red_threshold: Option<f64>,
    pub webhook_url: Option<String>,
    pub webhook_payload: Option<serde_json::Value>,
    pub render_js: bool,
    pub last_checked_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Target> for TargetResponse {
    fn from(t: Target) -> Self {
        Self {
            id: t.id,
            url: t.url,
            name: t.name,
            check_frequency_hours: t.check_frequency_hours,
            is_active: t.is_active,
            yellow_threshold: t.yellow_threshold,
            red_threshold: t.red_threshold,
            webhook_url: t.webhook_url,
            webhook_payload: t.webhook_payload,
            render_js: t.render_js,
            last_checked_at: t.last_checked_at,
            created_at: t.created_at,
        }
    }
}

/// Result of a manually triggered check.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub success: bool,
    pub alert_level: AlertTier,
    pub change_percentage: f64,
    pub status_code: u16,
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
