use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::{json, Map, Value};

use crate::services::classifier::AlertTier;
use crate::services::signature::generate_signature;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("webhook returned status {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Everything needed to notify a webhook about one alert.
#[derive(Debug, Clone)]
pub struct AlertNotification<'a> {
    pub webhook_url: &'a str,
    /// Target-configured payload template; must be a JSON object to
    /// contribute any fields.
    pub template: Option<&'a Value>,
    pub target_url: &'a str,
    pub tier: AlertTier,
    pub change_percentage: f64,
    pub timestamp: DateTime<Utc>,
}

/// Sends webhook notifications for alert-worthy checks.
///
/// Notification is best-effort: one outbound POST per alert, no retries.
/// Failures are reported to the caller as a `DispatchError` so they can be
/// logged and counted, but they never fail the check that raised the alert.
pub struct AlertDispatcher {
    client: Client,
    secret: Option<String>,
}

impl AlertDispatcher {
    pub fn new(timeout: Duration, secret: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self { client, secret }
    }

    /// Send a single notification attempt.
    pub async fn send(&self, notification: &AlertNotification<'_>) -> Result<(), DispatchError> {
        let payload = build_payload(notification);
        let payload_json = serde_json::to_string(&payload)?;

        let mut request = self
            .client
            .post(notification.webhook_url)
            .header("Content-Type", "application/json")
            .header("User-Agent", concat!("sitewatch/", env!("CARGO_PKG_VERSION")));

        if let Some(secret) = &self.secret {
            let timestamp = notification.timestamp.timestamp();
            let signature = generate_signature(secret, timestamp, &payload_json);
            request = request
                .header("X-Watch-Signature", signature)
                .header("X-Watch-Timestamp", timestamp.to_string());
        }

        let response = request.body(payload_json).send().await.map_err(|e| {
            if e.is_timeout() {
                DispatchError::Timeout
            } else {
                DispatchError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status(status.as_u16()));
        }

        tracing::info!(
            webhook_url = notification.webhook_url,
            tier = notification.tier.as_str(),
            "Alert notification delivered"
        );

        Ok(())
    }
}

/// Merge the target's payload template with the computed alert fields.
///
/// The template contributes its fields only when it is a JSON object; the
/// computed keys (`url`, `alert_level`, `change_percentage`, `timestamp`)
/// always override template keys of the same name.
pub fn build_payload(notification: &AlertNotification<'_>) -> Value {
    let mut fields = match notification.template {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };

    fields.insert("url".to_string(), json!(notification.target_url));
    fields.insert(
        "alert_level".to_string(),
        json!(notification.tier.as_str()),
    );
    fields.insert(
        "change_percentage".to_string(),
        json!(notification.change_percentage * 100.0),
    );
    fields.insert(
        "timestamp".to_string(),
        json!(notification.timestamp.to_rfc3339()),
    );

    Value::Object(fields)
}
