use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::modules::snapshot::interface::SnapshotRepository;
use crate::modules::snapshot::model::Snapshot;
use crate::modules::target::interface::TargetRepository;
use crate::modules::target::model::Target;
use crate::modules::RepositoryError;
use crate::services::blob::BlobStore;
use crate::services::classifier::{classify, AlertTier};
use crate::services::dispatcher::{AlertDispatcher, AlertNotification};
use crate::services::events::{DomainEvent, EventBus};
use crate::services::fetch::{FetchError, FetchGateway};
use crate::services::fingerprint::fingerprint;
use crate::services::metrics::MetricsRegistry;
use crate::services::normalizer::{normalize, NormalizeError};

/// Failure of a single check, naming the stage that gave up.
///
/// A check failure is always per-target: the caller records it and moves
/// on to the next target. Webhook dispatch failures are deliberately not
/// represented here, notification is best-effort.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("content extraction failed: {0}")]
    Extraction(#[from] NormalizeError),
    #[error("persistence failed: {0}")]
    Repository(#[from] RepositoryError),
}

impl CheckError {
    /// Stage name for error payloads.
    pub fn stage(&self) -> &'static str {
        match self {
            CheckError::Fetch(_) => "fetching",
            CheckError::Extraction(_) => "normalizing",
            CheckError::Repository(_) => "persisting",
        }
    }

    fn outcome_label(&self) -> &'static str {
        match self {
            CheckError::Fetch(_) => "fetch_error",
            CheckError::Extraction(_) => "extraction_error",
            CheckError::Repository(_) => "repository_error",
        }
    }
}

/// Result of one successful check.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub target_id: String,
    pub tier: AlertTier,
    pub change_percentage: f64,
    pub http_status: u16,
}

/// Runs one check of one monitored target end-to-end: fetch, normalize,
/// fingerprint, compare against the previous snapshot, notify if the
/// change is alert-worthy, persist.
///
/// A failed check writes no snapshot and leaves `last_checked_at`
/// untouched; a successful run writes exactly one snapshot.
pub struct CheckRunner {
    gateway: Arc<dyn FetchGateway>,
    targets: Arc<dyn TargetRepository>,
    snapshots: Arc<dyn SnapshotRepository>,
    blobs: Option<Arc<dyn BlobStore>>,
    dispatcher: AlertDispatcher,
    events: EventBus,
    metrics: Arc<MetricsRegistry>,
}

impl CheckRunner {
    pub fn new(
        gateway: Arc<dyn FetchGateway>,
        targets: Arc<dyn TargetRepository>,
        snapshots: Arc<dyn SnapshotRepository>,
        blobs: Option<Arc<dyn BlobStore>>,
        dispatcher: AlertDispatcher,
        events: EventBus,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            gateway,
            targets,
            snapshots,
            blobs,
            dispatcher,
            events,
            metrics,
        }
    }

    pub async fn run_check(&self, target: &Target) -> Result<CheckOutcome, CheckError> {
        let started = Instant::now();
        let result = self.execute(target).await;

        self.metrics
            .check_duration_seconds
            .observe(started.elapsed().as_secs_f64());

        match &result {
            Ok(outcome) => {
                self.metrics
                    .checks_total
                    .with_label_values(&["success"])
                    .inc();
                if outcome.tier.is_alerting() {
                    self.metrics
                        .alerts_total
                        .with_label_values(&[outcome.tier.as_str()])
                        .inc();
                }
            }
            Err(e) => {
                self.metrics
                    .checks_total
                    .with_label_values(&[e.outcome_label()])
                    .inc();
            }
        }

        self.events.publish(DomainEvent::TargetChecked {
            target_id: target.id.clone(),
            success: result.is_ok(),
        });

        result
    }

    async fn execute(&self, target: &Target) -> Result<CheckOutcome, CheckError> {
        // Fetching
        let fetched = self.gateway.fetch(&target.url, target.render_mode()).await?;

        // Normalizing
        let text = normalize(&fetched.body, fetched.media_type)?;

        // Fingerprinting
        let current = fingerprint(&text);

        // Comparing against the previous snapshot, if any
        let previous = self.snapshots.latest_for(&target.id).await?;
        let previous_fingerprint = previous.as_ref().map(|s| s.fingerprint());
        let classification = classify(
            previous_fingerprint.as_ref(),
            &current,
            fetched.status,
            &target.thresholds(),
        );

        let now = Utc::now();
        let snapshot_id = Uuid::new_v4().to_string();

        // Raw-content capture is best-effort
        let raw_blob_path = match &self.blobs {
            Some(blobs) => {
                let name = format!("{}/{}", target.id, snapshot_id);
                match blobs.put(&name, &fetched.body, fetched.media_type).await {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!(
                            target_id = %target.id,
                            "Failed to store raw content: {}",
                            e
                        );
                        None
                    }
                }
            }
            None => None,
        };

        // Dispatching, best-effort, before anything is persisted
        if classification.tier.is_alerting() {
            if let Some(webhook_url) = &target.webhook_url {
                let notification = AlertNotification {
                    webhook_url,
                    template: target.webhook_payload.as_ref(),
                    target_url: &target.url,
                    tier: classification.tier,
                    change_percentage: classification.change_percentage,
                    timestamp: now,
                };
                match self.dispatcher.send(&notification).await {
                    Ok(()) => {
                        self.metrics
                            .webhook_dispatch_total
                            .with_label_values(&["delivered"])
                            .inc();
                    }
                    Err(e) => {
                        tracing::warn!(
                            target_id = %target.id,
                            webhook_url,
                            "Alert dispatch failed: {}",
                            e
                        );
                        self.metrics
                            .webhook_dispatch_total
                            .with_label_values(&["failed"])
                            .inc();
                    }
                }
            }
        }

        // Persisting
        let snapshot = Snapshot {
            id: snapshot_id,
            target_id: target.id.clone(),
            content_hash: current.hash.clone(),
            content_length: current.length as i64,
            text_excerpt: Snapshot::excerpt_of(&text),
            http_status: fetched.status as i32,
            alert_tier: classification.tier,
            change_percentage: classification.change_percentage,
            raw_blob_path,
            resolved: false,
            resolved_at: None,
            created_at: now,
        };
        self.snapshots.save(&snapshot).await?;
        self.targets.touch_last_checked(&target.id, now).await?;

        self.events.publish(DomainEvent::SnapshotCreated {
            target_id: target.id.clone(),
            snapshot_id: snapshot.id.clone(),
            tier: classification.tier,
            change_percentage: classification.change_percentage,
        });
        if classification.tier.is_alerting() {
            self.events.publish(DomainEvent::AlertRaised {
                target_id: target.id.clone(),
                tier: classification.tier,
                change_percentage: classification.change_percentage,
            });
        }

        tracing::info!(
            target_id = %target.id,
            name = target.display_name(),
            tier = classification.tier.as_str(),
            change = classification.change_percentage,
            status = fetched.status,
            "Check completed"
        );

        Ok(CheckOutcome {
            target_id: target.id.clone(),
            tier: classification.tier,
            change_percentage: classification.change_percentage,
            http_status: fetched.status,
        })
    }
}
