use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::modules::target::interface::TargetRepository;
use crate::modules::target::model::Target;
use crate::modules::RepositoryError;
use crate::services::checker::{CheckError, CheckOutcome, CheckRunner};
use crate::services::classifier::AlertTier;

/// A target is due when it is active and its check interval has elapsed
/// since the last check (or it has never been checked). Combined with a
/// coarse trigger interval this yields eventual, not exact, periodicity.
pub fn is_due(target: &Target, now: DateTime<Utc>) -> bool {
    if !target.is_active {
        return false;
    }

    match target.last_checked_at {
        None => true,
        Some(last) => now - last >= ChronoDuration::hours(target.check_frequency_hours as i64),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("a check for this target is already in flight")]
    Busy,
    #[error(transparent)]
    Check(#[from] CheckError),
}

/// Per-target entry in a batch run report.
#[derive(Debug, Clone, Serialize)]
pub struct TargetCheckResult {
    pub target_id: String,
    pub success: bool,
    pub alert_level: Option<AlertTier>,
    pub change_percentage: Option<f64>,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchedulerReport {
    pub checked: usize,
    pub results: Vec<TargetCheckResult>,
}

/// Selects due targets and drives their checks.
///
/// One target's failure never aborts the rest of a batch run. The
/// in-flight set serializes checks per target, so an overlapping manual
/// trigger and scheduled run cannot race on a target's snapshot history;
/// a busy target is skipped, not queued.
pub struct Scheduler {
    targets: Arc<dyn TargetRepository>,
    runner: Arc<CheckRunner>,
    in_flight: Mutex<HashSet<String>>,
}

impl Scheduler {
    pub fn new(targets: Arc<dyn TargetRepository>, runner: Arc<CheckRunner>) -> Self {
        Self {
            targets,
            runner,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Run one check for one target, guarded against concurrent checks of
    /// the same target.
    pub async fn run_target(&self, target: &Target) -> Result<CheckOutcome, RunError> {
        {
            let mut in_flight = self.in_flight.lock().await;
            if !in_flight.insert(target.id.clone()) {
                return Err(RunError::Busy);
            }
        }

        let result = self.runner.run_check(target).await;

        self.in_flight.lock().await.remove(&target.id);

        Ok(result?)
    }

    /// Evaluate all active targets and check the due ones.
    pub async fn run_due_checks(
        &self,
        now: DateTime<Utc>,
    ) -> Result<SchedulerReport, RepositoryError> {
        let active = self.targets.list_active().await?;
        let due: Vec<Target> = active.into_iter().filter(|t| is_due(t, now)).collect();

        tracing::debug!(due = due.len(), "Evaluating due targets");

        let mut results = Vec::with_capacity(due.len());
        for target in &due {
            match self.run_target(target).await {
                Ok(outcome) => results.push(TargetCheckResult {
                    target_id: target.id.clone(),
                    success: true,
                    alert_level: Some(outcome.tier),
                    change_percentage: Some(outcome.change_percentage),
                    status_code: Some(outcome.http_status),
                    error: None,
                }),
                Err(RunError::Busy) => {
                    tracing::debug!(target_id = %target.id, "Check already in flight, skipping");
                }
                Err(RunError::Check(e)) => {
                    tracing::error!(target_id = %target.id, "Check failed: {}", e);
                    results.push(TargetCheckResult {
                        target_id: target.id.clone(),
                        success: false,
                        alert_level: None,
                        change_percentage: None,
                        status_code: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(SchedulerReport {
            checked: results.len(),
            results,
        })
    }

    /// Periodic trigger loop. Each tick is stateless apart from what the
    /// repository holds, so a missed or doubled tick is harmless.
    pub async fn start_periodic(self: Arc<Self>, interval_secs: u64) {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

        loop {
            interval.tick().await;

            match self.run_due_checks(Utc::now()).await {
                Ok(report) => {
                    let failed = report.results.iter().filter(|r| !r.success).count();
                    tracing::info!(
                        checked = report.checked,
                        failed,
                        "Scheduled run completed"
                    );
                }
                Err(e) => {
                    tracing::error!("Scheduled run could not list targets: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(
        is_active: bool,
        check_frequency_hours: i32,
        last_checked_at: Option<DateTime<Utc>>,
    ) -> Target {
        let now = Utc::now();
        Target {
            id: "t1".to_string(),
            url: "https://example.com".to_string(),
            name: None,
            check_frequency_hours,
            is_active,
            yellow_threshold: None,
            red_threshold: None,
            webhook_url: None,
            webhook_payload: None,
            render_js: false,
            last_checked_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_due_when_interval_elapsed() {
        let now = Utc::now();
        let t = target(true, 24, Some(now - ChronoDuration::hours(25)));
        assert!(is_due(&t, now));
    }

    #[test]
    fn test_not_due_within_interval() {
        let now = Utc::now();
        let t = target(true, 24, Some(now - ChronoDuration::hours(23)));
        assert!(!is_due(&t, now));
    }

    #[test]
    fn test_due_exactly_at_interval_boundary() {
        let now = Utc::now();
        let t = target(true, 24, Some(now - ChronoDuration::hours(24)));
        assert!(is_due(&t, now));
    }

    #[test]
    fn test_never_checked_is_due() {
        let t = target(true, 168, None);
        assert!(is_due(&t, Utc::now()));
    }

    #[test]
    fn test_inactive_is_never_due() {
        let now = Utc::now();
        let t = target(false, 24, Some(now - ChronoDuration::hours(100)));
        assert!(!is_due(&t, now));

        let t = target(false, 24, None);
        assert!(!is_due(&t, now));
    }
}
