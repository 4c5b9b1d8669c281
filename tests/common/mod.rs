use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use sitewatch::modules::snapshot::interface::SnapshotRepository;
use sitewatch::modules::snapshot::model::Snapshot;
use sitewatch::modules::target::interface::TargetRepository;
use sitewatch::modules::target::model::Target;
use sitewatch::modules::RepositoryError;
use sitewatch::services::checker::CheckRunner;
use sitewatch::services::dispatcher::AlertDispatcher;
use sitewatch::services::events::EventBus;
use sitewatch::services::fetch::{FetchError, FetchGateway, FetchedContent, RenderMode};
use sitewatch::services::metrics::MetricsRegistry;
use sitewatch::services::normalizer::MediaType;

// Allow dead_code for utilities used by other test files
#[allow(dead_code)]
pub fn make_target(id: &str, url: &str) -> Target {
    let now = Utc::now();
    Target {
        id: id.to_string(),
        url: url.to_string(),
        name: None,
        check_frequency_hours: 24,
        is_active: true,
        yellow_threshold: None,
        red_threshold: None,
        webhook_url: None,
        webhook_payload: None,
        render_js: false,
        last_checked_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Fetch gateway answering from canned per-URL responses.
pub struct CannedGateway {
    responses: Mutex<HashMap<String, CannedResponse>>,
    /// Artificial latency, for exercising in-flight guarding.
    pub delay: Option<Duration>,
}

#[derive(Clone)]
pub enum CannedResponse {
    Ok {
        status: u16,
        media_type: MediaType,
        body: Vec<u8>,
    },
    NetworkError,
}

#[allow(dead_code)]
impl CannedGateway {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            delay: None,
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            delay: Some(delay),
        }
    }

    pub async fn serve_html(&self, url: &str, status: u16, body: &str) {
        self.responses.lock().await.insert(
            url.to_string(),
            CannedResponse::Ok {
                status,
                media_type: MediaType::Html,
                body: body.as_bytes().to_vec(),
            },
        );
    }

    pub async fn serve(&self, url: &str, response: CannedResponse) {
        self.responses
            .lock()
            .await
            .insert(url.to_string(), response);
    }

    pub async fn fail(&self, url: &str) {
        self.responses
            .lock()
            .await
            .insert(url.to_string(), CannedResponse::NetworkError);
    }
}

#[async_trait]
impl FetchGateway for CannedGateway {
    async fn fetch(&self, url: &str, _mode: RenderMode) -> Result<FetchedContent, FetchError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let canned = self.responses.lock().await.get(url).cloned();
        match canned {
            Some(CannedResponse::Ok {
                status,
                media_type,
                body,
            }) => Ok(FetchedContent {
                status,
                media_type,
                body,
            }),
            Some(CannedResponse::NetworkError) => {
                Err(FetchError::Network("connection refused".to_string()))
            }
            None => Err(FetchError::Network(format!("no canned response for {}", url))),
        }
    }
}

/// In-memory target store.
pub struct InMemoryTargets {
    targets: Mutex<Vec<Target>>,
}

#[allow(dead_code)]
impl InMemoryTargets {
    pub fn new(targets: Vec<Target>) -> Arc<Self> {
        Arc::new(Self {
            targets: Mutex::new(targets),
        })
    }

    pub async fn get(&self, id: &str) -> Option<Target> {
        self.targets
            .lock()
            .await
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }
}

#[async_trait]
impl TargetRepository for InMemoryTargets {
    async fn list_active(&self) -> Result<Vec<Target>, RepositoryError> {
        Ok(self
            .targets
            .lock()
            .await
            .iter()
            .filter(|t| t.is_active)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Target>, RepositoryError> {
        Ok(self.get(id).await)
    }

    async fn touch_last_checked(
        &self,
        id: &str,
        time: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut targets = self.targets.lock().await;
        if let Some(target) = targets.iter_mut().find(|t| t.id == id) {
            if target.last_checked_at.map_or(true, |last| last <= time) {
                target.last_checked_at = Some(time);
            }
        }
        Ok(())
    }
}

/// In-memory snapshot store, append-ordered like the real table.
pub struct InMemorySnapshots {
    rows: Mutex<Vec<Snapshot>>,
}

#[allow(dead_code)]
impl InMemorySnapshots {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(Vec::new()),
        })
    }

    pub async fn all(&self) -> Vec<Snapshot> {
        self.rows.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshots {
    async fn latest_for(&self, target_id: &str) -> Result<Option<Snapshot>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .filter(|s| s.target_id == target_id)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), RepositoryError> {
        self.rows.lock().await.push(snapshot.clone());
        Ok(())
    }

    async fn list_for(&self, target_id: &str) -> Result<Vec<Snapshot>, RepositoryError> {
        let mut rows: Vec<Snapshot> = self
            .rows
            .lock()
            .await
            .iter()
            .filter(|s| s.target_id == target_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn delete(&self, snapshot_id: &str) -> Result<bool, RepositoryError> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|s| s.id != snapshot_id);
        Ok(rows.len() < before)
    }

    async fn mark_resolved(
        &self,
        snapshot_id: &str,
        time: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut rows = self.rows.lock().await;
        match rows.iter_mut().find(|s| s.id == snapshot_id) {
            Some(snapshot) => {
                snapshot.resolved = true;
                snapshot.resolved_at = Some(time);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Wire a check runner onto the in-memory fakes.
#[allow(dead_code)]
pub fn build_runner(
    gateway: Arc<CannedGateway>,
    targets: Arc<InMemoryTargets>,
    snapshots: Arc<InMemorySnapshots>,
    events: EventBus,
) -> Arc<CheckRunner> {
    Arc::new(CheckRunner::new(
        gateway,
        targets,
        snapshots,
        None,
        AlertDispatcher::new(Duration::from_secs(2), None),
        events,
        MetricsRegistry::new().expect("metrics registry"),
    ))
}
