use std::env;

/// Environment configuration
/// Loads and validates environment variables
pub struct Config {
    pub database_url: String,
    /// Base URL of the headless-browser rendering backend; render-mode
    /// targets fall back to plain fetches when unset.
    pub renderer_url: Option<String>,
    /// Per-request timeout for target fetches and rendered fetches.
    pub fetch_timeout_secs: u64,
    /// Coarse trigger interval for the scheduled check loop.
    pub scheduler_interval_secs: u64,
    /// Secret used to sign outbound webhook payloads; unsigned when unset.
    pub webhook_secret: Option<String>,
    /// Directory for captured raw-content blobs; capture disabled when unset.
    pub blob_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;

        let renderer_url = env::var("RENDERER_URL").ok();

        let fetch_timeout_secs = match env::var("FETCH_TIMEOUT_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|_| "FETCH_TIMEOUT_SECS must be an integer".to_string())?,
            Err(_) => 30,
        };

        let scheduler_interval_secs = match env::var("SCHEDULER_INTERVAL_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|_| "SCHEDULER_INTERVAL_SECS must be an integer".to_string())?,
            Err(_) => 3600,
        };

        let webhook_secret = env::var("WEBHOOK_SECRET").ok();

        let blob_dir = env::var("SNAPSHOT_BLOB_DIR").ok();

        Ok(Self {
            database_url,
            renderer_url,
            fetch_timeout_secs,
            scheduler_interval_secs,
            webhook_secret,
            blob_dir,
        })
    }
}
