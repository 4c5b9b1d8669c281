pub mod http;

pub use http::HttpFetchGateway;

use async_trait::async_trait;

use crate::services::normalizer::MediaType;

/// How a target's content should be retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Direct HTTP GET.
    Plain,
    /// JS-rendering via the headless-browser backend, falling back to a
    /// plain fetch when the backend fails.
    Rendered,
}

/// Raw content retrieved for a URL.
///
/// Non-2xx upstream statuses are data, not errors: the status and whatever
/// body was retrieved are returned so classification can still proceed.
#[derive(Debug, Clone)]
pub struct FetchedContent {
    pub status: u16,
    pub media_type: MediaType,
    pub body: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("render backend error: {0}")]
    RenderBackend(String),
}

/// Gateway for retrieving raw content for a URL.
#[async_trait]
pub trait FetchGateway: Send + Sync {
    async fn fetch(&self, url: &str, mode: RenderMode) -> Result<FetchedContent, FetchError>;
}
