use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{FetchError, FetchGateway, FetchedContent, RenderMode};
use crate::services::normalizer::MediaType;

/// A single attempt in the fetch fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchStrategy {
    Rendered,
    Plain,
}

/// HTTP fetch gateway over reqwest.
///
/// Plain mode issues a direct GET. Rendered mode posts the URL to a
/// headless-browser backend (Browserless-style `/content` API) that loads
/// the page, waits for network idle and returns the rendered HTML. The
/// strategies for a fetch are tried in order until one succeeds; a failed
/// rendered attempt degrades to a plain fetch with a log entry, so the
/// check still proceeds.
pub struct HttpFetchGateway {
    client: Client,
    renderer_url: Option<String>,
}

impl HttpFetchGateway {
    pub fn new(timeout: Duration, renderer_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            renderer_url,
        }
    }

    fn strategies(&self, mode: RenderMode) -> Vec<FetchStrategy> {
        match mode {
            RenderMode::Rendered if self.renderer_url.is_some() => {
                vec![FetchStrategy::Rendered, FetchStrategy::Plain]
            }
            RenderMode::Rendered => {
                tracing::warn!("Render mode requested but RENDERER_URL is not configured, using plain fetch");
                vec![FetchStrategy::Plain]
            }
            RenderMode::Plain => vec![FetchStrategy::Plain],
        }
    }

    async fn fetch_plain(&self, url: &str) -> Result<FetchedContent, FetchError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", concat!("sitewatch/", env!("CARGO_PKG_VERSION")))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let media_type = MediaType::from_content_type(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(FetchedContent {
            status,
            media_type,
            body: body.to_vec(),
        })
    }

    async fn fetch_rendered(&self, url: &str) -> Result<FetchedContent, FetchError> {
        let renderer_url = self
            .renderer_url
            .as_deref()
            .ok_or_else(|| FetchError::RenderBackend("no renderer configured".to_string()))?;

        let endpoint = format!("{}/content", renderer_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&endpoint)
            .json(&serde_json::json!({
                "url": url,
                "gotoOptions": { "waitUntil": "networkidle2" },
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::RenderBackend(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::RenderBackend(format!(
                "renderer returned status {}",
                status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::RenderBackend(e.to_string()))?;

        // The renderer hands back the final DOM as HTML.
        Ok(FetchedContent {
            status: 200,
            media_type: MediaType::Html,
            body: body.to_vec(),
        })
    }
}

#[async_trait]
impl FetchGateway for HttpFetchGateway {
    async fn fetch(&self, url: &str, mode: RenderMode) -> Result<FetchedContent, FetchError> {
        let strategies = self.strategies(mode);
        let mut last_error = FetchError::Network("no fetch strategy attempted".to_string());

        for strategy in strategies {
            let attempt = match strategy {
                FetchStrategy::Rendered => self.fetch_rendered(url).await,
                FetchStrategy::Plain => self.fetch_plain(url).await,
            };

            match attempt {
                Ok(content) => {
                    tracing::debug!(
                        url,
                        ?strategy,
                        status = content.status,
                        bytes = content.body.len(),
                        "Fetch attempt succeeded"
                    );
                    return Ok(content);
                }
                Err(e) => {
                    tracing::warn!(url, ?strategy, "Fetch attempt failed: {}", e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_mode_never_renders() {
        let gateway = HttpFetchGateway::new(
            Duration::from_secs(30),
            Some("http://renderer:3000".to_string()),
        );
        assert_eq!(gateway.strategies(RenderMode::Plain), vec![FetchStrategy::Plain]);
    }

    #[test]
    fn test_rendered_mode_falls_back_to_plain() {
        let gateway = HttpFetchGateway::new(
            Duration::from_secs(30),
            Some("http://renderer:3000".to_string()),
        );
        assert_eq!(
            gateway.strategies(RenderMode::Rendered),
            vec![FetchStrategy::Rendered, FetchStrategy::Plain]
        );
    }

    #[test]
    fn test_rendered_mode_without_renderer_degrades_to_plain() {
        let gateway = HttpFetchGateway::new(Duration::from_secs(30), None);
        assert_eq!(
            gateway.strategies(RenderMode::Rendered),
            vec![FetchStrategy::Plain]
        );
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_network_error() {
        let gateway = HttpFetchGateway::new(Duration::from_secs(2), None);
        let result = gateway
            .fetch("http://sitewatch-test.invalid/", RenderMode::Plain)
            .await;
        assert!(matches!(
            result,
            Err(FetchError::Network(_)) | Err(FetchError::Timeout)
        ));
    }
}
