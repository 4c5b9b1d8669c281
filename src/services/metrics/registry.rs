use prometheus::{
    CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Central metrics registry for the watch service
pub struct MetricsRegistry {
    registry: Registry,

    // HTTP Metrics
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,

    // Check Metrics
    pub checks_total: CounterVec,
    pub check_duration_seconds: Histogram,

    // Alert Metrics
    pub alerts_total: CounterVec,
    pub webhook_dispatch_total: CounterVec,
}

impl MetricsRegistry {
    pub fn new() -> Result<Arc<Self>, Box<dyn std::error::Error>> {
        let registry = Registry::new();

        let http_requests_total = CounterVec::new(
            Opts::new("sitewatch_http_requests_total", "Total HTTP requests"),
            &["method", "endpoint", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "sitewatch_http_request_duration_seconds",
                "HTTP request duration",
            ),
            &["method", "endpoint"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        let checks_total = CounterVec::new(
            Opts::new("sitewatch_checks_total", "Target checks by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(checks_total.clone()))?;

        let check_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "sitewatch_check_duration_seconds",
            "End-to-end duration of a single target check",
        ))?;
        registry.register(Box::new(check_duration_seconds.clone()))?;

        let alerts_total = CounterVec::new(
            Opts::new("sitewatch_alerts_total", "Alerts raised by tier"),
            &["tier"],
        )?;
        registry.register(Box::new(alerts_total.clone()))?;

        let webhook_dispatch_total = CounterVec::new(
            Opts::new(
                "sitewatch_webhook_dispatch_total",
                "Webhook notification attempts by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(webhook_dispatch_total.clone()))?;

        Ok(Arc::new(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            checks_total,
            check_duration_seconds,
            alerts_total,
            webhook_dispatch_total,
        }))
    }

    /// Export all metrics in Prometheus text format
    pub fn export(&self) -> Result<String, Box<dyn std::error::Error>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
