use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

pub static OUTCOME_SUCCESS: &str = "success";
pub static OUTCOME_RETRY: &str = "retry";
pub static OUTCOME_TERMINAL: &str = "terminal";
pub static OUTCOME_TRANSPORT: &str = "transport";
pub static OUTCOME_CANCELLED: &str = "cancelled";

/// Lazily creates the process-wide metrics registry.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Request engine
    pub http_requests: IntCounterVec,
    pub http_retries: IntCounterVec,
    pub http_request_duration: HistogramVec,

    // Token lifecycle
    pub token_fetches: IntCounterVec,
}

impl Metrics {
    // metric names and label sets are static; registration can only fail on a programming error
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("catalogueclient".into()), None)
            .expect("valid registry prefix");

        let metrics = Arc::new(Self {
            http_requests: IntCounterVec::new(
                Opts::new("http_requests_total", "HTTP exchanges by method and outcome"),
                &["method", "outcome"],
            )
            .expect("valid metric"),
            http_retries: IntCounterVec::new(
                Opts::new("http_retries_total", "Retries scheduled by method"),
                &["method"],
            )
            .expect("valid metric"),
            http_request_duration: HistogramVec::new(
                HistogramOpts::new("http_request_duration_seconds", "Logical call duration seconds")
                    .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 15.0]),
                &["method"],
            )
            .expect("valid metric"),
            token_fetches: IntCounterVec::new(
                Opts::new("token_fetch_total", "Token endpoint calls by kind and outcome"),
                &["kind", "outcome"],
            )
            .expect("valid metric"),
            registry,
        });

        let reg = &metrics.registry;
        reg.register(Box::new(metrics.http_requests.clone())).expect("unique metric");
        reg.register(Box::new(metrics.http_retries.clone())).expect("unique metric");
        reg.register(Box::new(metrics.http_request_duration.clone())).expect("unique metric");
        reg.register(Box::new(metrics.token_fetches.clone())).expect("unique metric");

        metrics
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
