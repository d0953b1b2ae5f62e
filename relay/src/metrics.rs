use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref REQUESTS_TOTAL: Counter = Counter::with_opts(Opts::new(
        "relay_requests_total",
        "Total webhook POSTs received"
    ))
    .unwrap();
    pub static ref NORMALIZED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "relay_normalized_total",
        "Total bodies whose EntryTimeEpoch was scaled to milliseconds"
    ))
    .unwrap();
    pub static ref PASSTHROUGH_TOTAL: Counter = Counter::with_opts(Opts::new(
        "relay_passthrough_total",
        "Total non-JSON bodies forwarded as-is"
    ))
    .unwrap();
    pub static ref UPSTREAM_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "relay_upstream_failures_total",
        "Total forwards that failed before an upstream response was read"
    ))
    .unwrap();
    pub static ref UPSTREAM_RESPONSES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            "relay_upstream_responses_total",
            "Upstream responses by status class"
        ),
        &["class"]
    )
    .unwrap();
    pub static ref FORWARD_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "relay_forward_latency_seconds",
            "Time taken to forward a request and read the upstream response"
        )
        .buckets(vec![
            0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0
        ])
    )
    .unwrap();
}

pub fn init_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(NORMALIZED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(PASSTHROUGH_TOTAL.clone()))?;
    REGISTRY.register(Box::new(UPSTREAM_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(UPSTREAM_RESPONSES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(FORWARD_LATENCY_SECONDS.clone()))?;
    Ok(())
}

/// Label for an HTTP status, e.g. `2xx`.
pub fn status_class(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return format!("# failed to encode metrics: {}\n", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
