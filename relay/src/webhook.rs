use crate::config::RelayConfig;
use crate::errors::Result;
use crate::metrics::{
    status_class, FORWARD_LATENCY_SECONDS, NORMALIZED_TOTAL, PASSTHROUGH_TOTAL, REQUESTS_TOTAL,
    UPSTREAM_FAILURES_TOTAL, UPSTREAM_RESPONSES_TOTAL,
};
use crate::normalize::{normalize_body, Outcome};
use axum::{
    body::{self, Body, Bytes},
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

pub const WEBHOOK_PATH: &str = "/api/webhook/tive";

/// Forwarded to the upstream alongside `content-type`; every other header is dropped.
const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone)]
struct AppState {
    client: reqwest::Client,
    upstream_url: Arc<str>,
}

pub fn create_router(config: &RelayConfig, client: reqwest::Client) -> Router {
    let state = AppState {
        client,
        upstream_url: Arc::from(config.upstream_url.as_str()),
    };

    Router::new()
        .route(WEBHOOK_PATH, post(forward_webhook).options(preflight))
        .with_state(state)
}

async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST,OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type,X-API-Key"),
        ],
    )
}

async fn forward_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response> {
    REQUESTS_TOTAL.inc();
    let request_id = Uuid::new_v4();

    let result = relay(&state, &headers, body)
        .instrument(info_span!("relay", %request_id))
        .await;

    if result.is_err() {
        UPSTREAM_FAILURES_TOTAL.inc();
    }
    result
}

async fn relay(state: &AppState, headers: &HeaderMap, body: Body) -> Result<Response> {
    let raw = body::to_bytes(body, usize::MAX).await?;

    let outbound: Bytes = match normalize_body(&raw) {
        Outcome::Normalized(bytes) => {
            NORMALIZED_TOTAL.inc();
            debug!("EntryTimeEpoch scaled from seconds to milliseconds");
            Bytes::from(bytes)
        }
        Outcome::Unchanged => raw,
        Outcome::Passthrough => {
            PASSTHROUGH_TOTAL.inc();
            debug!("Body is not JSON, forwarding as-is");
            raw
        }
    };

    let mut request = state.client.post(state.upstream_url.as_ref());
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        request = request.header(header::CONTENT_TYPE, content_type.clone());
    }
    if let Some(api_key) = headers.get(API_KEY_HEADER) {
        request = request.header(API_KEY_HEADER, api_key.clone());
    }

    let start = Instant::now();
    let upstream = request.body(outbound).send().await?;
    let status = upstream.status();
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
    let text = upstream.bytes().await?;
    FORWARD_LATENCY_SECONDS.observe(start.elapsed().as_secs_f64());

    UPSTREAM_RESPONSES_TOTAL
        .with_label_values(&[status_class(status.as_u16())])
        .inc();
    if status.is_success() {
        info!("Forwarded to upstream: {}", status);
    } else {
        warn!("Upstream answered {}", status);
    }

    let mut response = Response::new(Body::from(text));
    *response.status_mut() =
        StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type);
    }
    Ok(response)
}
