use crate::generator::{generate_full_record, generate_minimal};
use crate::samples::find_sample;
use crate::telemetry::TelemetryRecord;
use chrono::{SecondsFormat, Utc};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_TARGET_URL: &str = "http://localhost:8080/api/webhook/tive";
pub const API_KEY_HEADER: &str = "X-API-Key";
pub const BATCH_SIZE: usize = 10;
pub const BATCH_DELAY: Duration = Duration::from_millis(100);

/// Problems with the form itself; nothing is sent when one of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Please enter API URL")]
    MissingUrl,

    #[error("Please enter API Key")]
    MissingApiKey,

    #[error("Please enter API URL and API Key")]
    MissingUrlOrKey,

    #[error("Invalid JSON payload")]
    InvalidJson,
}

/// One line of the result log.
#[derive(Debug, Clone, Serialize)]
pub struct SendResult {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

/// State behind the sender form: where to send, with which key, what, and
/// what happened so far.
///
/// Network operations take `&mut self`, so a send and a batch can never
/// overlap on the same session.
#[derive(Debug)]
pub struct Session {
    client: reqwest::Client,
    target_url: String,
    api_key: String,
    payload: String,
    /// Most recent first.
    results: Vec<SendResult>,
    selected_sample: Option<&'static str>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_URL, "")
    }
}

impl Session {
    pub fn new(target_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            target_url: target_url.into(),
            api_key: api_key.into(),
            payload: String::new(),
            results: Vec::new(),
            selected_sample: None,
        }
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub fn set_target_url(&mut self, url: impl Into<String>) {
        self.target_url = url.into();
    }

    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.api_key = key.into();
    }

    /// The key with every character hidden.
    pub fn masked_api_key(&self) -> String {
        "*".repeat(self.api_key.chars().count())
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Replaces the payload text as typed; the sample highlight is kept.
    pub fn set_payload(&mut self, text: impl Into<String>) {
        self.payload = text.into();
    }

    pub fn results(&self) -> &[SendResult] {
        &self.results
    }

    pub fn selected_sample(&self) -> Option<&'static str> {
        self.selected_sample
    }

    pub fn generate_random(&mut self) {
        self.load_record(&generate_full_record());
    }

    pub fn generate_minimal(&mut self) {
        self.load_record(&generate_minimal());
    }

    /// Loads a sample by exact name. Returns `false` and changes nothing when
    /// there is no such sample.
    pub fn select_sample(&mut self, name: &str) -> bool {
        let Some(sample) = find_sample(name) else {
            return false;
        };
        self.payload = pretty(&sample.payload);
        self.selected_sample = Some(sample.name);
        true
    }

    pub fn clear_results(&mut self) {
        self.results.clear();
    }

    fn load_record(&mut self, record: &TelemetryRecord) {
        self.payload = match record.to_payload() {
            Ok(value) => pretty(&value),
            Err(e) => {
                warn!("Failed to serialize payload: {}", e);
                String::new()
            }
        };
        self.selected_sample = None;
    }

    /// Sends the current payload once and prepends the outcome to the log.
    pub async fn send(&mut self) -> Result<&SendResult, InputError> {
        if self.target_url.trim().is_empty() {
            return Err(InputError::MissingUrl);
        }
        if self.api_key.trim().is_empty() {
            return Err(InputError::MissingApiKey);
        }
        let parsed: Value =
            serde_json::from_str(&self.payload).map_err(|_| InputError::InvalidJson)?;

        let timestamp = now_iso();
        let (success, message) = match self.post(&parsed).await {
            Ok((status, body)) if status.is_success() => {
                info!("Payload accepted: {}", status);
                let detail = text_field(&body, "message")
                    .unwrap_or_else(|| "Payload sent successfully".to_string());
                (true, format!("Success: {} - {}", status.as_u16(), detail))
            }
            Ok((status, body)) => {
                warn!("Payload rejected: {}", status);
                let detail = text_field(&body, "error")
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
                (false, format!("Error {}: {}", status.as_u16(), detail))
            }
            Err(e) => {
                warn!("Send failed: {}", e);
                (false, format!("Network error: {}", e))
            }
        };

        self.results.insert(
            0,
            SendResult {
                success,
                message,
                timestamp,
            },
        );
        Ok(&self.results[0])
    }

    /// Sends [`BATCH_SIZE`] freshly generated records one after another,
    /// pausing [`BATCH_DELAY`] after each. The entries are prepended as one
    /// block, oldest first.
    pub async fn send_batch(&mut self) -> Result<&[SendResult], InputError> {
        if self.target_url.trim().is_empty() || self.api_key.trim().is_empty() {
            return Err(InputError::MissingUrlOrKey);
        }

        info!("Sending batch of {} payloads to {}", BATCH_SIZE, self.target_url);
        let mut batch = Vec::with_capacity(BATCH_SIZE);

        for i in 1..=BATCH_SIZE {
            let body = generate_full_record().to_payload().unwrap_or_else(|e| {
                warn!("Failed to serialize batch payload {}: {}", i, e);
                Value::Null
            });
            let timestamp = now_iso();

            let (success, outcome) = match self.post(&body).await {
                Ok((status, _)) if status.is_success() => (true, "Success".to_string()),
                Ok((status, _)) => (false, format!("Error {}", status.as_u16())),
                Err(e) => {
                    debug!("Batch send {} failed: {}", i, e);
                    (false, "Network error".to_string())
                }
            };

            batch.push(SendResult {
                success,
                message: format!("Payload {}/{}: {}", i, BATCH_SIZE, outcome),
                timestamp,
            });

            tokio::time::sleep(BATCH_DELAY).await;
        }

        let ok = batch.iter().filter(|r| r.success).count();
        info!("Batch finished: {}/{} succeeded", ok, BATCH_SIZE);

        self.results.splice(0..0, batch);
        Ok(&self.results[..BATCH_SIZE])
    }

    /// POSTs `body` as JSON; a response body that is not JSON reads as `{}`.
    async fn post<T: Serialize + ?Sized>(
        &self,
        body: &T,
    ) -> Result<(StatusCode, Value), reqwest::Error> {
        let response = self
            .client
            .post(self.target_url.trim())
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .unwrap_or_else(|_| Value::Object(Default::default()));
        Ok((status, body))
    }
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Reads a message-like field the way a loosely typed client would: empty
/// strings, `null`, `false` and zero count as missing.
fn text_field(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, Bytes},
        http::{header, HeaderMap},
        response::Response,
        routing::post,
        Router,
    };
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    type Captured = Arc<Mutex<Vec<(HeaderMap, Bytes)>>>;

    async fn spawn_target(
        status: u16,
        content_type: Option<&'static str>,
        reply: &'static str,
    ) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let sink = captured.clone();
        let app = Router::new().route(
            "/hook",
            post(move |headers: HeaderMap, body: Bytes| {
                let sink = sink.clone();
                async move {
                    sink.lock().unwrap().push((headers, body));
                    let mut response = Response::new(Body::from(reply));
                    *response.status_mut() = status.try_into().unwrap();
                    if let Some(ct) = content_type {
                        response
                            .headers_mut()
                            .insert(header::CONTENT_TYPE, ct.parse().unwrap());
                    }
                    response
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/hook", addr), captured)
    }

    async fn dead_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/hook", addr)
    }

    fn ready_session(url: &str) -> Session {
        let mut session = Session::new(url, "test-key");
        session.set_payload(r#"{"EntryTimeEpoch":1739215646,"DeviceId":"350000000000001"}"#);
        session
    }

    #[test]
    fn test_send_requires_url_key_and_json() {
        tokio_test::block_on(async {
            let mut session = Session::new("   ", "key");
            session.set_payload("{}");
            assert_eq!(session.send().await.unwrap_err(), InputError::MissingUrl);

            session.set_target_url("http://127.0.0.1:9/hook");
            session.set_api_key("  ");
            assert_eq!(session.send().await.unwrap_err(), InputError::MissingApiKey);

            session.set_api_key("key");
            session.set_payload("{ not json");
            assert_eq!(session.send().await.unwrap_err(), InputError::InvalidJson);

            session.set_payload("");
            assert_eq!(session.send().await.unwrap_err(), InputError::InvalidJson);

            assert!(session.results().is_empty());
        });
    }

    #[tokio::test]
    async fn test_send_success_uses_message() {
        let (url, captured) =
            spawn_target(200, Some("application/json"), r#"{"message":"stored"}"#).await;
        let mut session = ready_session(&url);

        let result = session.send().await.unwrap().clone();
        assert!(result.success);
        assert_eq!(result.message, "Success: 200 - stored");
        assert!(result.timestamp.ends_with('Z'));

        let captured = captured.lock().unwrap();
        let (headers, body) = &captured[0];
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["x-api-key"], "test-key");
        assert_eq!(
            std::str::from_utf8(body).unwrap(),
            r#"{"EntryTimeEpoch":1739215646,"DeviceId":"350000000000001"}"#
        );
    }

    #[tokio::test]
    async fn test_send_success_default_message() {
        let (url, _) = spawn_target(201, Some("text/plain"), "created").await;
        let mut session = ready_session(&url);

        let result = session.send().await.unwrap();
        assert!(result.success);
        assert_eq!(result.message, "Success: 201 - Payload sent successfully");
    }

    #[tokio::test]
    async fn test_send_success_zero_message_uses_default() {
        let (url, _) = spawn_target(200, Some("application/json"), r#"{"message":0}"#).await;
        let mut session = ready_session(&url);

        let result = session.send().await.unwrap();
        assert_eq!(result.message, "Success: 200 - Payload sent successfully");
    }

    #[tokio::test]
    async fn test_send_error_reports_body_error() {
        let (url, _) = spawn_target(
            400,
            Some("application/json"),
            r#"{"error":"Missing DeviceId"}"#,
        )
        .await;
        let mut session = ready_session(&url);

        let result = session.send().await.unwrap();
        assert!(!result.success);
        assert_eq!(result.message, "Error 400: Missing DeviceId");
    }

    #[tokio::test]
    async fn test_send_error_falls_back_to_reason() {
        let (url, _) = spawn_target(503, None, "down").await;
        let mut session = ready_session(&url);

        let result = session.send().await.unwrap();
        assert!(!result.success);
        assert_eq!(result.message, "Error 503: Service Unavailable");
    }

    #[tokio::test]
    async fn test_send_network_error() {
        let url = dead_url().await;
        let mut session = ready_session(&url);

        let result = session.send().await.unwrap();
        assert!(!result.success);
        assert!(result.message.starts_with("Network error: "));
    }

    #[tokio::test]
    async fn test_send_prepends() {
        let (url, _) = spawn_target(200, None, "").await;
        let mut session = ready_session(&url);

        session.send().await.unwrap();
        session.set_payload("not json");
        assert!(session.send().await.is_err());
        session.set_payload("[]");
        session.send().await.unwrap();

        assert_eq!(session.results().len(), 2);
        assert!(session.results()[0].timestamp >= session.results()[1].timestamp);
    }

    #[tokio::test]
    async fn test_batch_sends_ten_generated_records_in_order() {
        let (url, captured) = spawn_target(202, Some("application/json"), "{}").await;
        let mut session = ready_session(&url);
        session.set_payload(r#"{"marker":true}"#);
        session.send().await.unwrap();

        let batch: Vec<String> = session
            .send_batch()
            .await
            .unwrap()
            .iter()
            .map(|r| r.message.clone())
            .collect();
        let expected: Vec<String> = (1..=BATCH_SIZE)
            .map(|i| format!("Payload {}/10: Success", i))
            .collect();
        assert_eq!(batch, expected);

        let results = session.results();
        assert_eq!(results.len(), BATCH_SIZE + 1);
        assert_eq!(results[0].message, "Payload 1/10: Success");
        assert_eq!(results[9].message, "Payload 10/10: Success");
        assert_eq!(results[10].message, "Success: 202 - Payload sent successfully");

        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), BATCH_SIZE + 1);
        for (headers, body) in captured.iter().skip(1) {
            assert_eq!(headers["x-api-key"], "test-key");
            let record: TelemetryRecord = serde_json::from_slice(body).unwrap();
            assert!(record.battery.is_some());
        }
        // The edited payload is left alone.
        assert_eq!(session.payload(), r#"{"marker":true}"#);
    }

    #[tokio::test]
    async fn test_batch_records_failures() {
        let (url, _) = spawn_target(500, None, "").await;
        let mut session = ready_session(&url);
        let messages: Vec<String> = session
            .send_batch()
            .await
            .unwrap()
            .iter()
            .map(|r| r.message.clone())
            .collect();
        assert_eq!(messages.len(), BATCH_SIZE);
        assert_eq!(messages[0], "Payload 1/10: Error 500");
        assert!(session.results().iter().all(|r| !r.success));

        session.set_target_url(dead_url().await);
        session.send_batch().await.unwrap();
        assert_eq!(session.results().len(), 2 * BATCH_SIZE);
        assert_eq!(session.results()[0].message, "Payload 1/10: Network error");
        assert_eq!(session.results()[10].message, "Payload 1/10: Error 500");
    }

    #[test]
    fn test_batch_requires_url_and_key() {
        tokio_test::block_on(async {
            let mut session = Session::new("", "key");
            assert_eq!(
                session.send_batch().await.unwrap_err(),
                InputError::MissingUrlOrKey
            );
            session.set_target_url("http://127.0.0.1:9/hook");
            session.set_api_key("");
            assert_eq!(
                session.send_batch().await.unwrap_err(),
                InputError::MissingUrlOrKey
            );
            assert!(session.results().is_empty());
        });
    }

    #[test]
    fn test_select_sample_is_idempotent() {
        let mut session = Session::default();
        assert!(session.select_sample("Full Payload"));
        let first = session.payload().to_string();
        session.generate_minimal();
        assert!(session.select_sample("Full Payload"));
        assert_eq!(session.payload(), first);
        assert_eq!(session.selected_sample(), Some("Full Payload"));
    }

    #[test]
    fn test_unknown_sample_leaves_state() {
        let mut session = Session::default();
        session.select_sample("Low Battery");
        let before = session.payload().to_string();
        assert!(!session.select_sample("Nope"));
        assert_eq!(session.payload(), before);
        assert_eq!(session.selected_sample(), Some("Low Battery"));
    }

    #[test]
    fn test_generate_clears_selection_and_pretty_prints() {
        let mut session = Session::default();
        session.select_sample("Poor Signal");
        session.generate_random();
        assert_eq!(session.selected_sample(), None);
        assert!(session.payload().starts_with("{\n  \"EntryTimeEpoch\": "));

        let record: TelemetryRecord = serde_json::from_str(session.payload()).unwrap();
        assert!(record.humidity.is_some());

        session.generate_minimal();
        let record: TelemetryRecord = serde_json::from_str(session.payload()).unwrap();
        assert!(record.humidity.is_none());
    }

    #[test]
    fn test_masked_key_and_clear() {
        let mut session = Session::new(DEFAULT_TARGET_URL, "abcd");
        assert_eq!(session.masked_api_key(), "****");
        session.results.push(SendResult {
            success: true,
            message: "x".into(),
            timestamp: now_iso(),
        });
        session.clear_results();
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_text_field() {
        let body = serde_json::json!({
            "message": "",
            "error": null,
            "zero": 0,
            "fzero": -0.0,
            "code": 7,
            "ok": "yes"
        });
        assert_eq!(text_field(&body, "message"), None);
        assert_eq!(text_field(&body, "error"), None);
        assert_eq!(text_field(&body, "zero"), None);
        assert_eq!(text_field(&body, "fzero"), None);
        assert_eq!(text_field(&body, "missing"), None);
        assert_eq!(text_field(&body, "code").as_deref(), Some("7"));
        assert_eq!(text_field(&body, "ok").as_deref(), Some("yes"));
    }
}
