//! Retry logic.
//!
//! # Responsibilities
//! - Send a `RequestDescriptor` with a bounded attempt budget
//! - Classify each attempt as success (2xx) or retryable failure
//! - Wait a fixed delay between attempts
//! - Stop early when the shutdown signal fires
//!
//! # Design Decisions
//! - Every non-2xx status is retryable, 3xx included; redirects are not followed
//! - Registry requests are idempotent, so POST is retried
//! - `dispatch` never fails: every error ends up in the `DispatchOutcome`

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect, Client};
use thiserror::Error;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::http::RequestDescriptor;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::observability::{LogLevel, LogSink};
use crate::resilience::backoff::FixedBackoff;
use crate::resilience::timeouts::with_timeout;

/// Why a single attempt did not succeed.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The descriptor could not be turned into a request (URL, header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection refused, DNS failure, reset, body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The attempt exceeded its deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The registry answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl AttemptError {
    fn metric_label(&self) -> &'static str {
        match self {
            AttemptError::InvalidRequest(_) => "invalid",
            AttemptError::Transport(_) => "transport",
            AttemptError::Timeout(_) => "timeout",
            AttemptError::Status { .. } => "status",
        }
    }
}

/// Result of one full dispatch. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub success: bool,
    /// Status of the successful response, or the last non-2xx seen.
    pub status_code: Option<u16>,
    pub response_body: Option<String>,
    /// Attempts started, including one cut short by shutdown.
    pub attempts: u32,
    /// The shutdown signal ended the dispatch early.
    pub cancelled: bool,
}

struct Reply {
    status: u16,
    body: String,
}

/// Sends registry requests with a bounded retry budget.
pub struct Dispatcher {
    client: Client,
    backoff: FixedBackoff,
    sink: Arc<dyn LogSink>,
    shutdown: Shutdown,
}

impl Dispatcher {
    /// Create a dispatcher with the default client and 300 ms retry delay.
    pub fn new(sink: Arc<dyn LogSink>, shutdown: Shutdown) -> Self {
        Self {
            client: default_client(),
            backoff: FixedBackoff::default(),
            sink,
            shutdown,
        }
    }

    /// Override the inter-attempt delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.backoff = FixedBackoff::new(delay);
        self
    }

    /// Use a caller-built HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// The shutdown signal this dispatcher observes.
    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Send `descriptor` up to `max_attempts` times (at least once), giving
    /// each attempt `attempt_timeout`. Returns on the first 2xx, when the
    /// budget is spent, or when shutdown is triggered.
    pub async fn dispatch(
        &self,
        descriptor: &RequestDescriptor,
        max_attempts: u32,
        attempt_timeout: Duration,
    ) -> DispatchOutcome {
        let span = tracing::info_span!(
            "dispatch",
            dispatch_id = %Uuid::new_v4(),
            intent = %descriptor.intent,
            url = %descriptor.url,
        );
        self.run(descriptor, max_attempts.max(1), attempt_timeout)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        descriptor: &RequestDescriptor,
        max_attempts: u32,
        attempt_timeout: Duration,
    ) -> DispatchOutcome {
        let start = Instant::now();
        let mut last_status = None;
        let mut last_body = None;
        let mut attempts = 0;

        let cancelled = loop {
            if self.shutdown.is_triggered() {
                break true;
            }
            attempts += 1;
            let attempt_start = Instant::now();

            let result = tokio::select! {
                r = with_timeout(attempt_timeout, self.attempt(descriptor)) => r,
                _ = self.shutdown.cancelled() => break true,
            };

            match result {
                Ok(reply) => {
                    tracing::debug!(
                        attempt = attempts,
                        status = reply.status,
                        elapsed_ms = attempt_start.elapsed().as_millis() as u64,
                        "Attempt succeeded"
                    );
                    self.sink.log(
                        LogLevel::Debug,
                        &format!("HTTP OK {}: {}", reply.status, reply.body),
                    );
                    metrics::record_attempt(descriptor.intent, "success");
                    metrics::record_dispatch(descriptor.intent, "success", start);
                    return DispatchOutcome {
                        success: true,
                        status_code: Some(reply.status),
                        response_body: Some(reply.body),
                        attempts,
                        cancelled: false,
                    };
                }
                Err(err) => {
                    tracing::debug!(
                        attempt = attempts,
                        elapsed_ms = attempt_start.elapsed().as_millis() as u64,
                        kind = err.metric_label(),
                        "Attempt failed"
                    );
                    self.sink.log(
                        LogLevel::Warning,
                        &format!("HTTP attempt {}/{} failed: {}", attempts, max_attempts, err),
                    );
                    metrics::record_attempt(descriptor.intent, err.metric_label());
                    if let AttemptError::Status { status, body } = err {
                        last_status = Some(status);
                        last_body = Some(body);
                    }
                }
            }

            let Some(delay) = self.backoff.delay_after(attempts, max_attempts) else {
                break false;
            };
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.shutdown.cancelled() => break true,
            }
        };

        if cancelled {
            self.sink.log(
                LogLevel::Warning,
                &format!(
                    "Dispatch to {} cancelled by shutdown after {} attempt(s)",
                    descriptor.intent.path(),
                    attempts
                ),
            );
        }
        metrics::record_dispatch(
            descriptor.intent,
            if cancelled { "cancelled" } else { "failure" },
            start,
        );

        DispatchOutcome {
            success: false,
            status_code: last_status,
            response_body: last_body,
            attempts,
            cancelled,
        }
    }

    async fn attempt(&self, descriptor: &RequestDescriptor) -> Result<Reply, AttemptError> {
        let url = Url::parse(&descriptor.url).map_err(|e| {
            AttemptError::InvalidRequest(format!("malformed URL {}: {}", descriptor.url, e))
        })?;

        let mut headers = HeaderMap::new();
        for (name, value) in &descriptor.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| AttemptError::InvalidRequest(format!("header name {}: {}", name, e)))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| AttemptError::InvalidRequest(format!("header {}: {}", name, e)))?;
            headers.insert(header_name, header_value);
        }

        let response = self
            .client
            .request(descriptor.method.clone(), url)
            .headers(headers)
            .body(descriptor.body.clone())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            Ok(Reply {
                status: status.as_u16(),
                body,
            })
        } else {
            // Diagnostics only; a failed read must not hide the status.
            let body = response.text().await.unwrap_or_default();
            Err(AttemptError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Client that never follows redirects and ignores proxy environment variables.
pub fn default_client() -> Client {
    Client::builder()
        .redirect(redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use crate::http::RequestIntent;

    #[derive(Default)]
    struct Collect(Mutex<Vec<(LogLevel, String)>>);

    impl LogSink for Collect {
        fn log(&self, level: LogLevel, message: &str) {
            self.0.lock().unwrap().push((level, message.to_string()));
        }
    }

    fn descriptor(url: &str) -> RequestDescriptor {
        RequestDescriptor {
            intent: RequestIntent::Register,
            url: url.to_string(),
            method: reqwest::Method::POST,
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_malformed_url_is_retried_and_never_panics() {
        let sink = Arc::new(Collect::default());
        let dispatcher = Dispatcher::new(sink.clone(), Shutdown::new())
            .with_retry_delay(Duration::from_millis(1));

        let outcome = dispatcher
            .dispatch(&descriptor("http://[bad/api/register"), 2, Duration::from_secs(1))
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.status_code, None);
        let lines = sink.0.lock().unwrap();
        let warnings = lines.iter().filter(|(l, _)| *l == LogLevel::Warning).count();
        assert_eq!(warnings, 2);
        assert!(lines[0].1.contains("malformed URL"));
    }

    #[tokio::test]
    async fn test_invalid_header_value_is_attempt_failure() {
        let mut desc = descriptor("http://127.0.0.1:9/api/register");
        desc.headers.insert("Authorization".into(), "Bearer bad\nkey".into());
        let dispatcher = Dispatcher::new(Arc::new(Collect::default()), Shutdown::new());

        let outcome = dispatcher.dispatch(&desc, 1, Duration::from_secs(1)).await;
        assert!(!outcome.success);
        assert_eq!(outcome.attempts, 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_clamped_to_one() {
        let dispatcher = Dispatcher::new(Arc::new(Collect::default()), Shutdown::new());
        let outcome = dispatcher
            .dispatch(&descriptor("not a url"), 0, Duration::from_secs(1))
            .await;
        assert_eq!(outcome.attempts, 1);
    }

    #[tokio::test]
    async fn test_already_triggered_shutdown_skips_attempts() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let dispatcher = Dispatcher::new(Arc::new(Collect::default()), shutdown.clone());

        let outcome = dispatcher
            .dispatch(&descriptor("http://127.0.0.1:9/"), 2, Duration::from_secs(1))
            .await;
        assert!(outcome.cancelled);
        assert_eq!(outcome.attempts, 0);
        assert!(shutdown.is_triggered());
    }
}
