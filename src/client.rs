use std::fmt;
use std::time::Duration;

use reqwest::{header::HeaderMap, StatusCode};
use serde_json::Value as JsonValue;
use tokio::time::sleep;

use crate::{ClientOptions, FailureDetail, GettrError, Pages, Params, Result};

/// Production API host; [`GettrClient::new`] points here.
pub const GETTR_API_BASE_URL: &str = "https://api.gettr.com";

/// Success-envelope key used unless a call overrides it.
pub(crate) const DEFAULT_ENVELOPE_KEY: &str = "result";

const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Clone)]
/// HTTP client for the GETTR API.
///
/// Owns the base URL and an opaque static header map (e.g. an auth blob
/// built by a caller); both are immutable after construction, so a client
/// can be shared across tasks.
pub struct GettrClient {
    http: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
    options: ClientOptions,
}

impl fmt::Debug for GettrClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GettrClient")
            .field("base_url", &self.base_url)
            .field("headers", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl Default for GettrClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GettrClient {
    /// Creates a client against the production API host.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gettr_http::GettrClient;
    ///
    /// # async fn run() -> gettr_http::Result<()> {
    /// let client = GettrClient::new();
    /// let profile = client.get("/s/uinf/support", ()).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_base_url(GETTR_API_BASE_URL)
    }

    /// Creates a client against a custom base URL.
    ///
    /// Example: `"https://api.gettr.com"` or a mock server address. The
    /// request path is appended verbatim.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            headers: HeaderMap::new(),
            options: ClientOptions::default(),
        }
    }

    /// Attaches static headers sent with every request.
    ///
    /// The engine treats the map as opaque; auth schemes (e.g. the
    /// `X-App-Auth` user/token blob) are the caller's concern.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    pub(crate) fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Requests `path` and returns the envelope's `result` payload, using
    /// the configured retry budget.
    pub async fn get(&self, path: &str, params: impl Into<Params>) -> Result<JsonValue> {
        let params = params.into();
        self.get_with(path, &params, self.options.retries, DEFAULT_ENVELOPE_KEY)
            .await
    }

    /// Requests `path` with an explicit retry budget and envelope key.
    ///
    /// Transient failures (timeout, connect failure, 429/500/502/503/504)
    /// sleep `backoff_base * 4^(attempt-1)` before the next attempt; an
    /// `error` envelope or a malformed body consumes an attempt without
    /// sleeping. Once the budget is spent the most recently recorded cause
    /// is returned inside [`GettrError::Api`].
    pub async fn get_with(
        &self,
        path: &str,
        params: &Params,
        retries: u32,
        envelope_key: &str,
    ) -> Result<JsonValue> {
        let url = format!("{}{}", self.base_url, path);
        let mut tries = 0u32;
        let mut detail: Option<FailureDetail> = None;

        while tries < retries {
            tries += 1;
            tracing::debug!(
                "requesting {} (params: {:?}, attempt {}/{})",
                url,
                params,
                tries,
                retries
            );

            let mut request = self
                .http
                .get(&url)
                .headers(self.headers.clone())
                .timeout(Duration::from_millis(self.options.timeout_ms));
            if !params.is_empty() {
                request = request.query(params.pairs());
            }
            let response = request.send().await;

            let response = match response {
                Ok(response) => response,
                Err(err) => {
                    let cause = FailureDetail::Transport(err.to_string());
                    self.wait_before_retry(tries, retries, &cause).await;
                    detail = Some(cause);
                    continue;
                }
            };

            let status = response.status();
            if is_retryable_status(status) {
                let cause = FailureDetail::Status(status.as_u16());
                self.wait_before_retry(tries, retries, &cause).await;
                detail = Some(cause);
                continue;
            }

            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    let cause = FailureDetail::Transport(err.to_string());
                    self.wait_before_retry(tries, retries, &cause).await;
                    detail = Some(cause);
                    continue;
                }
            };
            tracing::debug!("{} gave response: {}", url, body);

            match classify_envelope(&body, envelope_key) {
                EnvelopeOutcome::Success(payload) => return Ok(payload),
                EnvelopeOutcome::ApiError(payload) => {
                    detail = Some(FailureDetail::Api(payload));
                }
                EnvelopeOutcome::Malformed(excerpt) => {
                    detail = Some(FailureDetail::Malformed(excerpt));
                }
            }
        }

        match detail {
            Some(detail) => Err(GettrError::Api { tries, detail }),
            // retries == 0: the loop body never ran.
            None => Err(GettrError::NoAttempts),
        }
    }

    /// Paginates requests to `path`, returning a lazy page sequence.
    ///
    /// Defaults follow the platform convention: `offset` query key starting
    /// at 0 advancing by 20, pages counted by the payload's `data.list`
    /// array. See [`Pages`] for per-call overrides.
    pub fn get_paginated(&self, path: impl Into<String>, params: impl Into<Params>) -> Pages<'_> {
        Pages::new(self, path.into(), params.into())
    }

    async fn wait_before_retry(&self, attempt: u32, retries: u32, cause: &FailureDetail) {
        let delay = self.options.backoff_delay(attempt);
        tracing::warn!(
            "unable to pull from api: {}; waiting {:?} before retrying ({}/{})",
            cause,
            delay,
            attempt,
            retries
        );
        sleep(delay).await;
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

pub(crate) enum EnvelopeOutcome {
    Success(JsonValue),
    ApiError(JsonValue),
    Malformed(String),
}

/// Splits a response body into the envelope taxonomy: success payload under
/// `envelope_key`, application error under `error`, anything else malformed.
/// Statuses outside the retryable set still pass through here, so e.g. a 400
/// carrying an `error` envelope is retried as an application-level failure.
pub(crate) fn classify_envelope(body: &str, envelope_key: &str) -> EnvelopeOutcome {
    match serde_json::from_str::<JsonValue>(body) {
        Ok(envelope) => {
            if let Some(payload) = envelope.get(envelope_key) {
                EnvelopeOutcome::Success(payload.clone())
            } else if let Some(error) = envelope.get("error") {
                EnvelopeOutcome::ApiError(error.clone())
            } else {
                EnvelopeOutcome::Malformed(excerpt(body))
            }
        }
        Err(_) => EnvelopeOutcome::Malformed(excerpt(body)),
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::{classify_envelope, is_retryable_status, EnvelopeOutcome, GettrClient};
    use reqwest::{header::HeaderMap, StatusCode};
    use serde_json::json;

    #[test]
    fn classify_extracts_success_payload_under_configured_key() {
        let body = r#"{"result": {"data": {"list": [1, 2, 3]}}}"#;
        match classify_envelope(body, "result") {
            EnvelopeOutcome::Success(payload) => {
                assert_eq!(payload, json!({"data": {"list": [1, 2, 3]}}));
            }
            _ => panic!("expected success envelope"),
        }
    }

    #[test]
    fn classify_prefers_success_key_over_error_key() {
        let body = r#"{"result": 1, "error": {"code": "E"}}"#;
        assert!(matches!(
            classify_envelope(body, "result"),
            EnvelopeOutcome::Success(_)
        ));
    }

    #[test]
    fn classify_surfaces_error_payload() {
        let body = r#"{"error": {"code": "E_AUTH", "emsg": "token expired"}}"#;
        match classify_envelope(body, "result") {
            EnvelopeOutcome::ApiError(payload) => {
                assert_eq!(payload["code"], "E_AUTH");
            }
            _ => panic!("expected api error envelope"),
        }
    }

    #[test]
    fn classify_flags_non_json_and_keyless_bodies_as_malformed() {
        assert!(matches!(
            classify_envelope("<html>bad gateway</html>", "result"),
            EnvelopeOutcome::Malformed(_)
        ));
        assert!(matches!(
            classify_envelope(r#"{"neither": true}"#, "result"),
            EnvelopeOutcome::Malformed(_)
        ));
        assert!(matches!(
            classify_envelope("[1, 2]", "result"),
            EnvelopeOutcome::Malformed(_)
        ));
    }

    #[test]
    fn retryable_statuses_match_platform_set() {
        for code in [429u16, 500, 502, 503, 504] {
            let status = StatusCode::from_u16(code).expect("valid status");
            assert!(is_retryable_status(status), "{code} must be retryable");
        }
        for code in [200u16, 400, 401, 403, 404] {
            let status = StatusCode::from_u16(code).expect("valid status");
            assert!(!is_retryable_status(status), "{code} must not be retryable");
        }
    }

    #[test]
    fn debug_redacts_header_values() {
        let mut headers = HeaderMap::new();
        headers.insert("x-app-auth", "secret-token".parse().expect("header value"));
        let client = GettrClient::new().with_headers(headers);
        let debug = format!("{client:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-token"));
    }
}
