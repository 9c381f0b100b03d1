use std::time::Duration;

use reqwest::{header::HeaderMap, Method, StatusCode};

use crate::{
    errors::{APIError, Error, FieldError, Result, RetryMetadata, ValidationError},
    REQUEST_ID_HEADER,
};

/// Per-call overrides for a single API request.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub idempotency_key: Option<String>,
    pub headers: HeaderList,
    pub timeout: Option<Duration>,
    pub retry: Option<RetryConfig>,
}

impl RequestOptions {
    /// Send an `Idempotency-Key` so a retried POST is only acted on once.
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Add an extra header. Blank keys or values are skipped when the request is built.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.0.push(HeaderEntry::new(key.into(), value.into()));
        self
    }

    /// Override the overall request timeout for this call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the retry policy for this call.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Disable retries for this call.
    pub fn disable_retry(mut self) -> Self {
        self.retry = Some(RetryConfig::disabled());
        self
    }
}

/// Retry/backoff configuration (defaults use 3 attempts + jittered exponential backoff).
#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub retry_post: bool,
}

impl RetryConfig {
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Whether the given status code should trigger a retry for this method.
    pub fn should_retry_status(&self, method: &Method, status: StatusCode) -> bool {
        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::REQUEST_TIMEOUT {
            return self.allow_for_method(method);
        }
        if status.is_server_error() {
            return self.allow_for_method(method);
        }
        false
    }

    /// Whether the given transport error should trigger a retry.
    pub fn should_retry_error(&self, method: &Method, err: &reqwest::Error) -> bool {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            return self.allow_for_method(method);
        }
        false
    }

    /// Jittered exponential backoff for the given attempt (1-indexed).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = if attempt == 0 {
            0
        } else {
            (attempt - 1).min(10)
        };
        let base = self.base_backoff.saturating_mul(2u32.saturating_pow(exp));
        let capped = std::cmp::min(base, self.max_backoff);
        let jitter = 0.5 + fastrand::f64(); // 0.5x .. 1.5x
        let seconds = (capped.as_secs_f64() * jitter).min(self.max_backoff.as_secs_f64());
        Duration::from_secs_f64(seconds)
    }

    fn allow_for_method(&self, method: &Method) -> bool {
        if method == Method::POST {
            return self.retry_post;
        }
        true
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(300),
            max_backoff: Duration::from_secs(5),
            retry_post: true,
        }
    }
}

/// Ordered list of extra request headers.
#[derive(Clone, Debug, Default)]
pub struct HeaderList(Vec<HeaderEntry>);

impl HeaderList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a header entry, rejecting blank keys or values.
    pub fn push(&mut self, entry: HeaderEntry) -> Result<(), ValidationError> {
        if !entry.is_valid() {
            return Err(ValidationError::new(format!(
                "header key and value must be non-empty (got key={:?}, value={:?})",
                entry.key, entry.value
            ))
            .with_field("headers"));
        }
        self.0.push(entry);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderEntry> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(key: String, value: String) -> Self {
        Self { key, value }
    }

    pub fn is_valid(&self) -> bool {
        !(self.key.trim().is_empty() || self.value.trim().is_empty())
    }
}

/// Percent-encode one path segment, rejecting blank identifiers.
pub(crate) fn path_segment(field: &str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::Validation(
            ValidationError::new(format!("{field} is required")).with_field(field),
        ));
    }
    Ok(urlencoding::encode(value).into_owned())
}

pub(crate) fn request_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub(crate) fn parse_api_error_parts(
    status: StatusCode,
    headers: &HeaderMap,
    body: String,
    retries: Option<RetryMetadata>,
) -> Error {
    let request_id = request_id_from_headers(headers);
    let status_code = status.as_u16();
    let status_text = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();

    if body.trim().is_empty() {
        return APIError {
            status: status_code,
            code: None,
            message: status_text,
            request_id,
            fields: Vec::new(),
            retries,
            raw_body: None,
        }
        .into();
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
        if let Some(message) = value.get("message").and_then(|v| v.as_str()) {
            let code = value
                .get("type")
                .or_else(|| value.get("code"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            let fields = value
                .get("fields")
                .and_then(|v| serde_json::from_value::<Vec<FieldError>>(v.clone()).ok())
                .unwrap_or_default();
            let req_id = value
                .get("request_id")
                .or_else(|| value.get("requestId"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .or(request_id);
            return APIError {
                status: status_code,
                code,
                message: message.to_string(),
                request_id: req_id,
                fields,
                retries,
                raw_body: Some(body.clone()),
            }
            .into();
        }
    }

    APIError {
        status: status_code,
        code: None,
        message: body.clone(),
        request_id,
        fields: Vec::new(),
        retries,
        raw_body: Some(body),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn backoff_respects_max_and_jitter() {
        let retry = RetryConfig {
            max_attempts: 3,
            base_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(1),
            retry_post: true,
        };

        let delay = retry.backoff_delay(5);
        assert!(delay <= Duration::from_secs(1));
        assert!(delay >= Duration::from_millis(250));
    }

    #[test]
    fn retry_post_toggle_honored() {
        let retry = RetryConfig {
            retry_post: false,
            ..Default::default()
        };
        assert!(!retry.should_retry_status(&Method::POST, StatusCode::INTERNAL_SERVER_ERROR));
        assert!(retry.should_retry_status(&Method::GET, StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!retry.should_retry_status(&Method::GET, StatusCode::NOT_FOUND));
    }

    #[test]
    fn request_options_disable_retry_sets_single_attempt() {
        let opts = RequestOptions::default()
            .with_idempotency_key("send-123")
            .disable_retry();
        assert_eq!(opts.retry.unwrap().max_attempts, 1);
        assert_eq!(opts.idempotency_key.as_deref(), Some("send-123"));
    }

    #[test]
    fn header_list_rejects_blank_entries() {
        let mut list = HeaderList::new();
        list.push(HeaderEntry::new("X-Custom".into(), "value".into()))
            .unwrap();
        let err = list
            .push(HeaderEntry::new("   ".into(), "value".into()))
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("headers"));
        assert_eq!(list.iter().count(), 1);
    }

    #[test]
    fn path_segment_encodes_and_rejects_blank() {
        assert_eq!(path_segment("list_id", "team/eng a").unwrap(), "team%2Feng%20a");
        let err = path_segment("list_id", " ").unwrap_err();
        match err {
            Error::Validation(err) => assert_eq!(err.field.as_deref(), Some("list_id")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn api_error_reads_courier_envelope() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("hdr-1"));
        let err = parse_api_error_parts(
            StatusCode::BAD_REQUEST,
            &headers,
            r#"{"message":"Invalid recipient","type":"invalid_request_error"}"#.into(),
            None,
        );
        match err {
            Error::Api(api) => {
                assert_eq!(api.status, 400);
                assert_eq!(api.code.as_deref(), Some("invalid_request_error"));
                assert_eq!(api.message, "Invalid recipient");
                assert_eq!(api.request_id.as_deref(), Some("hdr-1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn api_error_falls_back_to_status_text_and_raw_body() {
        let empty = parse_api_error_parts(
            StatusCode::NOT_FOUND,
            &HeaderMap::new(),
            String::new(),
            None,
        );
        assert!(matches!(empty, Error::Api(ref api) if api.message == "Not Found"));

        let text = parse_api_error_parts(
            StatusCode::BAD_GATEWAY,
            &HeaderMap::new(),
            "upstream unavailable".into(),
            None,
        );
        assert!(
            matches!(text, Error::Api(ref api) if api.message == "upstream unavailable" && api.raw_body.is_some())
        );
    }
}
