use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE},
    Method, StatusCode,
};
use serde_json::Value;
use tokio::time::sleep;

use crate::{
    codec::{self, FromWire, ToWire},
    errors::{DecodeError, Error, Result, RetryMetadata, TransportError, TransportErrorKind},
    http::{parse_api_error_parts, request_id_from_headers, HeaderList, RequestOptions, RetryConfig},
    telemetry::{HttpRequestMetrics, MetricsCallbacks, RequestContext, Telemetry},
    AudiencesClient, AuthClient, BrandsClient, BulkClient, ListsClient, MessagesClient,
    ProfilesClient, SendClient, TenantsClient, TranslationsClient, AUTH_TOKEN_ENV, BASE_URL_ENV,
    CLIENT_HEADER, DEFAULT_BASE_URL, DEFAULT_CLIENT_HEADER, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_REQUEST_TIMEOUT, IDEMPOTENCY_KEY_HEADER,
};

#[derive(Clone, Debug, Default)]
pub struct Config {
    /// API base URL (defaults to `https://api.courier.com`).
    pub base_url: Option<String>,
    /// Courier auth token, sent as a bearer token.
    pub auth_token: Option<String>,
    pub client_header: Option<String>,
    pub http_client: Option<reqwest::Client>,
    /// Override the connect timeout (defaults to 5s).
    pub connect_timeout: Option<Duration>,
    /// Override the request timeout (defaults to 60s).
    pub timeout: Option<Duration>,
    /// Retry/backoff policy (defaults to 3 attempts, exponential backoff + jitter).
    pub retry: Option<RetryConfig>,
    /// Default extra headers applied to all requests.
    pub default_headers: Option<HeaderList>,
    /// Optional metrics callbacks (HTTP latency and outcome).
    pub metrics: Option<MetricsCallbacks>,
}

impl Config {
    /// Read `COURIER_AUTH_TOKEN` (required) and `COURIER_BASE_URL` (optional).
    pub fn from_env() -> Result<Self> {
        let auth_token = std::env::var(AUTH_TOKEN_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| Error::Config(format!("{AUTH_TOKEN_ENV} is not set")))?;
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty());
        Ok(Self {
            base_url,
            auth_token: Some(auth_token),
            ..Default::default()
        })
    }
}

#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

/// Request body for a single call.
pub(crate) enum Body {
    Json(Value),
    Text(String),
}

/// Undecoded response of a successful call.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Value of the `X-Request-Id` response header.
    pub fn request_id(&self) -> Option<String> {
        request_id_from_headers(&self.headers)
    }

    /// Body as UTF-8 text. Invalid UTF-8 is a decode error at `$`.
    pub fn text(&self) -> codec::DecodeResult<String> {
        String::from_utf8(self.body.clone()).map_err(|err| DecodeError::MalformedJson {
            message: format!("response body is not UTF-8: {err}"),
            path: codec::ROOT.to_string(),
        })
    }
}

pub(crate) struct ClientInner {
    base_url: String,
    auth_token: String,
    client_header: String,
    http: reqwest::Client,
    request_timeout: Duration,
    retry: RetryConfig,
    default_headers: Option<HeaderList>,
    telemetry: Telemetry,
}

impl Client {
    pub fn new(cfg: Config) -> Result<Self> {
        let base = cfg
            .base_url
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|err| Error::Config(format!("invalid base url: {err}")))?;

        let auth_token = cfg
            .auth_token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Config("auth token is required".to_string()))?;

        let connect_timeout = cfg.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        let request_timeout = cfg.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http = match cfg.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .connect_timeout(connect_timeout)
                .build()
                .map_err(|err| TransportError {
                    kind: TransportErrorKind::Connect,
                    message: "failed to build http client".to_string(),
                    source: Some(err),
                    retries: None,
                })?,
        };

        let client_header = cfg
            .client_header
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CLIENT_HEADER.to_string());

        Ok(Self {
            inner: Arc::new(ClientInner {
                base_url,
                auth_token,
                client_header,
                http,
                request_timeout,
                retry: cfg.retry.unwrap_or_default(),
                default_headers: cfg.default_headers,
                telemetry: Telemetry::new(cfg.metrics),
            }),
        })
    }

    /// Build a client from `COURIER_AUTH_TOKEN` / `COURIER_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    pub fn send(&self) -> SendClient {
        SendClient {
            inner: self.inner.clone(),
        }
    }

    pub fn messages(&self) -> MessagesClient {
        MessagesClient {
            inner: self.inner.clone(),
        }
    }

    pub fn lists(&self) -> ListsClient {
        ListsClient {
            inner: self.inner.clone(),
        }
    }

    pub fn brands(&self) -> BrandsClient {
        BrandsClient {
            inner: self.inner.clone(),
        }
    }

    pub fn tenants(&self) -> TenantsClient {
        TenantsClient {
            inner: self.inner.clone(),
        }
    }

    pub fn audiences(&self) -> AudiencesClient {
        AudiencesClient {
            inner: self.inner.clone(),
        }
    }

    pub fn profiles(&self) -> ProfilesClient {
        ProfilesClient {
            inner: self.inner.clone(),
        }
    }

    pub fn bulk(&self) -> BulkClient {
        BulkClient {
            inner: self.inner.clone(),
        }
    }

    pub fn translations(&self) -> TranslationsClient {
        TranslationsClient {
            inner: self.inner.clone(),
        }
    }

    pub fn auth(&self) -> AuthClient {
        AuthClient {
            inner: self.inner.clone(),
        }
    }
}

fn apply_header_list(
    mut builder: reqwest::RequestBuilder,
    headers: &HeaderList,
) -> Result<reqwest::RequestBuilder> {
    for entry in headers.iter() {
        if !entry.is_valid() {
            continue;
        }
        let name = HeaderName::from_bytes(entry.key.trim().as_bytes())
            .map_err(|err| Error::Config(format!("invalid header name: {err}")))?;
        let val = HeaderValue::from_str(entry.value.trim())
            .map_err(|err| Error::Config(format!("invalid header value: {err}")))?;
        builder = builder.header(name, val);
    }
    Ok(builder)
}

impl ClientInner {
    /// Issue one API call and return the undecoded response of a 2xx reply.
    ///
    /// Non-2xx replies become `Error::Api`; transport failures become
    /// `Error::Transport`. Both are retried according to the effective
    /// `RetryConfig`.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Body>,
        options: &RequestOptions,
    ) -> Result<RawResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        builder = match body {
            Some(Body::Json(value)) => builder.json(&value),
            Some(Body::Text(text)) => builder
                .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(text),
            None => builder,
        };
        builder = self.with_headers(builder, options)?;
        builder = builder.timeout(options.timeout.unwrap_or(self.request_timeout));

        let retry = options
            .retry
            .clone()
            .unwrap_or_else(|| self.retry.clone());
        let ctx = RequestContext::new(method.as_str(), path);
        let resp = self.send_with_retry(builder, method, retry, ctx).await?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|err| self.to_transport_error(err, None))?;
        Ok(RawResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }

    /// Decode a response body through the wire codec. An empty body decodes as `null`.
    pub(crate) fn convert<T: FromWire>(&self, resp: RawResponse) -> Result<T> {
        let decoded = if resp.body.iter().all(u8::is_ascii_whitespace) {
            T::from_wire(&Value::Null, codec::ROOT)
        } else {
            codec::decode(&resp.body)
        };
        decoded.map_err(|err| {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %err, request_id = ?resp.request_id(), "failed to decode response");
            Error::Decode(err)
        })
    }

    pub(crate) async fn execute<T: FromWire>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Body>,
        options: &RequestOptions,
    ) -> Result<T> {
        let resp = self.request(method, path, query, body, options).await?;
        self.convert(resp)
    }

    pub(crate) async fn get<T: FromWire>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        self.execute(Method::GET, path, query, None, &RequestOptions::default())
            .await
    }

    pub(crate) async fn send_json<T: FromWire, B: ToWire + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<T> {
        self.execute(method, path, &[], Some(Body::Json(body.to_wire())), options)
            .await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, &[], None, &RequestOptions::default())
            .await
    }

    fn with_headers(
        &self,
        mut builder: reqwest::RequestBuilder,
        options: &RequestOptions,
    ) -> Result<reqwest::RequestBuilder> {
        builder = builder
            .header(ACCEPT, "application/json")
            .header(CLIENT_HEADER, self.client_header.as_str())
            .bearer_auth(&self.auth_token);
        if let Some(key) = options.idempotency_key.as_deref() {
            if !key.trim().is_empty() {
                builder = builder.header(IDEMPOTENCY_KEY_HEADER, key.trim());
            }
        }
        if let Some(defaults) = &self.default_headers {
            builder = apply_header_list(builder, defaults)?;
        }
        apply_header_list(builder, &options.headers)
    }

    async fn send_with_retry(
        &self,
        builder: reqwest::RequestBuilder,
        method: Method,
        retry: RetryConfig,
        ctx: RequestContext,
    ) -> Result<reqwest::Response> {
        let max_attempts = retry.max_attempts.max(1);
        let mut state = RetryState::new();
        let start = Instant::now();

        for attempt in 1..=max_attempts {
            let attempt_builder = builder
                .try_clone()
                .ok_or_else(|| Error::Config("request body is not cloneable for retry".into()))?;
            #[cfg(feature = "tracing")]
            let span = tracing::debug_span!(
                "courier.http",
                method = %ctx.method,
                path = %ctx.path,
                attempt,
                max_attempts
            );
            #[cfg(feature = "tracing")]
            let _guard = span.enter();
            let result = attempt_builder.send().await;

            match result {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        if self.telemetry.http_enabled() {
                            let http_ctx = ctx
                                .clone()
                                .with_request_id(request_id_from_headers(resp.headers()));
                            self.telemetry.record_http(HttpRequestMetrics {
                                latency: start.elapsed(),
                                status: Some(status.as_u16()),
                                error: None,
                                retries: state.metadata(),
                                context: http_ctx,
                            });
                        }
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            status = %status,
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            "request completed"
                        );
                        return Ok(resp);
                    }
                    state.record_attempt(attempt);
                    state.record_status(status);

                    let should_retry = retry.should_retry_status(&method, status);
                    if should_retry && attempt < max_attempts {
                        sleep(retry.backoff_delay(attempt)).await;
                        continue;
                    }

                    let retries = state.metadata();
                    let headers = resp.headers().clone();
                    if self.telemetry.http_enabled() {
                        let http_ctx = ctx
                            .clone()
                            .with_request_id(request_id_from_headers(&headers));
                        self.telemetry.record_http(HttpRequestMetrics {
                            latency: start.elapsed(),
                            status: Some(status.as_u16()),
                            error: Some(format!("http {}", status.as_u16())),
                            retries: retries.clone(),
                            context: http_ctx,
                        });
                    }
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        status = %status,
                        attempt,
                        "request failed; returning error"
                    );
                    let body = resp.text().await.unwrap_or_default();
                    return Err(parse_api_error_parts(status, &headers, body, retries));
                }
                Err(err) => {
                    state.record_attempt(attempt);
                    state.record_error(&err);
                    let should_retry = retry.should_retry_error(&method, &err);
                    if should_retry && attempt < max_attempts {
                        sleep(retry.backoff_delay(attempt)).await;
                        continue;
                    }

                    let retries = state.metadata();
                    if self.telemetry.http_enabled() {
                        self.telemetry.record_http(HttpRequestMetrics {
                            latency: start.elapsed(),
                            status: None,
                            error: Some(err.to_string()),
                            retries: retries.clone(),
                            context: ctx.clone(),
                        });
                    }
                    #[cfg(feature = "tracing")]
                    tracing::warn!(attempt, error = %err, "transport error");
                    return Err(self.to_transport_error(err, retries));
                }
            }
        }

        Err(Error::Transport(TransportError {
            kind: TransportErrorKind::Other,
            message: "request failed".to_string(),
            source: None,
            retries: state.metadata(),
        }))
    }

    fn to_transport_error(&self, err: reqwest::Error, retries: Option<RetryMetadata>) -> Error {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if err.is_request() {
            TransportErrorKind::Request
        } else {
            TransportErrorKind::Other
        };

        TransportError {
            kind,
            message: err.to_string(),
            source: Some(err),
            retries,
        }
        .into()
    }
}

#[derive(Default)]
struct RetryState {
    attempts: u32,
    last_status: Option<u16>,
    last_error: Option<String>,
}

impl RetryState {
    fn new() -> Self {
        Self::default()
    }

    fn record_attempt(&mut self, attempt: u32) {
        self.attempts = attempt;
    }

    fn record_status(&mut self, status: StatusCode) {
        self.last_status = Some(status.as_u16());
    }

    fn record_error(&mut self, err: &reqwest::Error) {
        self.last_error = Some(err.to_string());
    }

    fn metadata(&self) -> Option<RetryMetadata> {
        if self.attempts <= 1 {
            None
        } else {
            Some(RetryMetadata {
                attempts: self.attempts,
                last_status: self.last_status,
                last_error: self.last_error.clone(),
            })
        }
    }
}
