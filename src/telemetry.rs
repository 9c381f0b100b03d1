use std::{fmt, sync::Arc, time::Duration};

use crate::RetryMetadata;

/// User-provided callbacks for emitting metrics without taking on a tracing dependency.
#[derive(Clone, Default)]
pub struct MetricsCallbacks {
    pub http_request: Option<Arc<dyn Fn(HttpRequestMetrics) + Send + Sync>>,
}

impl MetricsCallbacks {
    pub fn with_http_request(
        mut self,
        callback: impl Fn(HttpRequestMetrics) + Send + Sync + 'static,
    ) -> Self {
        self.http_request = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for MetricsCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsCallbacks")
            .field(
                "http_request",
                &self.http_request.as_ref().map(|_| "callback"),
            )
            .finish()
    }
}

/// Request metadata attached to every metrics event.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        if let Some(id) = request_id {
            if !id.trim().is_empty() {
                self.request_id = Some(id);
            }
        }
        self
    }
}

/// HTTP request latency and outcome.
#[derive(Clone, Debug)]
pub struct HttpRequestMetrics {
    pub latency: Duration,
    pub status: Option<u16>,
    pub error: Option<String>,
    pub retries: Option<RetryMetadata>,
    pub context: RequestContext,
}

/// Internal helper that owns the registered callbacks (if any).
#[derive(Clone, Default)]
pub(crate) struct Telemetry {
    callbacks: MetricsCallbacks,
}

impl Telemetry {
    pub fn new(callbacks: Option<MetricsCallbacks>) -> Self {
        Self {
            callbacks: callbacks.unwrap_or_default(),
        }
    }

    pub fn http_enabled(&self) -> bool {
        self.callbacks.http_request.is_some()
    }

    pub fn record_http(&self, metrics: HttpRequestMetrics) {
        if let Some(cb) = &self.callbacks.http_request {
            cb(metrics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn records_http_metrics_when_registered() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let telemetry = Telemetry::new(Some(MetricsCallbacks::default().with_http_request(
            move |metrics: HttpRequestMetrics| {
                sink.lock().unwrap().push(metrics.context.path);
            },
        )));

        assert!(telemetry.http_enabled());
        telemetry.record_http(HttpRequestMetrics {
            latency: Duration::from_millis(12),
            status: Some(200),
            error: None,
            retries: None,
            context: RequestContext::new("POST", "/send"),
        });
        assert_eq!(seen.lock().unwrap().as_slice(), ["/send".to_string()]);
    }

    #[test]
    fn blank_request_ids_are_ignored() {
        let ctx = RequestContext::new("GET", "/lists").with_request_id(Some("  ".into()));
        assert_eq!(ctx.request_id, None);
        assert!(!Telemetry::new(None).http_enabled());
    }
}
