//! Sent messages: status, history and rendered output.

use std::sync::Arc;

use reqwest::Method;
use serde_json::{Map, Value};

use crate::{
    client::ClientInner,
    common::Paging,
    errors::{Error, Result, ValidationError},
    http::{path_segment, RequestOptions},
};

wire_enum! {
    pub enum MessageStatus {
        Canceled = "CANCELED",
        Clicked = "CLICKED",
        Delayed = "DELAYED",
        Delivered = "DELIVERED",
        Digested = "DIGESTED",
        Enqueued = "ENQUEUED",
        Filtered = "FILTERED",
        Opened = "OPENED",
        Routed = "ROUTED",
        Sent = "SENT",
        Simulated = "SIMULATED",
        Throttled = "THROTTLED",
        Undeliverable = "UNDELIVERABLE",
        Unmapped = "UNMAPPED",
        Unroutable = "UNROUTABLE",
    }
}

wire_enum! {
    /// Why a message ended up undelivered or filtered.
    pub enum Reason {
        Bounced = "BOUNCED",
        Failed = "FAILED",
        Filtered = "FILTERED",
        NoChannels = "NO_CHANNELS",
        NoProviders = "NO_PROVIDERS",
        OptInRequired = "OPT_IN_REQUIRED",
        ProviderError = "PROVIDER_ERROR",
        Unpublished = "UNPUBLISHED",
        Unsubscribed = "UNSUBSCRIBED",
    }
}

wire_struct! {
    /// Delivery state of one message. Timestamps are epoch milliseconds.
    pub struct MessageDetails {
        required {
            id: String = "id",
            status: MessageStatus = "status",
            enqueued: i64 = "enqueued",
            recipient: String = "recipient",
            event: String = "event",
            notification: String = "notification",
        }
        optional {
            sent: i64 = "sent",
            delivered: i64 = "delivered",
            opened: i64 = "opened",
            clicked: i64 = "clicked",
            providers: Vec<Map<String, Value>> = "providers",
        }
        nullable {
            error: String = "error",
            reason: Reason = "reason",
        }
    }
}

wire_struct! {
    pub struct MessageListResponse {
        required {
            paging: Paging = "paging",
            results: Vec<MessageDetails> = "results",
        }
    }
}

wire_struct! {
    /// Raw history events; their shape varies by event type.
    pub struct MessageHistoryResponse {
        required {
            results: Vec<Map<String, Value>> = "results",
        }
    }
}

wire_struct! {
    pub struct RenderedMessageBlock {
        required {
            type_: String = "type",
            text: String = "text",
        }
    }
}

wire_struct! {
    pub struct RenderedMessageContent {
        required {
            html: String = "html",
            title: String = "title",
            body: String = "body",
            subject: String = "subject",
            text: String = "text",
            blocks: Vec<RenderedMessageBlock> = "blocks",
        }
    }
}

wire_struct! {
    pub struct RenderOutput {
        required {
            channel: String = "channel",
            channel_id: String = "channel_id",
            content: RenderedMessageContent = "content",
        }
    }
}

wire_struct! {
    pub struct RenderOutputResponse {
        required {
            results: Vec<RenderOutput> = "results",
        }
    }
}

/// Filters for `GET /messages`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessageListParams {
    pub archived: Option<bool>,
    pub cursor: Option<String>,
    pub event: Option<String>,
    pub list: Option<String>,
    pub message_id: Option<String>,
    pub notification: Option<String>,
    pub provider: Vec<String>,
    pub recipient: Option<String>,
    pub status: Vec<MessageStatus>,
    pub tag: Vec<String>,
    pub tenant_id: Option<String>,
    pub enqueued_after: Option<String>,
    pub trace_id: Option<String>,
}

impl MessageListParams {
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status.push(status);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag.push(tag.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider.push(provider.into());
        self
    }

    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }

    /// Query pairs; list filters repeat their key once per value.
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        let single = [
            ("cursor", &self.cursor),
            ("event", &self.event),
            ("list", &self.list),
            ("messageId", &self.message_id),
            ("notification", &self.notification),
            ("recipient", &self.recipient),
            ("tenant_id", &self.tenant_id),
            ("enqueued_after", &self.enqueued_after),
            ("traceId", &self.trace_id),
        ];
        for (key, value) in single {
            if let Some(value) = value {
                query.push((key, value.clone()));
            }
        }
        if let Some(archived) = self.archived {
            query.push(("archived", archived.to_string()));
        }
        query.extend(self.provider.iter().map(|p| ("provider", p.clone())));
        query.extend(self.status.iter().map(|s| ("status", s.as_str().to_string())));
        query.extend(self.tag.iter().map(|t| ("tag", t.clone())));
        query
    }
}

/// Client for `/messages`.
#[derive(Clone)]
pub struct MessagesClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl MessagesClient {
    pub async fn list(&self, params: MessageListParams) -> Result<MessageListResponse> {
        self.inner.get("/messages", &params.to_query()).await
    }

    pub async fn get(&self, message_id: &str) -> Result<MessageDetails> {
        let path = format!("/messages/{}", path_segment("message_id", message_id)?);
        self.inner.get(&path, &[]).await
    }

    /// Cancel a message that is still delayed or queued.
    pub async fn cancel(&self, message_id: &str) -> Result<MessageDetails> {
        let path = format!("/messages/{}/cancel", path_segment("message_id", message_id)?);
        self.inner
            .execute(Method::POST, &path, &[], None, &RequestOptions::default())
            .await
    }

    /// Event history, optionally restricted to one event type (e.g. `DELIVERED`).
    pub async fn history(
        &self,
        message_id: &str,
        event_type: Option<&str>,
    ) -> Result<MessageHistoryResponse> {
        let path = format!("/messages/{}/history", path_segment("message_id", message_id)?);
        let mut query = Vec::new();
        if let Some(event_type) = event_type {
            if event_type.trim().is_empty() {
                return Err(Error::Validation(
                    ValidationError::new("type must not be blank").with_field("type"),
                ));
            }
            query.push(("type", event_type.to_string()));
        }
        self.inner.get(&path, &query).await
    }

    /// Rendered content for every channel the message was sent on.
    pub async fn content(&self, message_id: &str) -> Result<RenderOutputResponse> {
        let path = format!("/messages/{}/output", path_segment("message_id", message_id)?);
        self.inner.get(&path, &[]).await
    }
}
