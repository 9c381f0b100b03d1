//! Message payloads for `POST /send`.
//!
//! A [`Message`] is either a [`ContentMessage`] (inline Elemental content) or
//! a [`TemplateMessage`] (a stored notification template). Both embed the
//! same cross-cutting fields through [`BaseMessage`] and the recipient
//! through [`BaseMessageSendTo`].

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::common::{MessageContext, Utm};
use crate::elemental::Content;
use crate::recipients::MessageRecipient;

wire_enum! {
    /// How channels in a routing list are attempted.
    pub enum RoutingMethod {
        /// Deliver on every listed channel.
        All = "all",
        /// Deliver on the first channel that succeeds.
        Single = "single",
    }
}

wire_struct! {
    /// A nested routing step inside a channel list.
    pub struct RoutingStrategyChannel {
        required {
            channel: String = "channel",
        }
        optional {
            method: RoutingMethod = "method",
            config: Map<String, Value> = "config",
            providers: BTreeMap<String, MessageProviderConfig> = "providers",
            if_: String = "if",
        }
    }
}

wire_union! {
    /// One entry of [`Routing::channels`]: a bare channel name or a nested strategy.
    pub enum RoutingChannel {
        Name(String) [is_name, as_name],
        Strategy(RoutingStrategyChannel) [is_strategy, as_strategy],
    }
}

impl From<&str> for RoutingChannel {
    fn from(name: &str) -> Self {
        RoutingChannel::Name(name.to_string())
    }
}

wire_struct! {
    pub struct Routing {
        required {
            method: RoutingMethod = "method",
            channels: Vec<RoutingChannel> = "channels",
        }
    }
}

wire_struct! {
    /// Postpone delivery by a duration (milliseconds) or until a time.
    pub struct Delay {
        optional {
            duration: i64 = "duration",
            until: String = "until",
        }
    }
}

wire_union! {
    /// Expiry window: a duration string such as `"1 day"` or milliseconds.
    pub enum ExpiresIn {
        Text(String) [is_text, as_text],
        Millis(i64) [is_millis, as_millis],
    }
}

wire_struct! {
    pub struct Expiry {
        required {
            expires_in: ExpiresIn = "expires_in",
        }
        optional {
            expires_at: String = "expires_at",
        }
    }
}

wire_enum! {
    pub enum TimeoutCriteria {
        NoEscalation = "no-escalation",
        Delivered = "delivered",
        Viewed = "viewed",
        Engaged = "engaged",
    }
}

wire_struct! {
    /// Per-provider, per-channel and whole-message timeouts in milliseconds.
    pub struct Timeout {
        optional {
            provider: BTreeMap<String, i64> = "provider",
            channel: BTreeMap<String, i64> = "channel",
            message: i64 = "message",
            escalation: i64 = "escalation",
            criteria: TimeoutCriteria = "criteria",
        }
    }
}

wire_struct! {
    pub struct MessageMetadata {
        optional {
            event: String = "event",
            tags: Vec<String> = "tags",
            trace_id: String = "trace_id",
            utm: Utm = "utm",
        }
    }
}

wire_struct! {
    pub struct ChannelMetadata {
        optional {
            utm: Utm = "utm",
        }
    }
}

wire_struct! {
    pub struct ChannelTimeouts {
        optional {
            provider: i64 = "provider",
            channel: i64 = "channel",
        }
    }
}

wire_struct! {
    /// Overrides applied when delivering through one channel.
    pub struct MessageChannelConfig {
        optional {
            brand_id: String = "brand_id",
            providers: Vec<String> = "providers",
            routing_method: RoutingMethod = "routing_method",
            if_: String = "if",
            timeouts: ChannelTimeouts = "timeouts",
            override_: Map<String, Value> = "override",
            metadata: ChannelMetadata = "metadata",
        }
    }
}

wire_struct! {
    /// Overrides applied when delivering through one provider.
    pub struct MessageProviderConfig {
        optional {
            override_: Map<String, Value> = "override",
            if_: String = "if",
            timeouts: i64 = "timeouts",
            metadata: ChannelMetadata = "metadata",
        }
    }
}

wire_struct! {
    pub struct MessagePreferences {
        required {
            subscription_topic_id: String = "subscription_topic_id",
        }
    }
}

wire_struct! {
    /// Fields shared by content and template messages.
    pub struct BaseMessage {
        optional {
            data: Map<String, Value> = "data",
            brand_id: String = "brand_id",
            channels: BTreeMap<String, MessageChannelConfig> = "channels",
            context: MessageContext = "context",
            metadata: MessageMetadata = "metadata",
            preferences: MessagePreferences = "preferences",
            providers: BTreeMap<String, MessageProviderConfig> = "providers",
            routing: Routing = "routing",
            timeout: Timeout = "timeout",
            delay: Delay = "delay",
            expiry: Expiry = "expiry",
        }
    }
}

impl Default for BaseMessage {
    fn default() -> Self {
        Self::new()
    }
}

wire_struct! {
    pub struct BaseMessageSendTo {
        optional {
            to: MessageRecipient = "to",
        }
    }
}

impl Default for BaseMessageSendTo {
    fn default() -> Self {
        Self::new()
    }
}

wire_struct! {
    /// A message carrying its own content.
    pub struct ContentMessage {
        required {
            content: Content = "content",
        }
        flatten {
            base: BaseMessage,
            send_to: BaseMessageSendTo,
        }
    }
}

wire_struct! {
    /// A message rendered from a stored template id or alias.
    pub struct TemplateMessage {
        required {
            template: String = "template",
        }
        flatten {
            base: BaseMessage,
            send_to: BaseMessageSendTo,
        }
    }
}

macro_rules! send_to_setter {
    ($name:ident) => {
        impl $name {
            /// Set the recipient.
            pub fn to(mut self, to: impl Into<MessageRecipient>) -> Self {
                self.send_to.to = Some(to.into());
                self
            }

            pub fn recipient(&self) -> Option<&MessageRecipient> {
                self.send_to.to.as_ref()
            }
        }
    };
}

send_to_setter!(ContentMessage);
send_to_setter!(TemplateMessage);

wire_union! {
    pub enum Message {
        Content(ContentMessage) [is_content, as_content],
        Template(TemplateMessage) [is_template, as_template],
    }
}

impl Message {
    pub fn base(&self) -> &BaseMessage {
        match self {
            Message::Content(message) => &message.base,
            Message::Template(message) => &message.base,
        }
    }

    pub fn recipient(&self) -> Option<&MessageRecipient> {
        match self {
            Message::Content(message) => message.recipient(),
            Message::Template(message) => message.recipient(),
        }
    }
}

wire_struct! {
    pub struct SendMessageRequest {
        required {
            message: Message = "message",
        }
    }
}

wire_struct! {
    pub struct SendMessageResponse {
        required {
            request_id: String = "requestId",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_value, encode_value};
    use crate::elemental::{ElementalContent, ElementalContentSugar, ElementalNode};
    use crate::errors::DecodeError;
    use crate::recipients::UserRecipient;
    use serde_json::json;

    #[test]
    fn decodes_template_message_with_cross_cutting_fields() {
        let request: SendMessageRequest = decode_value(&json!({
            "message": {
                "template": "welcome",
                "to": {"user_id": "u1"},
                "data": {"name": "Ada"},
                "routing": {
                    "method": "single",
                    "channels": ["email", {"channel": "push", "method": "all"}]
                },
                "delay": {"duration": 5000},
                "expiry": {"expires_in": "1 day"},
                "timeout": {"message": 60000, "criteria": "delivered"},
                "metadata": {"tags": ["onboarding"], "utm": {"source": "app"}}
            }
        }))
        .unwrap();

        let message = request.message.as_template().unwrap();
        assert_eq!(message.template, "welcome");
        let routing = message.base.routing.as_ref().unwrap();
        assert_eq!(routing.method, RoutingMethod::Single);
        assert_eq!(routing.channels[0].as_name().unwrap(), "email");
        assert_eq!(
            routing.channels[1].as_strategy().unwrap().method,
            Some(RoutingMethod::All)
        );
        assert_eq!(message.base.delay.as_ref().unwrap().duration, Some(5000));
        assert!(message.base.expiry.as_ref().unwrap().expires_in.is_text());
        assert_eq!(
            message.base.timeout.as_ref().unwrap().criteria,
            Some(TimeoutCriteria::Delivered)
        );
        assert!(request
            .message
            .recipient()
            .unwrap()
            .as_single()
            .unwrap()
            .is_user());
    }

    #[test]
    fn content_message_prefers_content_over_template() {
        let message: Message = decode_value(&json!({
            "content": {"title": "Hi", "body": "There"},
            "template": "ignored"
        }))
        .unwrap();
        let content = message.as_content().unwrap();
        assert!(content.content.is_sugar());
        assert!(message.as_template().is_err());
    }

    #[test]
    fn invalid_content_is_not_masked_by_template() {
        let err = decode_value::<Message>(&json!({
            "content": {"title": "Hi"},
            "template": "welcome"
        }))
        .unwrap_err();
        assert!(matches!(err, DecodeError::NoMatchingVariant { ref path, .. } if path == "$.content"));
    }

    #[test]
    fn bad_audience_filter_fails_the_whole_send() {
        let err = decode_value::<SendMessageRequest>(&json!({
            "message": {
                "template": "t",
                "to": {
                    "audience_id": "vip",
                    "filters": [{"operator": "NOT_REAL", "path": "account_id", "value": "a"}]
                }
            }
        }))
        .unwrap_err();
        assert_eq!(err.path(), Some("$.message.to.filters[0].operator"));
        assert!(matches!(err, DecodeError::InvalidEnumValue { .. }));
    }

    #[test]
    fn message_without_content_or_template_matches_nothing() {
        let err = decode_value::<Message>(&json!({"to": {"user_id": "u1"}})).unwrap_err();
        assert_eq!(
            err,
            DecodeError::NoMatchingVariant {
                union: "Message".into(),
                path: "$".into(),
            }
        );
    }

    #[test]
    fn nested_enum_failure_keeps_its_path() {
        let err = decode_value::<SendMessageRequest>(&json!({
            "message": {
                "template": "welcome",
                "routing": {"method": "sometimes", "channels": []}
            }
        }))
        .unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidEnumValue {
                enum_name: "RoutingMethod".into(),
                value: "sometimes".into(),
                path: "$.message.routing.method".into(),
            }
        );
    }

    #[test]
    fn embedded_fields_encode_flat() {
        let content = ElementalContent::current(vec![ElementalNode::text("Hello")]);
        let message = ContentMessage::new(content)
            .base(BaseMessage::new().brand_id("brand-1"))
            .to(UserRecipient::with_user_id("u1"));

        let wire = encode_value(&SendMessageRequest::new(message.clone()));
        assert_eq!(wire["message"]["brand_id"], json!("brand-1"));
        assert_eq!(wire["message"]["to"], json!({"user_id": "u1"}));
        assert_eq!(wire["message"]["content"]["version"], json!("2022-01-01"));
        assert!(wire["message"].get("base").is_none());

        let back: SendMessageRequest = decode_value(&wire).unwrap();
        assert_eq!(back.message, Message::Content(message));
    }

    #[test]
    fn sugar_content_round_trips() {
        let message = ContentMessage::new(ElementalContentSugar::new("Title", "Body"))
            .base(BaseMessage::new().expiry(Expiry::new(ExpiresIn::Millis(3_600_000))));
        let wire = encode_value(&message);
        assert_eq!(wire["expiry"], json!({"expires_in": 3_600_000}));
        assert_eq!(decode_value::<ContentMessage>(&wire).unwrap(), message);
    }

    #[test]
    fn send_response_reads_camel_case_request_id() {
        let response: SendMessageResponse =
            decode_value(&json!({"requestId": "1-65f1"})).unwrap();
        assert_eq!(response.request_id, "1-65f1");
    }
}
