//! Property tests for the wire codec: DTO and union round trips (including
//! nested Elemental groups and channels), enum closure, union resolution
//! order and unknown Elemental node tolerance.

use courier::codec::{decode_str, decode_value, encode_value};
use courier::{
    ActionStyle, Alignment, AudienceRecipient, BrandTemplate, BulkEventMessage, BulkMessage,
    Content, ContentMessage, DecodeError, DiscordRecipient, ElementalActionNode,
    ElementalBaseNode, ElementalChannelNode, ElementalContent, ElementalContentSugar,
    ElementalDividerNode, ElementalGroupNode, ElementalImageNode, ElementalMetaNode, ElementalNode,
    ElementalQuoteNode, ElementalTextNode, ExpoMultipleTokens, ExpoRecipient, ExpoToken,
    ListPatternRecipient, ListRecipient, Message, MessageRecipient, MsTeamsRecipient,
    PreferenceStatus, Recipient, RecipientFilter, RecipientFilterOperator, RecipientFilterPath,
    SendDirectMessage, SendMessageRequest, SendToChannel, SendToMsTeamsChannelId,
    SendToMsTeamsChannelName, SendToMsTeamsConversationId, SendToMsTeamsEmail,
    SendToMsTeamsUserId, SendToSlackChannel, SendToSlackEmail, SendToSlackUserId, SlackRecipient,
    TemplateMessage, TextStyle, Tristate, UserRecipient,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

fn tristate() -> impl Strategy<Value = Tristate<String>> {
    prop_oneof![
        Just(Tristate::Absent),
        Just(Tristate::Null),
        "#[0-9a-f]{6}".prop_map(Tristate::Value),
    ]
}

fn brand_template() -> impl Strategy<Value = BrandTemplate> {
    (any::<bool>(), tristate(), tristate(), tristate(), tristate()).prop_map(
        |(enabled, background, blocks, footer, width)| {
            BrandTemplate::new(enabled)
                .background_color(background)
                .blocks_background_color(blocks)
                .footer(footer)
                .width(width)
        },
    )
}

fn text_node() -> impl Strategy<Value = ElementalNode> {
    (
        ".{0,24}",
        prop::sample::select(Alignment::ALL.to_vec()),
        prop::option::of(prop::sample::select(TextStyle::ALL.to_vec())),
        prop::option::of(ident()),
    )
        .prop_map(|(content, align, style, color)| {
            let mut node = ElementalTextNode::new(content, align);
            node.text_style = style;
            node.color = color;
            ElementalNode::Text(node)
        })
}

fn unknown_node() -> impl Strategy<Value = ElementalNode> {
    (ident(), ident()).prop_map(|(tag, payload)| {
        let mut raw = Map::new();
        raw.insert("type".into(), Value::String(format!("x_{tag}")));
        raw.insert("payload".into(), Value::String(payload));
        ElementalNode::Unknown(raw)
    })
}

fn string_map() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map(ident(), ident(), 0..3).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect()
    })
}

fn base_node() -> impl Strategy<Value = ElementalBaseNode> {
    (
        prop::option::of(prop::collection::vec(ident(), 0..3)),
        prop::option::of(ident()),
        prop::option::of(ident()),
    )
        .prop_map(|(channels, ref_, if_)| {
            let mut base = ElementalBaseNode::new();
            base.channels = channels;
            base.ref_ = ref_;
            base.if_ = if_;
            base
        })
}

fn leaf_node() -> impl Strategy<Value = ElementalNode> {
    prop_oneof![
        text_node(),
        prop::option::of(ident()).prop_map(|color| {
            let mut divider = ElementalDividerNode::new();
            divider.color = color;
            ElementalNode::Divider(divider)
        }),
        (prop::option::of(ident()), base_node()).prop_map(|(title, base)| {
            let mut meta = ElementalMetaNode::new().base(base);
            meta.title = title;
            ElementalNode::Meta(meta)
        }),
        (ident(), prop::option::of(ident())).prop_map(|(src, alt)| {
            let mut image = ElementalImageNode::new(src);
            image.alt_text = alt;
            ElementalNode::Image(image)
        }),
        (
            ident(),
            ident(),
            prop::option::of(prop::sample::select(ActionStyle::ALL.to_vec())),
        )
            .prop_map(|(content, href, style)| {
                let mut action = ElementalActionNode::new(content, href);
                action.style = style;
                ElementalNode::Action(action)
            }),
        ".{0,24}".prop_map(|content| ElementalNode::Quote(ElementalQuoteNode::new(content))),
        unknown_node(),
    ]
}

fn node() -> impl Strategy<Value = ElementalNode> {
    leaf_node().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (prop::collection::vec(inner.clone(), 0..4), base_node()).prop_map(
                |(elements, base)| ElementalNode::Group(ElementalGroupNode::new(elements).base(base))
            ),
            (ident(), prop::collection::vec(inner, 0..4)).prop_map(|(channel, elements)| {
                ElementalNode::Channel(ElementalChannelNode::with_elements(channel, elements))
            }),
            (ident(), string_map()).prop_map(|(channel, raw)| {
                ElementalNode::Channel(ElementalChannelNode::with_raw(channel, raw))
            }),
        ]
    })
}

fn content() -> impl Strategy<Value = Content> {
    prop_oneof![
        prop::collection::vec(node(), 0..4)
            .prop_map(|nodes| Content::from(ElementalContent::current(nodes))),
        (".{0,16}", ".{0,32}")
            .prop_map(|(title, body)| Content::from(ElementalContentSugar::new(title, body))),
    ]
}

fn slack() -> impl Strategy<Value = SlackRecipient> {
    (ident(), ident(), 0..3u8).prop_map(|(token, target, pick)| match pick {
        0 => SendToSlackChannel::new(token, target).into(),
        1 => SendToSlackEmail::new(token, target).into(),
        _ => SendToSlackUserId::new(token, target).into(),
    })
}

fn ms_teams() -> impl Strategy<Value = MsTeamsRecipient> {
    (ident(), ident(), ident(), 0..5u8).prop_map(|(tenant, url, target, pick)| match pick {
        0 => SendToMsTeamsUserId::new(tenant, url, target).into(),
        1 => SendToMsTeamsEmail::new(tenant, url, target).into(),
        2 => SendToMsTeamsChannelId::new(tenant, url, target).into(),
        3 => SendToMsTeamsConversationId::new(tenant, url, target).into(),
        _ => SendToMsTeamsChannelName::new(tenant, url, target.clone(), target).into(),
    })
}

fn discord() -> impl Strategy<Value = DiscordRecipient> {
    (ident(), any::<bool>()).prop_map(|(id, channel)| {
        if channel {
            SendToChannel::new(id).into()
        } else {
            SendDirectMessage::new(id).into()
        }
    })
}

fn expo() -> impl Strategy<Value = ExpoRecipient> {
    prop_oneof![
        ident().prop_map(|token| ExpoToken::new(token).into()),
        prop::collection::vec(ident(), 0..4).prop_map(|tokens| ExpoMultipleTokens::new(tokens).into()),
    ]
}

fn filters() -> impl Strategy<Value = Option<Vec<RecipientFilter>>> {
    prop::option::of(prop::collection::vec(
        ident().prop_map(|value| {
            RecipientFilter::new(
                RecipientFilterOperator::MemberOf,
                RecipientFilterPath::AccountId,
                value,
            )
        }),
        0..3,
    ))
}

fn user() -> impl Strategy<Value = UserRecipient> {
    (
        prop::option::of(ident()),
        prop::option::of("[a-z]{1,8}@example\\.com"),
        prop::option::of(slack()),
        prop::option::of(discord()),
        prop::option::of(expo()),
    )
        .prop_map(|(user_id, email, slack, discord, expo)| {
            let mut user = UserRecipient::new();
            user.user_id = user_id;
            user.email = email;
            user.slack = slack;
            user.discord = discord;
            user.expo = expo;
            user
        })
}

fn recipient() -> impl Strategy<Value = Recipient> {
    prop_oneof![
        (ident(), filters(), prop::option::of(string_map())).prop_map(|(id, filters, data)| {
            let mut audience = AudienceRecipient::new(id);
            audience.filters = filters;
            audience.data = data;
            Recipient::Audience(audience)
        }),
        (ident(), filters()).prop_map(|(id, filters)| {
            let mut list = ListRecipient::new(id);
            list.filters = filters;
            Recipient::List(list)
        }),
        "[a-z]{1,8}\\.\\*".prop_map(|pattern| Recipient::ListPattern(ListPatternRecipient::new(pattern))),
        user().prop_map(Recipient::User),
    ]
}

fn message_recipient() -> impl Strategy<Value = MessageRecipient> {
    prop_oneof![
        recipient().prop_map(MessageRecipient::Single),
        prop::collection::vec(recipient(), 0..4).prop_map(MessageRecipient::Many),
    ]
}

fn content_message() -> impl Strategy<Value = ContentMessage> {
    (content(), prop::option::of(message_recipient())).prop_map(|(content, to)| {
        let message = ContentMessage::new(content);
        match to {
            Some(to) => message.to(to),
            None => message,
        }
    })
}

fn template_message() -> impl Strategy<Value = TemplateMessage> {
    (ident(), prop::option::of(message_recipient()), prop::option::of(string_map())).prop_map(
        |(template, to, data)| {
            let mut message = TemplateMessage::new(template);
            message.base.data = data;
            match to {
                Some(to) => message.to(to),
                None => message,
            }
        },
    )
}

fn message() -> impl Strategy<Value = Message> {
    prop_oneof![
        content_message().prop_map(Message::Content),
        template_message().prop_map(Message::Template),
    ]
}

fn bulk_message() -> impl Strategy<Value = BulkMessage> {
    prop_oneof![
        content_message().prop_map(BulkMessage::Content),
        template_message().prop_map(BulkMessage::Template),
        (ident(), prop::option::of(ident())).prop_map(|(event, brand)| {
            let mut message = BulkEventMessage::new(event);
            message.brand = brand;
            BulkMessage::Event(message)
        }),
    ]
}

proptest! {
    #[test]
    fn brand_template_keeps_absent_null_and_value_apart(template in brand_template()) {
        let wire = encode_value(&template);
        let obj = wire.as_object().expect("object");
        match &template.background_color {
            Tristate::Absent => prop_assert!(!obj.contains_key("backgroundColor")),
            Tristate::Null => prop_assert_eq!(&obj["backgroundColor"], &Value::Null),
            Tristate::Value(color) => prop_assert_eq!(&obj["backgroundColor"], &json!(color)),
        }
        let decoded: BrandTemplate = decode_value(&wire).expect("decode");
        prop_assert_eq!(decoded, template);
    }

    #[test]
    fn elemental_content_round_trips(nodes in prop::collection::vec(node(), 0..6)) {
        let content = ElementalContent::current(nodes);
        let decoded: ElementalContent = decode_value(&encode_value(&content)).expect("decode");
        prop_assert_eq!(decoded, content);
    }

    #[test]
    fn unknown_node_type_is_preserved_verbatim(node in unknown_node()) {
        let wire = encode_value(&node);
        let decoded: ElementalNode = decode_value(&wire).expect("decode");
        prop_assert!(decoded.is_unknown());
        prop_assert_eq!(decoded.kind(), wire["type"].as_str().expect("tag"));
        prop_assert_eq!(encode_value(&decoded), wire);
    }

    #[test]
    fn slack_recipient_resolves_to_encoded_variant(recipient in slack()) {
        let decoded: SlackRecipient = decode_value(&encode_value(&recipient)).expect("decode");
        prop_assert_eq!(decoded.variant_name(), recipient.variant_name());
        prop_assert_eq!(decoded, recipient);
    }

    #[test]
    fn ms_teams_recipient_resolves_to_encoded_variant(recipient in ms_teams()) {
        let decoded: MsTeamsRecipient = decode_value(&encode_value(&recipient)).expect("decode");
        prop_assert_eq!(decoded, recipient);
    }

    #[test]
    fn discord_and_expo_recipients_round_trip(target in discord(), push in expo()) {
        let decoded: DiscordRecipient = decode_value(&encode_value(&target)).expect("decode");
        prop_assert_eq!(decoded, target);
        let decoded: ExpoRecipient = decode_value(&encode_value(&push)).expect("decode");
        prop_assert_eq!(decoded, push);
    }

    #[test]
    fn message_recipient_round_trips(to in message_recipient()) {
        let decoded: MessageRecipient = decode_value(&encode_value(&to)).expect("decode");
        prop_assert_eq!(decoded, to);
    }

    #[test]
    fn content_round_trips(body in content()) {
        let decoded: Content = decode_value(&encode_value(&body)).expect("decode");
        prop_assert_eq!(decoded.variant_name(), body.variant_name());
        prop_assert_eq!(decoded, body);
    }

    #[test]
    fn send_request_round_trips(msg in message()) {
        let request = SendMessageRequest::new(msg);
        let wire = encode_value(&request);
        let decoded: SendMessageRequest = decode_value(&wire).expect("decode");
        prop_assert_eq!(encode_value(&decoded), wire);
        prop_assert_eq!(decoded, request);
    }

    #[test]
    fn bulk_message_round_trips(definition in bulk_message()) {
        let decoded: BulkMessage = decode_value(&encode_value(&definition)).expect("decode");
        prop_assert_eq!(decoded.variant_name(), definition.variant_name());
        prop_assert_eq!(decoded, definition);
    }

    #[test]
    fn user_recipients_round_trip_through_message_to(
        emails in prop::collection::vec("[a-z]{1,8}@example\\.com", 1..4),
    ) {
        let users: Vec<Recipient> = emails
            .iter()
            .map(|email| Recipient::User(UserRecipient::with_email(email.clone())))
            .collect();
        let to = MessageRecipient::Many(users);
        let decoded: MessageRecipient = decode_value(&encode_value(&to)).expect("decode");
        prop_assert_eq!(decoded, to);
    }

    #[test]
    fn preference_status_accepts_only_declared_values(raw in "[A-Z_]{1,12}") {
        let decoded = decode_value::<PreferenceStatus>(&json!(raw));
        match PreferenceStatus::parse(&raw) {
            Some(status) => prop_assert_eq!(decoded.expect("declared value"), status),
            None => {
                let is_invalid_enum = matches!(
                    decoded,
                    Err(DecodeError::InvalidEnumValue { .. })
                );
                prop_assert!(is_invalid_enum);
            }
        }
    }
}

#[test]
fn text_node_decodes_from_raw_json() {
    let content: ElementalContent = decode_str(
        r#"{"version":"2022-01-01","elements":[{"type":"text","content":"Hello","align":"center","text_style":"h1"}]}"#,
    )
    .expect("decode");
    let text = content.elements[0].as_text().expect("text node");
    assert_eq!(text.content, "Hello");
    assert_eq!(text.align, Alignment::Center);
    assert_eq!(text.text_style, Some(TextStyle::H1));
    assert!(content.elements[0].as_image().is_err());
}

#[test]
fn every_preference_status_round_trips() {
    for status in PreferenceStatus::ALL {
        let decoded: PreferenceStatus = decode_value(&encode_value(status)).expect("decode");
        assert_eq!(&decoded, status);
    }
}

#[test]
fn audience_filter_requires_filters() {
    let err = decode_value::<courier::AudienceFilterConfig>(&json!({})).unwrap_err();
    match err {
        DecodeError::MissingField { field, path, .. } => {
            assert_eq!(field, "filters");
            assert_eq!(path, "$");
        }
        other => panic!("expected missing field, got {other:?}"),
    }
}

#[test]
fn slack_overlap_prefers_channel() {
    let decoded: SlackRecipient = decode_value(&json!({
        "access_token": "xoxb",
        "channel": "C1",
        "email": "ada@example.com",
        "user_id": "U1"
    }))
    .expect("decode");
    assert!(decoded.is_channel());
    assert!(decoded.as_email().is_err());
}

#[test]
fn unmatched_union_payload_names_the_union() {
    let err = decode_value::<SlackRecipient>(&json!({"access_token": "xoxb"})).unwrap_err();
    match err {
        DecodeError::NoMatchingVariant { union, path } => {
            assert_eq!(union, "SlackRecipient");
            assert_eq!(path, "$");
        }
        other => panic!("expected no matching variant, got {other:?}"),
    }
}
