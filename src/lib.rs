//! Typed Rust client for the Courier notification API.
//!
//! The crate has two layers:
//!
//! - a pure wire codec ([`codec`]) that maps Courier JSON to typed models,
//!   including the Elemental content union and the tag-less recipient unions
//! - a thin async transport ([`Client`]) with one handle per API resource
//!
//! ```no_run
//! use courier::{Client, ContentMessage, ElementalContent, ElementalNode, SendMessageRequest, UserRecipient};
//!
//! # async fn run() -> courier::Result<()> {
//! let client = Client::from_env()?;
//! let message = ContentMessage::new(ElementalContent::current(vec![ElementalNode::text("Hello")]))
//!     .to(UserRecipient::with_email("ada@example.com"));
//! let sent = client.send().message(SendMessageRequest::new(message)).await?;
//! println!("request id: {}", sent.request_id);
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::result_large_err)]

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.courier.com";

/// Default client identification header value.
pub(crate) const DEFAULT_CLIENT_HEADER: &str = concat!("courier-rust/", env!("CARGO_PKG_VERSION"));

/// Default connection timeout (5 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Default request timeout (60 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

/// Response header carrying the Courier request id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Request header identifying the client library.
pub const CLIENT_HEADER: &str = "X-Courier-Client";

/// Request header for idempotent POSTs.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Environment variable holding the auth token.
pub const AUTH_TOKEN_ENV: &str = "COURIER_AUTH_TOKEN";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "COURIER_BASE_URL";

#[macro_use]
pub mod codec;
#[macro_use]
mod union;

mod audiences;
mod auth;
mod brands;
mod bulk;
mod client;
mod common;
mod elemental;
mod errors;
mod http;
mod lists;
mod message;
mod messages;
mod profiles;
mod recipients;
mod send;
mod telemetry;
mod tenants;
#[doc(hidden)]
pub mod testing;
mod translations;

pub use audiences::{
    Audience, AudienceFilterConfig, AudienceListResponse, AudienceMember,
    AudienceMemberListResponse, AudienceUpdateParams, AudienceUpdateResponse, AudiencesClient,
    FilterConfig, FilterOperator, NestedFilterConfig, SingleFilterConfig,
};
pub use auth::{AuthClient, IssueTokenRequest, IssueTokenResponse};
pub use brands::{
    Brand, BrandColors, BrandParameters, BrandSettings, BrandSettingsEmail, BrandSettingsInApp,
    BrandSnippet, BrandSnippets, BrandTemplate, BrandTemplateOverride, BrandUpdateParameters,
    BrandsClient, BrandsResponse, EmailFooter, EmailHead, EmailHeader, InAppPlacement, Logo,
    WidgetBackground,
};
pub use bulk::{
    BulkClient, BulkCreateJobRequest, BulkCreateJobResponse, BulkEventMessage, BulkGetJobResponse,
    BulkGetJobUsersResponse, BulkIngestUsersRequest, BulkJob, BulkJobStatus, BulkJobUserStatus,
    BulkMessage, BulkMessageUser, BulkMessageUserResponse,
};
pub use client::{Client, Config, RawResponse};
pub use codec::{FromWire, ToWire, Tristate};
pub use common::{
    ChannelClassification, ChannelPreference, MessageContext, NotificationPreferenceDetails,
    Paging, PreferenceRule, PreferenceStatus, RecipientPreferences, Utm,
};
pub use elemental::{
    ActionLocale, ActionStyle, Alignment, Content, ElementalActionNode, ElementalBaseNode,
    ElementalChannelNode, ElementalContent, ElementalContentSugar, ElementalDividerNode,
    ElementalGroupNode, ElementalImageNode, ElementalMetaNode, ElementalNode, ElementalQuoteNode,
    ElementalTextNode, ImageLocale, MetaLocale, TextFormat, TextLocale, TextStyle,
    ELEMENTAL_VERSION, UNKNOWN_TAG,
};
pub use errors::{
    APIError, DecodeError, Error, FieldError, Result, RetryMetadata, TransportError,
    TransportErrorKind, ValidationError,
};
pub use http::{HeaderEntry, HeaderList, RequestOptions, RetryConfig};
pub use lists::{
    AddSubscribersRequest, List, ListGetAllResponse, ListGetSubscriptionsResponse,
    ListPutParams, ListSubscriptionRecipient, ListsClient, PutSubscriptionsRecipient,
    SubscribeUserToListRequest,
};
pub use message::{
    BaseMessage, BaseMessageSendTo, ChannelMetadata, ChannelTimeouts, ContentMessage, Delay,
    ExpiresIn, Expiry, Message, MessageChannelConfig, MessageMetadata, MessagePreferences,
    MessageProviderConfig, Routing, RoutingChannel, RoutingMethod, RoutingStrategyChannel,
    SendMessageRequest, SendMessageResponse, TemplateMessage, Timeout, TimeoutCriteria,
};
pub use messages::{
    MessageDetails, MessageHistoryResponse, MessageListParams, MessageListResponse,
    MessageStatus, MessagesClient, Reason, RenderOutput, RenderOutputResponse,
    RenderedMessageBlock, RenderedMessageContent,
};
pub use profiles::{
    MergeProfileRequest, MutationStatus, ProfileGetResponse, ProfileListsResponse,
    ProfileMutationResponse, ProfilesClient, ReplaceProfileRequest, SubscribeToListsItem,
    SubscribeToListsRequest,
};
pub use recipients::{
    AudienceRecipient, DiscordRecipient, ExpoMultipleTokens, ExpoRecipient, ExpoToken,
    ListPatternRecipient, ListRecipient, MessageRecipient, MsTeamsRecipient, Recipient,
    RecipientFilter, RecipientFilterOperator, RecipientFilterPath, SendDirectMessage,
    SendToChannel, SendToMsTeamsChannelId, SendToMsTeamsChannelName, SendToMsTeamsConversationId,
    SendToMsTeamsEmail, SendToMsTeamsUserId, SendToSlackChannel, SendToSlackEmail,
    SendToSlackUserId, SlackRecipient, UserRecipient,
};
pub use send::SendClient;
pub use telemetry::{HttpRequestMetrics, MetricsCallbacks, RequestContext};
pub use tenants::{
    DefaultPreferences, SubscriptionTopic, SubscriptionTopicStatus, Tenant,
    TenantCreateOrReplaceParams, TenantListParams, TenantListResponse, TenantUsersResponse,
    TenantsClient, UserTenantAssociation,
};
pub use translations::TranslationsClient;
