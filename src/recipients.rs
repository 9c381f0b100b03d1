//! Recipient and provider-profile unions.
//!
//! None of these unions carry a discriminant field. Each resolves by trying
//! its shapes in the order they are declared below; see [`crate::union`].
//!
//! | Union | Resolution order |
//! |-------|------------------|
//! | [`SlackRecipient`] | channel, email, user id |
//! | [`DiscordRecipient`] | channel, direct message |
//! | [`MsTeamsRecipient`] | user id, email, channel id, conversation id, channel name |
//! | [`ExpoRecipient`] | single token, multiple tokens |
//! | [`Recipient`] | audience, list, list pattern, user |
//! | [`MessageRecipient`] | single recipient, list of recipients |
//!
//! [`UserRecipient`] has no required fields and therefore accepts any
//! object; it is declared last so that audience and list payloads are
//! recognized first.

use serde_json::{Map, Value};

use crate::common::{MessageContext, RecipientPreferences};

// ============================================================================
// Slack
// ============================================================================

wire_struct! {
    pub struct SendToSlackChannel {
        required {
            access_token: String = "access_token",
            channel: String = "channel",
        }
    }
}

wire_struct! {
    pub struct SendToSlackEmail {
        required {
            access_token: String = "access_token",
            email: String = "email",
        }
    }
}

wire_struct! {
    pub struct SendToSlackUserId {
        required {
            access_token: String = "access_token",
            user_id: String = "user_id",
        }
    }
}

wire_union! {
    /// Slack delivery target.
    pub enum SlackRecipient {
        Channel(SendToSlackChannel) [is_channel, as_channel],
        Email(SendToSlackEmail) [is_email, as_email],
        UserId(SendToSlackUserId) [is_user_id, as_user_id],
    }
}

// ============================================================================
// Discord
// ============================================================================

wire_struct! {
    pub struct SendToChannel {
        required {
            channel_id: String = "channel_id",
        }
    }
}

wire_struct! {
    pub struct SendDirectMessage {
        required {
            user_id: String = "user_id",
        }
    }
}

wire_union! {
    /// Discord delivery target.
    pub enum DiscordRecipient {
        Channel(SendToChannel) [is_channel, as_channel],
        DirectMessage(SendDirectMessage) [is_direct_message, as_direct_message],
    }
}

// ============================================================================
// Microsoft Teams
// ============================================================================

wire_struct! {
    pub struct SendToMsTeamsUserId {
        required {
            tenant_id: String = "tenant_id",
            service_url: String = "service_url",
            user_id: String = "user_id",
        }
    }
}

wire_struct! {
    pub struct SendToMsTeamsEmail {
        required {
            tenant_id: String = "tenant_id",
            service_url: String = "service_url",
            email: String = "email",
        }
    }
}

wire_struct! {
    pub struct SendToMsTeamsChannelId {
        required {
            tenant_id: String = "tenant_id",
            service_url: String = "service_url",
            channel_id: String = "channel_id",
        }
    }
}

wire_struct! {
    pub struct SendToMsTeamsConversationId {
        required {
            tenant_id: String = "tenant_id",
            service_url: String = "service_url",
            conversation_id: String = "conversation_id",
        }
    }
}

wire_struct! {
    pub struct SendToMsTeamsChannelName {
        required {
            tenant_id: String = "tenant_id",
            service_url: String = "service_url",
            channel_name: String = "channel_name",
            team_id: String = "team_id",
        }
    }
}

wire_union! {
    /// Microsoft Teams delivery target.
    pub enum MsTeamsRecipient {
        UserId(SendToMsTeamsUserId) [is_user_id, as_user_id],
        Email(SendToMsTeamsEmail) [is_email, as_email],
        ChannelId(SendToMsTeamsChannelId) [is_channel_id, as_channel_id],
        ConversationId(SendToMsTeamsConversationId) [is_conversation_id, as_conversation_id],
        ChannelName(SendToMsTeamsChannelName) [is_channel_name, as_channel_name],
    }
}

// ============================================================================
// Expo
// ============================================================================

wire_struct! {
    pub struct ExpoToken {
        required {
            token: String = "token",
        }
    }
}

wire_struct! {
    pub struct ExpoMultipleTokens {
        required {
            tokens: Vec<String> = "tokens",
        }
    }
}

wire_union! {
    /// Expo push target.
    pub enum ExpoRecipient {
        Token(ExpoToken) [is_token, as_token],
        MultipleTokens(ExpoMultipleTokens) [is_multiple_tokens, as_multiple_tokens],
    }
}

// ============================================================================
// Message recipients
// ============================================================================

wire_enum! {
    pub enum RecipientFilterOperator {
        MemberOf = "MEMBER_OF",
    }
}

wire_enum! {
    pub enum RecipientFilterPath {
        AccountId = "account_id",
    }
}

wire_struct! {
    /// Narrows an audience or list send to members of an account.
    pub struct RecipientFilter {
        required {
            operator: RecipientFilterOperator = "operator",
            path: RecipientFilterPath = "path",
            value: String = "value",
        }
    }
}

wire_struct! {
    pub struct AudienceRecipient {
        required {
            audience_id: String = "audience_id",
        }
        optional {
            data: Map<String, Value> = "data",
            filters: Vec<RecipientFilter> = "filters",
        }
    }
}

wire_struct! {
    pub struct ListRecipient {
        required {
            list_id: String = "list_id",
        }
        optional {
            data: Map<String, Value> = "data",
            filters: Vec<RecipientFilter> = "filters",
        }
    }
}

wire_struct! {
    /// Every list whose id matches a pattern such as `team.*`.
    pub struct ListPatternRecipient {
        required {
            list_pattern: String = "list_pattern",
        }
        optional {
            data: Map<String, Value> = "data",
        }
    }
}

wire_struct! {
    /// An individual user, addressed by id and/or inline profile data.
    pub struct UserRecipient {
        optional {
            user_id: String = "user_id",
            account_id: String = "account_id",
            tenant_id: String = "tenant_id",
            email: String = "email",
            phone_number: String = "phone_number",
            locale: String = "locale",
            context: MessageContext = "context",
            data: Map<String, Value> = "data",
            preferences: RecipientPreferences = "preferences",
            slack: SlackRecipient = "slack",
            discord: DiscordRecipient = "discord",
            ms_teams: MsTeamsRecipient = "ms_teams",
            expo: ExpoRecipient = "expo",
        }
    }
}

impl Default for UserRecipient {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRecipient {
    pub fn with_user_id(user_id: impl Into<String>) -> Self {
        Self::new().user_id(user_id)
    }

    pub fn with_email(email: impl Into<String>) -> Self {
        Self::new().email(email)
    }
}

wire_union! {
    /// One addressable recipient.
    pub enum Recipient {
        Audience(AudienceRecipient) [is_audience, as_audience],
        List(ListRecipient) [is_list, as_list],
        ListPattern(ListPatternRecipient) [is_list_pattern, as_list_pattern],
        User(UserRecipient) [is_user, as_user],
    }
}

wire_union! {
    /// The `to` field of a message: one recipient or several.
    pub enum MessageRecipient {
        Single(Recipient) [is_single, as_single],
        Many(Vec<Recipient>) [is_many, as_many],
    }
}

impl From<UserRecipient> for MessageRecipient {
    fn from(user: UserRecipient) -> Self {
        MessageRecipient::Single(Recipient::User(user))
    }
}

impl From<AudienceRecipient> for MessageRecipient {
    fn from(audience: AudienceRecipient) -> Self {
        MessageRecipient::Single(Recipient::Audience(audience))
    }
}

impl From<ListRecipient> for MessageRecipient {
    fn from(list: ListRecipient) -> Self {
        MessageRecipient::Single(Recipient::List(list))
    }
}
