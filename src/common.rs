//! Models shared by several Courier resources.

use std::collections::BTreeMap;

wire_struct! {
    /// Cursor pagination block returned by list endpoints.
    pub struct Paging {
        required {
            more: bool = "more",
        }
        nullable {
            cursor: String = "cursor",
        }
    }
}

impl Paging {
    /// The cursor for the next page, if there is one.
    pub fn next_cursor(&self) -> Option<&str> {
        if !self.more {
            return None;
        }
        self.cursor.as_value().map(String::as_str)
    }
}

wire_enum! {
    /// A recipient's opt-in state for a notification or category.
    pub enum PreferenceStatus {
        OptedIn = "OPTED_IN",
        OptedOut = "OPTED_OUT",
        Required = "REQUIRED",
    }
}

wire_enum! {
    pub enum ChannelClassification {
        DirectMessage = "direct_message",
        Email = "email",
        Push = "push",
        Sms = "sms",
        Webhook = "webhook",
        Inbox = "inbox",
    }
}

wire_struct! {
    pub struct ChannelPreference {
        required {
            channel: ChannelClassification = "channel",
        }
    }
}

wire_struct! {
    /// A snooze window during which a preference applies.
    pub struct PreferenceRule {
        required {
            until: String = "until",
        }
        optional {
            start: String = "start",
        }
    }
}

wire_struct! {
    pub struct NotificationPreferenceDetails {
        required {
            status: PreferenceStatus = "status",
        }
        optional {
            rules: Vec<PreferenceRule> = "rules",
            channel_preferences: Vec<ChannelPreference> = "channel_preferences",
        }
    }
}

wire_struct! {
    /// Per-recipient preferences keyed by notification or category id.
    pub struct RecipientPreferences {
        optional {
            categories: BTreeMap<String, NotificationPreferenceDetails> = "categories",
            notifications: BTreeMap<String, NotificationPreferenceDetails> = "notifications",
        }
    }
}

wire_struct! {
    /// UTM parameters appended to tracked links.
    pub struct Utm {
        optional {
            source: String = "source",
            medium: String = "medium",
            campaign: String = "campaign",
            term: String = "term",
            content: String = "content",
        }
    }
}

wire_struct! {
    /// Tenant context a message or recipient is evaluated in.
    pub struct MessageContext {
        optional {
            tenant_id: String = "tenant_id",
        }
    }
}
