//! Lists and list subscriptions.

use std::sync::Arc;

use reqwest::Method;

use crate::{
    client::ClientInner,
    common::{Paging, RecipientPreferences},
    errors::{Error, Result, ValidationError},
    http::{path_segment, RequestOptions},
};

wire_struct! {
    pub struct List {
        required {
            id: String = "id",
            name: String = "name",
        }
        optional {
            created: String = "created",
            updated: String = "updated",
            preferences: RecipientPreferences = "preferences",
        }
    }
}

wire_struct! {
    pub struct ListGetAllResponse {
        required {
            paging: Paging = "paging",
            items: Vec<List> = "items",
        }
    }
}

wire_struct! {
    pub struct ListPutParams {
        required {
            name: String = "name",
        }
        optional {
            preferences: RecipientPreferences = "preferences",
        }
    }
}

wire_struct! {
    pub struct ListSubscriptionRecipient {
        required {
            recipient_id: String = "recipientId",
        }
        optional {
            created: String = "created",
            preferences: RecipientPreferences = "preferences",
        }
    }
}

wire_struct! {
    pub struct ListGetSubscriptionsResponse {
        required {
            paging: Paging = "paging",
            items: Vec<ListSubscriptionRecipient> = "items",
        }
    }
}

wire_struct! {
    pub struct PutSubscriptionsRecipient {
        required {
            recipient_id: String = "recipientId",
        }
        optional {
            preferences: RecipientPreferences = "preferences",
        }
    }
}

wire_struct! {
    pub struct AddSubscribersRequest {
        required {
            recipients: Vec<PutSubscriptionsRecipient> = "recipients",
        }
    }
}

wire_struct! {
    pub struct SubscribeUserToListRequest {
        optional {
            preferences: RecipientPreferences = "preferences",
        }
    }
}

/// Client for `/lists`.
#[derive(Clone)]
pub struct ListsClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl ListsClient {
    /// List all lists, optionally filtered by a pattern such as `team.*`.
    pub async fn list(
        &self,
        cursor: Option<&str>,
        pattern: Option<&str>,
    ) -> Result<ListGetAllResponse> {
        let mut query = Vec::new();
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        if let Some(pattern) = pattern {
            query.push(("pattern", pattern.to_string()));
        }
        self.inner.get("/lists", &query).await
    }

    pub async fn get(&self, list_id: &str) -> Result<List> {
        let path = format!("/lists/{}", path_segment("list_id", list_id)?);
        self.inner.get(&path, &[]).await
    }

    /// Create or replace a list.
    pub async fn update(&self, list_id: &str, params: ListPutParams) -> Result<()> {
        if params.name.trim().is_empty() {
            return Err(Error::Validation(
                ValidationError::new("name is required").with_field("name"),
            ));
        }
        let path = format!("/lists/{}", path_segment("list_id", list_id)?);
        self.inner
            .send_json(Method::PUT, &path, &params, &RequestOptions::default())
            .await
    }

    pub async fn delete(&self, list_id: &str) -> Result<()> {
        let path = format!("/lists/{}", path_segment("list_id", list_id)?);
        self.inner.delete(&path).await
    }

    /// Restore a previously deleted list.
    pub async fn restore(&self, list_id: &str) -> Result<()> {
        let path = format!("/lists/{}/restore", path_segment("list_id", list_id)?);
        self.inner
            .execute(Method::PUT, &path, &[], None, &RequestOptions::default())
            .await
    }

    pub async fn subscriptions(
        &self,
        list_id: &str,
        cursor: Option<&str>,
    ) -> Result<ListGetSubscriptionsResponse> {
        let path = format!("/lists/{}/subscriptions", path_segment("list_id", list_id)?);
        let query: Vec<_> = cursor.map(|c| ("cursor", c.to_string())).into_iter().collect();
        self.inner.get(&path, &query).await
    }

    /// Subscribe one user, optionally with list-level preferences.
    pub async fn subscribe(
        &self,
        list_id: &str,
        user_id: &str,
        preferences: Option<RecipientPreferences>,
    ) -> Result<()> {
        let path = format!(
            "/lists/{}/subscriptions/{}",
            path_segment("list_id", list_id)?,
            path_segment("user_id", user_id)?
        );
        let body = SubscribeUserToListRequest {
            preferences,
        };
        self.inner
            .send_json(Method::PUT, &path, &body, &RequestOptions::default())
            .await
    }

    pub async fn unsubscribe(&self, list_id: &str, user_id: &str) -> Result<()> {
        let path = format!(
            "/lists/{}/subscriptions/{}",
            path_segment("list_id", list_id)?,
            path_segment("user_id", user_id)?
        );
        self.inner.delete(&path).await
    }

    /// Add subscribers without touching existing ones.
    pub async fn add_subscribers(
        &self,
        list_id: &str,
        recipients: Vec<PutSubscriptionsRecipient>,
    ) -> Result<()> {
        if recipients.is_empty() {
            return Err(Error::Validation(
                ValidationError::new("at least one recipient is required")
                    .with_field("recipients"),
            ));
        }
        let path = format!("/lists/{}/subscriptions", path_segment("list_id", list_id)?);
        self.inner
            .send_json(
                Method::POST,
                &path,
                &AddSubscribersRequest::new(recipients),
                &RequestOptions::default(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_value, encode_value};
    use serde_json::json;

    #[test]
    fn subscriptions_use_camel_case_recipient_id() {
        let page: ListGetSubscriptionsResponse = decode_value(&json!({
            "paging": {"more": false},
            "items": [{"recipientId": "u1", "created": "2024-01-01T00:00:00Z"}]
        }))
        .unwrap();
        assert_eq!(page.items[0].recipient_id, "u1");
        assert!(page.paging.cursor.is_absent());

        let body = AddSubscribersRequest::new(vec![PutSubscriptionsRecipient::new("u2")]);
        assert_eq!(
            encode_value(&body),
            json!({"recipients": [{"recipientId": "u2"}]})
        );
    }

    #[test]
    fn empty_subscribe_body_encodes_as_empty_object() {
        assert_eq!(encode_value(&SubscribeUserToListRequest::new()), json!({}));
    }
}
