//! User profiles and their list subscriptions.

use std::sync::Arc;

use reqwest::Method;
use serde_json::{Map, Value};

use crate::{
    client::ClientInner,
    common::{Paging, RecipientPreferences},
    errors::{Error, Result, ValidationError},
    http::{path_segment, RequestOptions},
    lists::List,
};

wire_struct! {
    pub struct ProfileGetResponse {
        required {
            profile: Map<String, Value> = "profile",
        }
        optional {
            preferences: RecipientPreferences = "preferences",
        }
    }
}

wire_struct! {
    /// Body of `POST /profiles/{user_id}`: merged into the stored profile.
    pub struct MergeProfileRequest {
        required {
            profile: Map<String, Value> = "profile",
        }
    }
}

wire_struct! {
    /// Body of `PUT /profiles/{user_id}`: replaces the stored profile.
    pub struct ReplaceProfileRequest {
        required {
            profile: Map<String, Value> = "profile",
        }
    }
}

wire_enum! {
    pub enum MutationStatus {
        Success = "SUCCESS",
    }
}

wire_struct! {
    pub struct ProfileMutationResponse {
        required {
            status: MutationStatus = "status",
        }
    }
}

wire_struct! {
    pub struct ProfileListsResponse {
        required {
            paging: Paging = "paging",
            results: Vec<List> = "results",
        }
    }
}

wire_struct! {
    pub struct SubscribeToListsItem {
        required {
            list_id: String = "listId",
        }
        optional {
            preferences: RecipientPreferences = "preferences",
        }
    }
}

wire_struct! {
    pub struct SubscribeToListsRequest {
        required {
            lists: Vec<SubscribeToListsItem> = "lists",
        }
    }
}

/// Client for `/profiles`.
#[derive(Clone)]
pub struct ProfilesClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl ProfilesClient {
    pub async fn get(&self, user_id: &str) -> Result<ProfileGetResponse> {
        let path = format!("/profiles/{}", path_segment("user_id", user_id)?);
        self.inner.get(&path, &[]).await
    }

    /// Merge fields into the profile, creating it when missing.
    pub async fn create(
        &self,
        user_id: &str,
        profile: Map<String, Value>,
    ) -> Result<ProfileMutationResponse> {
        let path = format!("/profiles/{}", path_segment("user_id", user_id)?);
        self.inner
            .send_json(
                Method::POST,
                &path,
                &MergeProfileRequest::new(profile),
                &RequestOptions::default(),
            )
            .await
    }

    /// Replace the whole profile.
    pub async fn replace(
        &self,
        user_id: &str,
        profile: Map<String, Value>,
    ) -> Result<ProfileMutationResponse> {
        let path = format!("/profiles/{}", path_segment("user_id", user_id)?);
        self.inner
            .send_json(
                Method::PUT,
                &path,
                &ReplaceProfileRequest::new(profile),
                &RequestOptions::default(),
            )
            .await
    }

    pub async fn delete(&self, user_id: &str) -> Result<()> {
        let path = format!("/profiles/{}", path_segment("user_id", user_id)?);
        self.inner.delete(&path).await
    }

    /// Lists the user is subscribed to.
    pub async fn lists(&self, user_id: &str, cursor: Option<&str>) -> Result<ProfileListsResponse> {
        let path = format!("/profiles/{}/lists", path_segment("user_id", user_id)?);
        let query: Vec<_> = cursor.map(|c| ("cursor", c.to_string())).into_iter().collect();
        self.inner.get(&path, &query).await
    }

    pub async fn subscribe_to_lists(
        &self,
        user_id: &str,
        lists: Vec<SubscribeToListsItem>,
    ) -> Result<ProfileMutationResponse> {
        if lists.is_empty() {
            return Err(Error::Validation(
                ValidationError::new("at least one list is required").with_field("lists"),
            ));
        }
        let path = format!("/profiles/{}/lists", path_segment("user_id", user_id)?);
        self.inner
            .send_json(
                Method::POST,
                &path,
                &SubscribeToListsRequest::new(lists),
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
    fn profile_payload_is_kept_verbatim() {
        let resp: ProfileGetResponse = decode_value(&json!({
            "profile": {"email": "ada@example.com", "custom": {"plan": "pro"}}
        }))
        .unwrap();
        assert_eq!(resp.profile["custom"]["plan"], json!("pro"));
        assert!(resp.preferences.is_none());
    }

    #[test]
    fn subscribe_to_lists_uses_list_id_key() {
        let body = SubscribeToListsRequest::new(vec![SubscribeToListsItem::new("newsletter")]);
        assert_eq!(
            encode_value(&body),
            json!({"lists": [{"listId": "newsletter"}]})
        );
    }

    #[test]
    fn mutation_status_is_closed() {
        assert!(decode_value::<ProfileMutationResponse>(&json!({"status": "SUCCESS"})).is_ok());
        assert!(decode_value::<ProfileMutationResponse>(&json!({"status": "OK"})).is_err());
    }
}
