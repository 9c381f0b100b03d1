//! Tenants and their user associations.

use std::sync::Arc;

use reqwest::Method;
use serde_json::{Map, Value};

use crate::{
    client::ClientInner,
    common::ChannelClassification,
    errors::{Error, Result, ValidationError},
    http::{path_segment, RequestOptions},
};

wire_enum! {
    pub enum SubscriptionTopicStatus {
        OptedOut = "OPTED_OUT",
        OptedIn = "OPTED_IN",
        Required = "REQUIRED",
    }
}

wire_struct! {
    /// A tenant-level default for one subscription topic.
    pub struct SubscriptionTopic {
        required {
            id: String = "id",
            status: SubscriptionTopicStatus = "status",
        }
        nullable {
            has_custom_routing: bool = "has_custom_routing",
            custom_routing: Vec<ChannelClassification> = "custom_routing",
        }
    }
}

wire_struct! {
    pub struct DefaultPreferences {
        nullable {
            items: Vec<SubscriptionTopic> = "items",
        }
    }
}

wire_struct! {
    pub struct Tenant {
        required {
            id: String = "id",
            name: String = "name",
        }
        nullable {
            parent_tenant_id: String = "parent_tenant_id",
            default_preferences: DefaultPreferences = "default_preferences",
            properties: Map<String, Value> = "properties",
            user_profile: Map<String, Value> = "user_profile",
            brand_id: String = "brand_id",
        }
    }
}

wire_struct! {
    /// Body of `PUT /tenants/{tenant_id}`.
    pub struct TenantCreateOrReplaceParams {
        required {
            name: String = "name",
        }
        nullable {
            parent_tenant_id: String = "parent_tenant_id",
            default_preferences: DefaultPreferences = "default_preferences",
            properties: Map<String, Value> = "properties",
            user_profile: Map<String, Value> = "user_profile",
            brand_id: String = "brand_id",
        }
    }
}

wire_struct! {
    pub struct TenantListResponse {
        required {
            has_more: bool = "has_more",
            items: Vec<Tenant> = "items",
        }
        optional {
            url: String = "url",
        }
        nullable {
            cursor: String = "cursor",
            next_url: String = "next_url",
        }
    }
}

wire_struct! {
    pub struct UserTenantAssociation {
        required {
            tenant_id: String = "tenant_id",
        }
        nullable {
            user_id: String = "user_id",
            profile: Map<String, Value> = "profile",
        }
    }
}

wire_struct! {
    pub struct TenantUsersResponse {
        required {
            has_more: bool = "has_more",
        }
        optional {
            url: String = "url",
        }
        nullable {
            items: Vec<UserTenantAssociation> = "items",
            cursor: String = "cursor",
            next_url: String = "next_url",
        }
    }
}

/// Query parameters for `GET /tenants`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TenantListParams {
    pub parent_tenant_id: Option<String>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

impl TenantListParams {
    pub fn with_parent_tenant_id(mut self, parent_tenant_id: impl Into<String>) -> Self {
        self.parent_tenant_id = Some(parent_tenant_id.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(parent) = &self.parent_tenant_id {
            query.push(("parent_tenant_id", parent.clone()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(cursor) = &self.cursor {
            query.push(("cursor", cursor.clone()));
        }
        query
    }
}

/// Client for `/tenants`.
#[derive(Clone)]
pub struct TenantsClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl TenantsClient {
    pub async fn create_or_replace(
        &self,
        tenant_id: &str,
        params: TenantCreateOrReplaceParams,
    ) -> Result<Tenant> {
        if params.name.trim().is_empty() {
            return Err(Error::Validation(
                ValidationError::new("name is required").with_field("name"),
            ));
        }
        let path = format!("/tenants/{}", path_segment("tenant_id", tenant_id)?);
        self.inner
            .send_json(Method::PUT, &path, &params, &RequestOptions::default())
            .await
    }

    pub async fn get(&self, tenant_id: &str) -> Result<Tenant> {
        let path = format!("/tenants/{}", path_segment("tenant_id", tenant_id)?);
        self.inner.get(&path, &[]).await
    }

    pub async fn list(&self, params: TenantListParams) -> Result<TenantListResponse> {
        if params.limit == Some(0) {
            return Err(Error::Validation(
                ValidationError::new("limit must be positive").with_field("limit"),
            ));
        }
        self.inner.get("/tenants", &params.to_query()).await
    }

    pub async fn delete(&self, tenant_id: &str) -> Result<()> {
        let path = format!("/tenants/{}", path_segment("tenant_id", tenant_id)?);
        self.inner.delete(&path).await
    }

    /// Users associated with a tenant.
    pub async fn users(&self, tenant_id: &str, cursor: Option<&str>) -> Result<TenantUsersResponse> {
        let path = format!("/tenants/{}/users", path_segment("tenant_id", tenant_id)?);
        let query: Vec<_> = cursor.map(|c| ("cursor", c.to_string())).into_iter().collect();
        self.inner.get(&path, &query).await
    }
}
