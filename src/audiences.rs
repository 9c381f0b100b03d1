//! Audiences: recipients selected dynamically by profile filters.

use std::sync::Arc;

use reqwest::Method;

use crate::{
    client::ClientInner,
    common::Paging,
    errors::Result,
    http::{path_segment, RequestOptions},
};

wire_enum! {
    pub enum FilterOperator {
        EndsWith = "ENDS_WITH",
        Eq = "EQ",
        Exists = "EXISTS",
        Gt = "GT",
        Gte = "GTE",
        Includes = "INCLUDES",
        IsAfter = "IS_AFTER",
        IsBefore = "IS_BEFORE",
        Lt = "LT",
        Lte = "LTE",
        Neq = "NEQ",
        Omit = "OMIT",
        StartsWith = "STARTS_WITH",
        And = "AND",
        Or = "OR",
    }
}

wire_struct! {
    /// Compare one profile path against a value.
    pub struct SingleFilterConfig {
        required {
            operator: FilterOperator = "operator",
            path: String = "path",
            value: String = "value",
        }
    }
}

wire_struct! {
    /// Combine nested rules with `AND` / `OR`.
    pub struct NestedFilterConfig {
        required {
            operator: FilterOperator = "operator",
            rules: Vec<FilterConfig> = "rules",
        }
    }
}

wire_union! {
    pub enum FilterConfig {
        Single(SingleFilterConfig) [is_single, as_single],
        Nested(NestedFilterConfig) [is_nested, as_nested],
    }
}

wire_struct! {
    pub struct AudienceFilterConfig {
        required {
            filters: Vec<FilterConfig> = "filters",
        }
    }
}

wire_struct! {
    pub struct Audience {
        required {
            id: String = "id",
            filter: AudienceFilterConfig = "filter",
            created_at: String = "created_at",
            updated_at: String = "updated_at",
        }
        optional {
            name: String = "name",
            description: String = "description",
        }
    }
}

wire_struct! {
    /// Body of `PUT /audiences/{audience_id}`.
    pub struct AudienceUpdateParams {
        nullable {
            name: String = "name",
            description: String = "description",
            filter: AudienceFilterConfig = "filter",
        }
    }
}

wire_struct! {
    pub struct AudienceUpdateResponse {
        required {
            audience: Audience = "audience",
        }
    }
}

wire_struct! {
    pub struct AudienceListResponse {
        required {
            items: Vec<Audience> = "items",
            paging: Paging = "paging",
        }
    }
}

wire_struct! {
    pub struct AudienceMember {
        required {
            added_at: String = "added_at",
            audience_id: String = "audience_id",
            audience_version: i64 = "audience_version",
            member_id: String = "member_id",
            reason: String = "reason",
        }
    }
}

wire_struct! {
    pub struct AudienceMemberListResponse {
        required {
            items: Vec<AudienceMember> = "items",
            paging: Paging = "paging",
        }
    }
}

/// Client for `/audiences`.
#[derive(Clone)]
pub struct AudiencesClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl AudiencesClient {
    pub async fn get(&self, audience_id: &str) -> Result<Audience> {
        let path = format!("/audiences/{}", path_segment("audience_id", audience_id)?);
        self.inner.get(&path, &[]).await
    }

    /// Create or update an audience.
    pub async fn update(
        &self,
        audience_id: &str,
        params: AudienceUpdateParams,
    ) -> Result<AudienceUpdateResponse> {
        let path = format!("/audiences/{}", path_segment("audience_id", audience_id)?);
        self.inner
            .send_json(Method::PUT, &path, &params, &RequestOptions::default())
            .await
    }

    pub async fn delete(&self, audience_id: &str) -> Result<()> {
        let path = format!("/audiences/{}", path_segment("audience_id", audience_id)?);
        self.inner.delete(&path).await
    }

    pub async fn list(&self, cursor: Option<&str>) -> Result<AudienceListResponse> {
        let query: Vec<_> = cursor.map(|c| ("cursor", c.to_string())).into_iter().collect();
        self.inner.get("/audiences", &query).await
    }

    /// Profiles currently matching the audience filter.
    pub async fn members(
        &self,
        audience_id: &str,
        cursor: Option<&str>,
    ) -> Result<AudienceMemberListResponse> {
        let path = format!(
            "/audiences/{}/members",
            path_segment("audience_id", audience_id)?
        );
        let query: Vec<_> = cursor.map(|c| ("cursor", c.to_string())).into_iter().collect();
        self.inner.get(&path, &query).await
    }
}
