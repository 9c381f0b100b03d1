//! Scoped JWTs for client-side SDKs (inbox, preferences).

use std::sync::Arc;

use reqwest::Method;

use crate::{
    client::ClientInner,
    errors::{Error, Result, ValidationError},
    http::RequestOptions,
};

wire_struct! {
    /// Body of `POST /auth/issue-token`.
    pub struct IssueTokenRequest {
        required {
            /// Space-separated scopes, e.g. `user_id:ada inbox:read:messages`.
            scope: String = "scope",
            /// Lifetime such as `"2 days"`.
            expires_in: String = "expires_in",
        }
    }
}

wire_struct! {
    pub struct IssueTokenResponse {
        optional {
            token: String = "token",
        }
    }
}

/// Client for `/auth`.
#[derive(Clone)]
pub struct AuthClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl AuthClient {
    pub async fn issue_token(&self, req: IssueTokenRequest) -> Result<IssueTokenResponse> {
        if req.scope.trim().is_empty() {
            return Err(Error::Validation(
                ValidationError::new("scope is required").with_field("scope"),
            ));
        }
        if req.expires_in.trim().is_empty() {
            return Err(Error::Validation(
                ValidationError::new("expires_in is required").with_field("expires_in"),
            ));
        }
        self.inner
            .send_json(
                Method::POST,
                "/auth/issue-token",
                &req,
                &RequestOptions::default(),
            )
            .await
    }
}
