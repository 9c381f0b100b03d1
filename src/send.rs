//! `POST /send`.

use std::sync::Arc;

use reqwest::Method;

use crate::{
    client::ClientInner,
    errors::{Error, Result, ValidationError},
    http::RequestOptions,
    message::{SendMessageRequest, SendMessageResponse},
};

#[derive(Clone)]
pub struct SendClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl SendClient {
    /// Send a message to one or more recipients.
    pub async fn message(&self, req: SendMessageRequest) -> Result<SendMessageResponse> {
        self.message_with_options(req, RequestOptions::default())
            .await
    }

    /// Send a message with per-call options such as an idempotency key.
    pub async fn message_with_options(
        &self,
        req: SendMessageRequest,
        options: RequestOptions,
    ) -> Result<SendMessageResponse> {
        if req.message.recipient().is_none() {
            return Err(Error::Validation(
                ValidationError::new("message recipient is required").with_field("message.to"),
            ));
        }
        self.inner
            .send_json(Method::POST, "/send", &req, &options)
            .await
    }
}
