//! Bulk jobs: one message definition sent to many ingested users.

use std::sync::Arc;

use reqwest::Method;
use serde_json::{Map, Value};

use crate::{
    client::ClientInner,
    common::{Paging, RecipientPreferences},
    errors::{Error, Result, ValidationError},
    http::{path_segment, RequestOptions},
    message::{ContentMessage, TemplateMessage},
    recipients::UserRecipient,
};

wire_struct! {
    /// Legacy event-based bulk message.
    pub struct BulkEventMessage {
        required {
            event: String = "event",
        }
        optional {
            brand: String = "brand",
            data: Map<String, Value> = "data",
            locale: Map<String, Value> = "locale",
            override_: Map<String, Value> = "override",
        }
    }
}

wire_union! {
    /// Message definition shared by every user in a bulk job.
    pub enum BulkMessage {
        Content(ContentMessage) [is_content, as_content],
        Template(TemplateMessage) [is_template, as_template],
        Event(BulkEventMessage) [is_event, as_event],
    }
}

wire_struct! {
    pub struct BulkCreateJobRequest {
        required {
            message: BulkMessage = "message",
        }
    }
}

wire_struct! {
    pub struct BulkCreateJobResponse {
        required {
            job_id: String = "jobId",
        }
    }
}

wire_struct! {
    /// One user ingested into a bulk job.
    pub struct BulkMessageUser {
        optional {
            recipient: String = "recipient",
            profile: Map<String, Value> = "profile",
            data: Map<String, Value> = "data",
            preferences: RecipientPreferences = "preferences",
            to: UserRecipient = "to",
        }
    }
}

impl Default for BulkMessageUser {
    fn default() -> Self {
        Self::new()
    }
}

wire_struct! {
    pub struct BulkIngestUsersRequest {
        required {
            users: Vec<BulkMessageUser> = "users",
        }
    }
}

wire_enum! {
    pub enum BulkJobStatus {
        Created = "CREATED",
        Processing = "PROCESSING",
        Completed = "COMPLETED",
        Error = "ERROR",
    }
}

wire_struct! {
    pub struct BulkJob {
        required {
            definition: BulkMessage = "definition",
            enqueued: i64 = "enqueued",
            failures: i64 = "failures",
            received: i64 = "received",
            status: BulkJobStatus = "status",
        }
    }
}

wire_struct! {
    pub struct BulkGetJobResponse {
        required {
            job: BulkJob = "job",
        }
    }
}

wire_enum! {
    pub enum BulkJobUserStatus {
        Pending = "PENDING",
        Enqueued = "ENQUEUED",
        Error = "ERROR",
    }
}

wire_struct! {
    pub struct BulkMessageUserResponse {
        required {
            status: BulkJobUserStatus = "status",
        }
        nullable {
            message_id: String = "messageId",
        }
        flatten {
            user: BulkMessageUser,
        }
    }
}

wire_struct! {
    pub struct BulkGetJobUsersResponse {
        required {
            items: Vec<BulkMessageUserResponse> = "items",
            paging: Paging = "paging",
        }
    }
}

/// Client for `/bulk`.
#[derive(Clone)]
pub struct BulkClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl BulkClient {
    pub async fn create_job(&self, req: BulkCreateJobRequest) -> Result<BulkCreateJobResponse> {
        self.inner
            .send_json(Method::POST, "/bulk", &req, &RequestOptions::default())
            .await
    }

    /// Ingest users into a job that has not been run yet.
    pub async fn add_users(&self, job_id: &str, users: Vec<BulkMessageUser>) -> Result<()> {
        if users.is_empty() {
            return Err(Error::Validation(
                ValidationError::new("at least one user is required").with_field("users"),
            ));
        }
        let path = format!("/bulk/{}", path_segment("job_id", job_id)?);
        self.inner
            .send_json(
                Method::POST,
                &path,
                &BulkIngestUsersRequest::new(users),
                &RequestOptions::default(),
            )
            .await
    }

    pub async fn run_job(&self, job_id: &str) -> Result<()> {
        let path = format!("/bulk/{}/run", path_segment("job_id", job_id)?);
        self.inner
            .execute(Method::POST, &path, &[], None, &RequestOptions::default())
            .await
    }

    pub async fn get_job(&self, job_id: &str) -> Result<BulkGetJobResponse> {
        let path = format!("/bulk/{}", path_segment("job_id", job_id)?);
        self.inner.get(&path, &[]).await
    }

    /// Per-user delivery state of a job.
    pub async fn users(&self, job_id: &str, cursor: Option<&str>) -> Result<BulkGetJobUsersResponse> {
        let path = format!("/bulk/{}/users", path_segment("job_id", job_id)?);
        let query: Vec<_> = cursor.map(|c| ("cursor", c.to_string())).into_iter().collect();
        self.inner.get(&path, &query).await
    }
}
