use serde::{Deserialize, Serialize};

use crate::client::DeskClient;
use crate::errors::DeskResult;
use crate::request::ApiRequest;
use crate::types::Paginated;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub ticket_id: Option<i64>,
    pub is_read: bool,
    pub read_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationCount {
    pub total: u64,
    pub unread: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NotificationListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub unread_only: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
pub struct NotificationsApi<'a> {
    pub(crate) client: &'a DeskClient,
}

impl NotificationsApi<'_> {
    pub async fn list(&self, params: &NotificationListParams) -> DeskResult<Paginated<Notification>> {
        self.client
            .request_json(ApiRequest::get("/notifications").query(params)?)
            .await
    }

    pub async fn count(&self) -> DeskResult<NotificationCount> {
        self.client
            .request_json(ApiRequest::get("/notifications/count"))
            .await
    }

    pub async fn mark_read(&self, id: i64) -> DeskResult<()> {
        self.client
            .request_empty(ApiRequest::put(format!("/notifications/{}/read", id)))
            .await
    }

    pub async fn mark_all_read(&self) -> DeskResult<()> {
        self.client
            .request_empty(ApiRequest::put("/notifications/read-all"))
            .await
    }

    pub async fn delete(&self, id: i64) -> DeskResult<()> {
        self.client
            .request_empty(ApiRequest::delete(format!("/notifications/{}", id)))
            .await
    }
}
