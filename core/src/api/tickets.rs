use serde::{Deserialize, Serialize};

use crate::api::log_analysis::LogAnalysis;
use crate::client::DeskClient;
use crate::errors::DeskResult;
use crate::request::{ApiRequest, FormPart};
use crate::types::{NamedRef, Paginated, UserRef};

/// Station summary embedded in a ticket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketStation {
    pub id: i64,
    pub station_id: String,
    pub station_number: Option<String>,
    pub name: String,
    pub address: Option<String>,
    pub operator_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub id: i64,
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub station_id: Option<i64>,
    pub station: Option<TicketStation>,
    pub port_number: Option<i32>,
    pub reporter_name: Option<String>,
    pub reporter_phone: Option<String>,
    pub reporter_email: Option<String>,
    pub assigned_user_id: Option<i64>,
    pub assigned_user: Option<UserRef>,
    pub assigned_department_id: Option<i64>,
    pub assigned_department: Option<NamedRef>,
    pub created_by_id: i64,
    pub created_by: Option<UserRef>,
    pub created_at: String,
    pub updated_at: String,
    pub resolved_at: Option<String>,
    pub closed_at: Option<String>,
    pub sla_due_date: Option<String>,
    #[serde(default)]
    pub sla_breached: bool,
    pub ai_log_analysis: Option<LogAnalysis>,
    #[serde(default)]
    pub comments_count: u32,
    #[serde(default)]
    pub attachments_count: u32,
    #[serde(default)]
    pub incident_type: Option<String>,
    #[serde(default)]
    pub port_type: Option<String>,
    #[serde(default)]
    pub contact_source: Option<String>,
    #[serde(default)]
    pub station_logs: Option<String>,
    #[serde(default)]
    pub vehicle: Option<String>,
    #[serde(default)]
    pub client_type: Option<String>,
}

/// `GET /tickets/{id}` returns the ticket together with its thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: Ticket,
    #[serde(default)]
    pub comments: Vec<TicketComment>,
    #[serde(default)]
    pub history: Vec<TicketHistory>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketComment {
    pub id: i64,
    pub ticket_id: i64,
    pub user_id: i64,
    pub user: Option<UserRef>,
    pub content: String,
    #[serde(default)]
    pub is_internal: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketHistory {
    pub id: i64,
    pub ticket_id: i64,
    pub user_id: i64,
    pub user: Option<UserRef>,
    pub action: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketLog {
    pub id: i64,
    pub log_type: String,
    pub filename: String,
    pub file_size: u64,
    pub collected_at: String,
    pub log_start_time: Option<String>,
    pub log_end_time: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketAttachment {
    pub id: i64,
    pub filename: String,
    pub file_path: String,
    pub file_size: u64,
    pub mime_type: String,
    pub uploaded_by_id: i64,
    pub uploaded_at: String,
}

/// Ticket fields extracted from a free-form customer message by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParsedMessage {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub station_id: Option<String>,
    pub station_db_id: Option<i64>,
    pub station_name: Option<String>,
    pub station_address: Option<String>,
    pub station_city: Option<String>,
    pub station_found: bool,
    pub operator_name: Option<String>,
    pub operator_db_id: Option<i64>,
    pub operator_found: bool,
    pub port_number: Option<i32>,
    pub vehicle_info: Option<String>,
    pub reporter_name: Option<String>,
    pub reporter_phone: Option<String>,
    pub reporter_email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TicketListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub assigned_user_id: Option<i64>,
    pub assigned_department_id: Option<i64>,
    pub department_id: Option<i64>,
    pub station_id: Option<i64>,
    pub created_by_id: Option<i64>,
    pub my_tickets: Option<bool>,
    pub delegated_to_me: Option<bool>,
}

/// Body of ticket creation; every field is optional on update
#[derive(Debug, Clone, Default, Serialize)]
pub struct TicketInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_department_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_log_analysis: Option<LogAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_logs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_type: Option<String>,
}

/// File handed to an upload endpoint
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Optional metadata sent along with a log file
#[derive(Debug, Clone, Default)]
pub struct LogUploadMeta {
    pub description: Option<String>,
    pub log_start_time: Option<String>,
    pub log_end_time: Option<String>,
}

#[derive(Serialize)]
struct StatusChange<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

#[derive(Serialize)]
struct Assignment<'a> {
    assigned_user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

#[derive(Serialize)]
struct Delegation<'a> {
    assigned_department_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    assigned_user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

#[derive(Serialize)]
struct NewComment<'a> {
    content: &'a str,
    is_internal: bool,
}

#[derive(Serialize)]
struct TextLog<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Serialize)]
struct MessageToParse<'a> {
    message: &'a str,
}

/// `/tickets` endpoints
#[derive(Debug, Clone, Copy)]
pub struct TicketsApi<'a> {
    pub(crate) client: &'a DeskClient,
}

impl TicketsApi<'_> {
    pub async fn list(&self, params: &TicketListParams) -> DeskResult<Paginated<Ticket>> {
        self.client
            .request_json(ApiRequest::get("/tickets").query(params)?)
            .await
    }

    pub async fn get(&self, id: i64) -> DeskResult<TicketDetail> {
        self.client
            .request_json(ApiRequest::get(format!("/tickets/{}", id)))
            .await
    }

    pub async fn create(&self, input: &TicketInput) -> DeskResult<Ticket> {
        self.client
            .request_json(ApiRequest::post("/tickets").json(input)?)
            .await
    }

    pub async fn update(&self, id: i64, input: &TicketInput) -> DeskResult<Ticket> {
        self.client
            .request_json(ApiRequest::put(format!("/tickets/{}", id)).json(input)?)
            .await
    }

    pub async fn delete(&self, id: i64) -> DeskResult<()> {
        self.client
            .request_empty(ApiRequest::delete(format!("/tickets/{}", id)))
            .await
    }

    pub async fn update_status(&self, id: i64, status: &str, comment: Option<&str>) -> DeskResult<Ticket> {
        let body = StatusChange { status, comment };
        self.client
            .request_json(ApiRequest::put(format!("/tickets/{}/status", id)).json(&body)?)
            .await
    }

    /// Assign to a user, or unassign with `None`
    pub async fn assign(&self, id: i64, user_id: Option<i64>, comment: Option<&str>) -> DeskResult<Ticket> {
        let body = Assignment {
            assigned_user_id: user_id,
            comment,
        };
        self.client
            .request_json(ApiRequest::put(format!("/tickets/{}/assign", id)).json(&body)?)
            .await
    }

    pub async fn delegate(
        &self,
        id: i64,
        department_id: i64,
        user_id: Option<i64>,
        comment: Option<&str>,
    ) -> DeskResult<Ticket> {
        let body = Delegation {
            assigned_department_id: department_id,
            assigned_user_id: user_id,
            comment,
        };
        self.client
            .request_json(ApiRequest::put(format!("/tickets/{}/delegate", id)).json(&body)?)
            .await
    }

    pub async fn add_comment(&self, id: i64, content: &str, is_internal: bool) -> DeskResult<TicketComment> {
        let body = NewComment {
            content,
            is_internal,
        };
        self.client
            .request_json(ApiRequest::post(format!("/tickets/{}/comments", id)).json(&body)?)
            .await
    }

    pub async fn comments(&self, id: i64) -> DeskResult<Vec<TicketComment>> {
        self.client
            .request_json(ApiRequest::get(format!("/tickets/{}/comments", id)))
            .await
    }

    pub async fn history(&self, id: i64) -> DeskResult<Vec<TicketHistory>> {
        self.client
            .request_json(ApiRequest::get(format!("/tickets/{}/history", id)))
            .await
    }

    pub async fn logs(&self, id: i64) -> DeskResult<Vec<TicketLog>> {
        self.client
            .request_json(ApiRequest::get(format!("/tickets/{}/logs", id)))
            .await
    }

    pub async fn upload_log(&self, id: i64, file: Upload, meta: &LogUploadMeta) -> DeskResult<TicketLog> {
        let mut parts = vec![FormPart::file("file", file.file_name, file.mime_type, file.bytes)];
        let optional = [
            ("description", &meta.description),
            ("log_start_time", &meta.log_start_time),
            ("log_end_time", &meta.log_end_time),
        ];
        for (name, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                parts.push(FormPart::text(name, value));
            }
        }

        self.client
            .request_json(ApiRequest::post(format!("/tickets/{}/logs", id)).multipart(parts))
            .await
    }

    /// Attach pasted log text instead of a file
    pub async fn upload_text_log(&self, id: i64, content: &str, description: Option<&str>) -> DeskResult<TicketLog> {
        let body = TextLog {
            content,
            description,
        };
        self.client
            .request_json(ApiRequest::post(format!("/tickets/{}/logs/text", id)).json(&body)?)
            .await
    }

    pub async fn download_log(&self, id: i64, log_id: i64) -> DeskResult<Vec<u8>> {
        self.client
            .request_bytes(ApiRequest::get(format!("/tickets/{}/logs/{}/download", id, log_id)))
            .await
    }

    pub async fn delete_log(&self, id: i64, log_id: i64) -> DeskResult<()> {
        self.client
            .request_empty(ApiRequest::delete(format!("/tickets/{}/logs/{}", id, log_id)))
            .await
    }

    pub async fn parse_message(&self, message: &str) -> DeskResult<ParsedMessage> {
        self.client
            .request_json(ApiRequest::post("/tickets/parse-message").json(&MessageToParse { message })?)
            .await
    }

    pub async fn attachments(&self, id: i64) -> DeskResult<Vec<TicketAttachment>> {
        self.client
            .request_json(ApiRequest::get(format!("/tickets/{}/attachments", id)))
            .await
    }

    pub async fn upload_attachment(&self, id: i64, file: Upload) -> DeskResult<TicketAttachment> {
        let parts = vec![FormPart::file("file", file.file_name, file.mime_type, file.bytes)];
        self.client
            .request_json(ApiRequest::post(format!("/tickets/{}/attachments", id)).multipart(parts))
            .await
    }

    pub async fn download_attachment(&self, id: i64, attachment_id: i64) -> DeskResult<Vec<u8>> {
        self.client
            .request_bytes(ApiRequest::get(format!(
                "/tickets/{}/attachments/{}/download",
                id, attachment_id
            )))
            .await
    }

    pub async fn delete_attachment(&self, id: i64, attachment_id: i64) -> DeskResult<()> {
        self.client
            .request_empty(ApiRequest::delete(format!(
                "/tickets/{}/attachments/{}",
                id, attachment_id
            )))
            .await
    }

    /// Spreadsheet export of the tickets matching `params`
    pub async fn export(&self, params: &TicketListParams) -> DeskResult<Vec<u8>> {
        self.client
            .request_bytes(ApiRequest::get("/tickets/export").query(params)?)
            .await
    }
}
