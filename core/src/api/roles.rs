use serde::{Deserialize, Serialize};

use crate::client::DeskClient;
use crate::errors::DeskResult;
use crate::request::ApiRequest;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Permission {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_system: bool,
    pub is_active: bool,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    pub created_at: String,
    pub updated_at: String,
}

/// Read-only access to roles; role editing happens on the backend
#[derive(Debug, Clone, Copy)]
pub struct RolesApi<'a> {
    pub(crate) client: &'a DeskClient,
}

impl RolesApi<'_> {
    pub async fn list(&self) -> DeskResult<Vec<Role>> {
        self.client.request_json(ApiRequest::get("/roles")).await
    }

    pub async fn get(&self, id: i64) -> DeskResult<Role> {
        self.client
            .request_json(ApiRequest::get(format!("/roles/{}", id)))
            .await
    }

    pub async fn permissions(&self) -> DeskResult<Vec<Permission>> {
        self.client
            .request_json(ApiRequest::get("/roles/permissions"))
            .await
    }
}
