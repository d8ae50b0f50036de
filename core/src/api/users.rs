use serde::{Deserialize, Serialize};

use crate::client::DeskClient;
use crate::errors::DeskResult;
use crate::request::ApiRequest;
use crate::types::{NamedRef, Paginated};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub department_id: Option<i64>,
    pub department: Option<NamedRef>,
    pub is_active: bool,
    pub is_admin: bool,
    #[serde(default)]
    pub roles: Vec<NamedRef>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub department_id: Option<i64>,
    pub role_id: Option<i64>,
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_ids: Option<Vec<i64>>,
}

/// Partial update. `department_id: Some(None)` detaches the user from their department.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Copy)]
pub struct UsersApi<'a> {
    pub(crate) client: &'a DeskClient,
}

impl UsersApi<'_> {
    pub async fn list(&self, params: &UserListParams) -> DeskResult<Paginated<User>> {
        self.client
            .request_json(ApiRequest::get("/users").query(params)?)
            .await
    }

    pub async fn get(&self, id: i64) -> DeskResult<User> {
        self.client
            .request_json(ApiRequest::get(format!("/users/{}", id)))
            .await
    }

    pub async fn create(&self, input: &CreateUser) -> DeskResult<User> {
        self.client
            .request_json(ApiRequest::post("/users").json(input)?)
            .await
    }

    pub async fn update(&self, id: i64, input: &UpdateUser) -> DeskResult<User> {
        self.client
            .request_json(ApiRequest::put(format!("/users/{}", id)).json(input)?)
            .await
    }

    pub async fn delete(&self, id: i64) -> DeskResult<()> {
        self.client
            .request_empty(ApiRequest::delete(format!("/users/{}", id)))
            .await
    }

    /// Admin password reset; the backend takes the new password as a query parameter
    pub async fn reset_password(&self, id: i64, new_password: &str) -> DeskResult<()> {
        let request =
            ApiRequest::put(format!("/users/{}/password", id)).query_pair("new_password", new_password);
        self.client.request_empty(request).await
    }
}
