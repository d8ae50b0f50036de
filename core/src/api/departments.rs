use serde::{Deserialize, Serialize};

use crate::client::DeskClient;
use crate::errors::DeskResult;
use crate::request::ApiRequest;
use crate::types::{Paginated, UserRef};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub head_user_id: Option<i64>,
    pub head_user: Option<UserRef>,
    pub is_active: bool,
    #[serde(default)]
    pub users_count: Option<u32>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DepartmentListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DepartmentInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
pub struct DepartmentsApi<'a> {
    pub(crate) client: &'a DeskClient,
}

impl DepartmentsApi<'_> {
    pub async fn list(&self, params: &DepartmentListParams) -> DeskResult<Paginated<Department>> {
        self.client
            .request_json(ApiRequest::get("/departments").query(params)?)
            .await
    }

    /// Unpaginated list, used to fill pickers
    pub async fn all(&self, lang: Option<&str>) -> DeskResult<Vec<Department>> {
        let mut request = ApiRequest::get("/departments/all");
        if let Some(lang) = lang {
            request = request.query_pair("lang", lang);
        }
        self.client.request_json(request).await
    }

    pub async fn get(&self, id: i64) -> DeskResult<Department> {
        self.client
            .request_json(ApiRequest::get(format!("/departments/{}", id)))
            .await
    }

    pub async fn create(&self, input: &DepartmentInput) -> DeskResult<Department> {
        self.client
            .request_json(ApiRequest::post("/departments").json(input)?)
            .await
    }

    pub async fn update(&self, id: i64, input: &DepartmentInput) -> DeskResult<Department> {
        self.client
            .request_json(ApiRequest::put(format!("/departments/{}", id)).json(input)?)
            .await
    }

    pub async fn delete(&self, id: i64) -> DeskResult<()> {
        self.client
            .request_empty(ApiRequest::delete(format!("/departments/{}", id)))
            .await
    }
}
