use serde::{Deserialize, Serialize};

use crate::client::DeskClient;
use crate::errors::DeskResult;
use crate::request::ApiRequest;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentType {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IncidentTypeInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
pub struct IncidentTypesApi<'a> {
    pub(crate) client: &'a DeskClient,
}

impl IncidentTypesApi<'_> {
    pub async fn list(&self, active_only: bool) -> DeskResult<Vec<IncidentType>> {
        let request = ApiRequest::get("/incident-types/").query_pair("active_only", active_only);
        self.client.request_json(request).await
    }

    pub async fn create(&self, name: &str) -> DeskResult<IncidentType> {
        let input = IncidentTypeInput {
            name: Some(name.to_string()),
            is_active: None,
        };
        self.client
            .request_json(ApiRequest::post("/incident-types/").json(&input)?)
            .await
    }

    pub async fn update(&self, id: i64, input: &IncidentTypeInput) -> DeskResult<IncidentType> {
        self.client
            .request_json(ApiRequest::put(format!("/incident-types/{}", id)).json(input)?)
            .await
    }

    pub async fn delete(&self, id: i64) -> DeskResult<()> {
        self.client
            .request_empty(ApiRequest::delete(format!("/incident-types/{}", id)))
            .await
    }
}
