use serde::{Deserialize, Serialize};

use crate::client::DeskClient;
use crate::errors::DeskResult;
use crate::request::ApiRequest;
use crate::types::Paginated;

/// Charging network operator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Operator {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub api_endpoint: Option<String>,
    pub is_active: bool,
    pub notes: Option<String>,
    #[serde(default)]
    pub stations_count: Option<u32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OperatorListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OperatorInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct OperatorsApi<'a> {
    pub(crate) client: &'a DeskClient,
}

impl OperatorsApi<'_> {
    pub async fn list(&self, params: &OperatorListParams) -> DeskResult<Paginated<Operator>> {
        self.client
            .request_json(ApiRequest::get("/operators").query(params)?)
            .await
    }

    pub async fn get(&self, id: i64) -> DeskResult<Operator> {
        self.client
            .request_json(ApiRequest::get(format!("/operators/{}", id)))
            .await
    }

    pub async fn create(&self, input: &OperatorInput) -> DeskResult<Operator> {
        self.client
            .request_json(ApiRequest::post("/operators").json(input)?)
            .await
    }

    pub async fn update(&self, id: i64, input: &OperatorInput) -> DeskResult<Operator> {
        self.client
            .request_json(ApiRequest::put(format!("/operators/{}", id)).json(input)?)
            .await
    }

    pub async fn delete(&self, id: i64) -> DeskResult<()> {
        self.client
            .request_empty(ApiRequest::delete(format!("/operators/{}", id)))
            .await
    }
}
