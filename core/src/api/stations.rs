use serde::{Deserialize, Serialize};

use crate::client::DeskClient;
use crate::errors::DeskResult;
use crate::request::ApiRequest;
use crate::types::{NamedRef, Paginated};

/// Language used for localized station fields when the caller gives none
pub const DEFAULT_STATION_LANGUAGE: &str = "ua";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationPort {
    pub id: i64,
    pub port_number: i32,
    pub connector_type: Option<String>,
    pub power_kw: Option<f64>,
    pub status: String,
    pub last_session_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub id: i64,
    pub station_id: String,
    /// Operator's own station number
    pub external_id: Option<String>,
    pub name: String,
    pub operator_id: i64,
    pub operator: Option<NamedRef>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub firmware_version: Option<String>,
    pub installation_date: Option<String>,
    pub last_maintenance_date: Option<String>,
    pub status: String,
    #[serde(default)]
    pub ports: Vec<StationPort>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// Row of the paginated station list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationListItem {
    pub id: i64,
    pub station_id: String,
    pub external_id: Option<String>,
    pub name: String,
    pub operator: Option<NamedRef>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub model: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StationListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub operator_id: Option<i64>,
    pub city: Option<String>,
    pub station_status: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PortInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_kw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StationInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_maintenance_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Only honoured on creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<PortInput>>,
}

#[derive(Serialize)]
struct StationSearch<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    language: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct StationsApi<'a> {
    pub(crate) client: &'a DeskClient,
}

impl StationsApi<'_> {
    pub async fn list(&self, params: &StationListParams) -> DeskResult<Paginated<StationListItem>> {
        self.client
            .request_json(ApiRequest::get("/stations").query(params)?)
            .await
    }

    pub async fn get(&self, id: i64, language: Option<&str>) -> DeskResult<Station> {
        let request = ApiRequest::get(format!("/stations/{}", id))
            .query_pair("language", language.unwrap_or(DEFAULT_STATION_LANGUAGE));
        self.client.request_json(request).await
    }

    pub async fn create(&self, input: &StationInput) -> DeskResult<Station> {
        self.client
            .request_json(ApiRequest::post("/stations").json(input)?)
            .await
    }

    pub async fn update(&self, id: i64, input: &StationInput) -> DeskResult<Station> {
        self.client
            .request_json(ApiRequest::put(format!("/stations/{}", id)).json(input)?)
            .await
    }

    pub async fn delete(&self, id: i64) -> DeskResult<()> {
        self.client
            .request_empty(ApiRequest::delete(format!("/stations/{}", id)))
            .await
    }

    /// Quick lookup by station id, name or address
    pub async fn search(&self, query: &str, limit: Option<u32>, language: Option<&str>) -> DeskResult<Vec<Station>> {
        let params = StationSearch {
            q: query,
            limit,
            language: language.unwrap_or(DEFAULT_STATION_LANGUAGE),
        };
        self.client
            .request_json(ApiRequest::get("/stations/search").query(&params)?)
            .await
    }

    pub async fn ports(&self, station_id: i64) -> DeskResult<Vec<StationPort>> {
        self.client
            .request_json(ApiRequest::get(format!("/stations/{}/ports", station_id)))
            .await
    }

    pub async fn create_port(&self, station_id: i64, input: &PortInput) -> DeskResult<StationPort> {
        self.client
            .request_json(ApiRequest::post(format!("/stations/{}/ports", station_id)).json(input)?)
            .await
    }

    pub async fn update_port(&self, station_id: i64, port_id: i64, input: &PortInput) -> DeskResult<StationPort> {
        let path = format!("/stations/{}/ports/{}", station_id, port_id);
        self.client
            .request_json(ApiRequest::put(path).json(input)?)
            .await
    }

    pub async fn delete_port(&self, station_id: i64, port_id: i64) -> DeskResult<()> {
        self.client
            .request_empty(ApiRequest::delete(format!(
                "/stations/{}/ports/{}",
                station_id, port_id
            )))
            .await
    }
}
