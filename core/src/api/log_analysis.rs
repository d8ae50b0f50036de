use serde::{Deserialize, Serialize};

use crate::client::DeskClient;
use crate::errors::DeskResult;
use crate::request::ApiRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogAnalysisRequest {
    pub log_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Result of the AI log analyzer; also embedded in tickets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogAnalysis {
    pub analysis: String,
    #[serde(default)]
    pub error_codes: Vec<String>,
    pub status: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct LogAnalysisApi<'a> {
    pub(crate) client: &'a DeskClient,
}

impl LogAnalysisApi<'_> {
    pub async fn analyze(&self, request: &LogAnalysisRequest) -> DeskResult<LogAnalysis> {
        self.client
            .request_json(ApiRequest::post("/log-analysis/analyze").json(request)?)
            .await
    }
}
