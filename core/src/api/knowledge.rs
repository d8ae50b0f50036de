use serde::{Deserialize, Serialize};

use crate::client::DeskClient;
use crate::errors::DeskResult;
use crate::request::ApiRequest;
use crate::types::{Paginated, UserRef};

/// Result limit the console uses for knowledge-base searches
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_html: Option<String>,
    pub category: String,
    pub language: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub error_codes: Vec<String>,
    #[serde(default)]
    pub station_models: Vec<String>,
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub helpful_count: u64,
    #[serde(default)]
    pub not_helpful_count: u64,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub author: Option<UserRef>,
    #[serde(default)]
    pub last_editor_id: Option<i64>,
    #[serde(default)]
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ArticleListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub is_published: Option<bool>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ArticleInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_codes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_models: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
}

/// Semantic search query
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArticleSearch {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// One ranked search result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub article_id: i64,
    pub title: String,
    pub category: String,
    pub content_preview: String,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Serialize)]
struct Helpful {
    helpful: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct KnowledgeApi<'a> {
    pub(crate) client: &'a DeskClient,
}

impl KnowledgeApi<'_> {
    pub async fn list(&self, params: &ArticleListParams) -> DeskResult<Paginated<Article>> {
        self.client
            .request_json(ApiRequest::get("/knowledge").query(params)?)
            .await
    }

    pub async fn get(&self, id: i64) -> DeskResult<Article> {
        self.client
            .request_json(ApiRequest::get(format!("/knowledge/{}", id)))
            .await
    }

    pub async fn create(&self, input: &ArticleInput) -> DeskResult<Article> {
        self.client
            .request_json(ApiRequest::post("/knowledge").json(input)?)
            .await
    }

    pub async fn update(&self, id: i64, input: &ArticleInput) -> DeskResult<Article> {
        self.client
            .request_json(ApiRequest::put(format!("/knowledge/{}", id)).json(input)?)
            .await
    }

    pub async fn delete(&self, id: i64) -> DeskResult<()> {
        self.client
            .request_empty(ApiRequest::delete(format!("/knowledge/{}", id)))
            .await
    }

    /// Ranked search; the limit defaults to 50 results
    pub async fn search(&self, search: &ArticleSearch) -> DeskResult<Vec<SearchHit>> {
        let mut search = search.clone();
        search.limit = Some(search.limit.unwrap_or(DEFAULT_SEARCH_LIMIT));

        let response: SearchResponse = self
            .client
            .request_json(ApiRequest::post("/knowledge/search").json(&search)?)
            .await?;
        Ok(response.results)
    }

    pub async fn mark_helpful(&self, id: i64, helpful: bool) -> DeskResult<()> {
        self.client
            .request_empty(ApiRequest::post(format!("/knowledge/{}/helpful", id)).json(&Helpful { helpful })?)
            .await
    }

    pub async fn categories(&self) -> DeskResult<Vec<String>> {
        self.client
            .request_json(ApiRequest::get("/knowledge/categories"))
            .await
    }
}
