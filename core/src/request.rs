use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{DeskError, DeskResult};

/// Description of one API call, kept as owned data so it can be dispatched again
/// after a token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, e.g. `/tickets/42`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<FormPart>),
}

/// One field of a `multipart/form-data` body
#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        mime_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File {
                file_name: file_name.into(),
                mime_type,
                bytes,
            },
        }
    }
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers,
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append query parameters from any serializable map-like value.
    /// `None` fields are skipped and sequences repeat the key.
    pub fn query<T: Serialize + ?Sized>(mut self, params: &T) -> DeskResult<Self> {
        let value = serde_json::to_value(params)?;
        self.query.extend(query_pairs(value)?);
        Ok(self)
    }

    pub fn query_pair(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> DeskResult<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Switch to a multipart body; the transport supplies the boundary header.
    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.headers.remove(CONTENT_TYPE);
        self.body = RequestBody::Multipart(parts);
        self
    }

    pub fn set_bearer(&mut self, token: &str) -> DeskResult<()> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
            DeskError::RequestError(format!("Access token is not a valid header value: {}", e))
        })?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    pub fn bearer(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

impl RequestBody {
    /// Build a fresh multipart form; `Form` is single-use so this runs per dispatch.
    pub(crate) fn to_form(parts: &[FormPart]) -> DeskResult<Form> {
        let mut form = Form::new();
        for part in parts {
            form = match &part.value {
                FormValue::Text(text) => form.text(part.name.clone(), text.clone()),
                FormValue::File {
                    file_name,
                    mime_type,
                    bytes,
                } => {
                    let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());
                    if let Some(mime) = mime_type {
                        file = file.mime_str(mime).map_err(|e| {
                            DeskError::RequestError(format!("Invalid mime type '{}': {}", mime, e))
                        })?;
                    }
                    form.part(part.name.clone(), file)
                }
            };
        }
        Ok(form)
    }
}

/// A request together with its one-shot refresh marker.
///
/// `retried` is set before the request is dispatched a second time, so a 401 on
/// the retry is passed through instead of triggering another refresh.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub request: ApiRequest,
    pub retried: bool,
}

impl PendingRequest {
    pub fn new(request: ApiRequest) -> Self {
        Self {
            request,
            retried: false,
        }
    }
}

fn query_pairs(value: Value) -> DeskResult<Vec<(String, String)>> {
    let Value::Object(map) = value else {
        return Err(DeskError::RequestError(
            "Query parameters must serialize to an object".to_string(),
        ));
    };

    let mut pairs = Vec::new();
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(item) = scalar_to_string(item) {
                        pairs.push((key.clone(), item));
                    }
                }
            }
            other => {
                if let Some(item) = scalar_to_string(other) {
                    pairs.push((key, item));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
