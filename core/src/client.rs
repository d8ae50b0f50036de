use std::fmt;
use std::sync::Arc;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::DeskConfig;
use crate::errors::{DeskError, DeskResult};
use crate::request::{ApiRequest, PendingRequest, RequestBody};
use crate::session::{SessionStoreRef, TokenPair, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// Path of the token refresh endpoint, relative to the base URL
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Why the session could not be recovered after a 401
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthLostReason {
    /// No refresh token was stored
    NoRefreshToken,
    /// The refresh endpoint rejected the refresh token or could not be reached
    RefreshFailed,
}

/// Event raised when the session is gone and the user has to log in again
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthLost {
    pub reason: AuthLostReason,
    /// Where the hosting application should send the user
    pub login_path: String,
}

/// Callback invoked with every `AuthLost` event
pub type AuthLostHook = Arc<dyn Fn(&AuthLost) + Send + Sync>;

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// HTTP client for the service desk API.
///
/// Every request carries the stored access token. A 401 triggers at most one
/// refresh through `/auth/refresh` followed by one retry of the same request.
/// Concurrent requests that hit a 401 refresh independently.
#[derive(Clone)]
pub struct DeskClient {
    http: Client,
    base_url: String,
    store: SessionStoreRef,
    login_path: String,
    on_auth_lost: AuthLostHook,
}

impl fmt::Debug for DeskClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeskClient")
            .field("base_url", &self.base_url)
            .field("store", &self.store)
            .field("login_path", &self.login_path)
            .finish_non_exhaustive()
    }
}

impl DeskClient {
    /// Create a client against an already resolved base URL
    pub fn new(base_url: impl Into<String>, store: SessionStoreRef) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let login_path = "/login".to_string();
        Self {
            http: Client::new(),
            base_url,
            store,
            on_auth_lost: default_auth_lost_hook(),
            login_path,
        }
    }

    /// Create a client from configuration, resolving the base URL once
    pub fn from_config(config: &DeskConfig, store: SessionStoreRef) -> DeskResult<Self> {
        let base_url = config.base_url()?;
        info!("Using service desk API at {}", base_url);
        Ok(Self::new(base_url, store).with_login_path(config.login_path()))
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    /// Replace the handler that decides what "go back to the login view" means
    pub fn with_auth_lost_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&AuthLost) + Send + Sync + 'static,
    {
        self.on_auth_lost = Arc::new(hook);
        self
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &SessionStoreRef {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send a request through the authenticated pipeline
    pub async fn send(&self, request: ApiRequest) -> DeskResult<Response> {
        self.execute(PendingRequest::new(request)).await
    }

    /// Run a request whose retry marker is already known.
    ///
    /// Non-401 outcomes, transport errors and 401s on an already retried request
    /// are returned untouched. A first 401 marks the request as retried, then
    /// either refreshes the session and dispatches the request again, or
    /// reports the session as lost.
    #[instrument(skip(self, pending), fields(method = %pending.request.method, path = %pending.request.path))]
    pub async fn execute(&self, mut pending: PendingRequest) -> DeskResult<Response> {
        loop {
            match self.dispatch(&mut pending.request).await {
                Err(err) if err.is_unauthorized() && !pending.retried => {
                    pending.retried = true;
                    debug!("Received 401, attempting token refresh");
                    self.recover(&mut pending.request, err).await?;
                }
                outcome => return outcome,
            }
        }
    }

    /// Attach the current access token and transmit the request once
    async fn dispatch(&self, request: &mut ApiRequest) -> DeskResult<Response> {
        if let Some(token) = self.store.get(ACCESS_TOKEN_KEY)? {
            request.set_bearer(&token)?;
        }

        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path))
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(RequestBody::to_form(parts)?),
        };

        let response = builder.send().await.map_err(DeskError::TransportError)?;
        check_status(response).await
    }

    /// Handle the first 401 of a request. `Ok` means the session was refreshed and
    /// the request now carries the new token; `Err` is what the caller must see.
    async fn recover(&self, request: &mut ApiRequest, original: DeskError) -> DeskResult<()> {
        let Some(refresh_token) = self.store.get(REFRESH_TOKEN_KEY)? else {
            warn!("Access token rejected and no refresh token stored");
            if let Err(e) = self.store.remove(ACCESS_TOKEN_KEY) {
                warn!("Failed to drop access token: {}", e);
            }
            self.authentication_lost(AuthLostReason::NoRefreshToken);
            return Err(original);
        };

        match self.refresh(&refresh_token).await {
            Ok(tokens) => {
                self.store.store_tokens(&tokens)?;
                request.set_bearer(&tokens.access_token)?;
                debug!("Session refreshed, dispatching request again");
                Ok(())
            }
            Err(refresh_error) => {
                warn!("Token refresh failed: {}", refresh_error);
                if let Err(e) = self.store.clear() {
                    warn!("Failed to clear session: {}", e);
                }
                self.authentication_lost(AuthLostReason::RefreshFailed);
                Err(refresh_error)
            }
        }
    }

    /// Exchange a refresh token for a new pair. Sent without a bearer header.
    async fn refresh(&self, refresh_token: &str) -> DeskResult<TokenPair> {
        let response = self
            .http
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(DeskError::TransportError)?;
        let response = check_status(response).await?;

        response.json::<TokenPair>().await.map_err(|e| {
            DeskError::ParsingError(format!("Failed to parse refresh response: {}", e))
        })
    }

    fn authentication_lost(&self, reason: AuthLostReason) {
        let event = AuthLost {
            reason,
            login_path: self.login_path.clone(),
        };
        (self.on_auth_lost)(&event);
    }

    /// Send a request and decode its JSON body
    pub async fn request_json<T: DeserializeOwned>(&self, request: ApiRequest) -> DeskResult<T> {
        let path = request.path.clone();
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(|e| {
            DeskError::ParsingError(format!("Failed to parse response from {}: {}", path, e))
        })
    }

    /// Send a request whose response body is irrelevant
    pub async fn request_empty(&self, request: ApiRequest) -> DeskResult<()> {
        self.send(request).await?;
        Ok(())
    }

    /// Send a request and return the raw response body (downloads, exports)
    pub async fn request_bytes(&self, request: ApiRequest) -> DeskResult<Vec<u8>> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await.map_err(DeskError::TransportError)?;
        Ok(bytes.to_vec())
    }
}

fn default_auth_lost_hook() -> AuthLostHook {
    Arc::new(|event: &AuthLost| {
        warn!(
            "Session lost ({:?}); log in again at {}",
            event.reason, event.login_path
        );
    })
}

/// Turn non-2xx responses into `DeskError::HttpError`, keeping the backend's
/// `detail` message when the body carries one.
async fn check_status(response: Response) -> DeskResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(DeskError::HttpError {
        status,
        detail: error_detail(status, &body),
    })
}

fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(detail)) => return detail.clone(),
            Some(detail) => return detail.to_string(),
            None => {}
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
