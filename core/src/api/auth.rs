use serde::Serialize;

use crate::client::DeskClient;
use crate::errors::{DeskError, DeskResult};
use crate::request::{ApiRequest, PendingRequest};
use crate::types::{CurrentUser, LoginRequest, Token};

#[derive(Serialize)]
struct ChangePassword<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

/// `/auth` endpoints
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    pub(crate) client: &'a DeskClient,
}

impl AuthApi<'_> {
    /// Exchange credentials for a token pair. Does not store the tokens.
    ///
    /// A 401 here means bad credentials, so the request skips the refresh path.
    pub async fn login(&self, credentials: &LoginRequest) -> DeskResult<Token> {
        let pending = PendingRequest {
            request: ApiRequest::post("/auth/login").json(credentials)?,
            retried: true,
        };
        let response = self.client.execute(pending).await?;
        response.json::<Token>().await.map_err(|e| {
            DeskError::ParsingError(format!("Failed to parse login response: {}", e))
        })
    }

    pub async fn logout(&self) -> DeskResult<()> {
        self.client.request_empty(ApiRequest::post("/auth/logout")).await
    }

    pub async fn me(&self) -> DeskResult<CurrentUser> {
        self.client.request_json(ApiRequest::get("/auth/me")).await
    }

    pub async fn change_password(&self, current_password: &str, new_password: &str) -> DeskResult<()> {
        let body = ChangePassword {
            current_password,
            new_password,
        };
        self.client
            .request_empty(ApiRequest::put("/auth/change-password").json(&body)?)
            .await
    }
}
