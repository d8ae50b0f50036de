use tracing::{debug, info, warn};

use crate::client::DeskClient;
use crate::errors::DeskResult;
use crate::session::TokenPair;
use crate::types::{CurrentUser, LoginRequest};

/// Who is logged in, kept next to the client that carries their tokens
#[derive(Debug)]
pub struct AuthState {
    client: DeskClient,
    user: Option<CurrentUser>,
}

impl AuthState {
    pub fn new(client: DeskClient) -> Self {
        Self { client, user: None }
    }

    pub fn client(&self) -> &DeskClient {
        &self.client
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Log in, persist the issued tokens and load the profile.
    ///
    /// Any previous session is dropped first, so a rejected password is
    /// reported as such and never mistaken for an expired session.
    pub async fn login(&mut self, credentials: &LoginRequest) -> DeskResult<&CurrentUser> {
        self.client.store().clear()?;
        self.user = None;

        let token = self.client.auth().login(credentials).await?;
        self.client
            .store()
            .store_tokens(&TokenPair::new(token.access_token, token.refresh_token))?;

        let user = self.client.auth().me().await?;
        info!("Logged in as {}", user.email);
        Ok(self.user.insert(user))
    }

    /// Tell the backend, then drop the local session whatever it answered
    pub async fn logout(&mut self) -> DeskResult<()> {
        let result = self.client.auth().logout().await;
        if let Err(e) = &result {
            warn!("Logout request failed: {}", e);
        }
        self.client.store().clear()?;
        self.user = None;
        result
    }

    /// Restore the user from the stored session.
    ///
    /// Without an access token no request is made. A failing profile call drops
    /// the stored session.
    pub async fn check_auth(&mut self) -> DeskResult<Option<&CurrentUser>> {
        if self.client.store().get(crate::session::ACCESS_TOKEN_KEY)?.is_none() {
            debug!("No stored access token");
            self.user = None;
            return Ok(None);
        }

        match self.client.auth().me().await {
            Ok(user) => Ok(Some(self.user.insert(user))),
            Err(e) => {
                debug!("Stored session rejected: {}", e);
                self.client.store().clear()?;
                self.user = None;
                Ok(None)
            }
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        match &self.user {
            None => false,
            Some(user) if user.is_admin => true,
            Some(user) => user.permissions.iter().any(|p| p == permission),
        }
    }

    pub fn set_user(&mut self, user: CurrentUser) {
        self.user = Some(user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InMemorySessionStore;
    use std::sync::Arc;

    fn user(is_admin: bool, permissions: &[&str]) -> CurrentUser {
        CurrentUser {
            id: 1,
            email: "dispatcher@example.com".to_string(),
            first_name: "Olena".to_string(),
            last_name: "Koval".to_string(),
            phone: None,
            is_active: true,
            is_admin,
            department_id: None,
            department: None,
            roles: Vec::new(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            created_at: "2024-01-01T00:00:00".to_string(),
            updated_at: "2024-01-01T00:00:00".to_string(),
        }
    }

    fn state() -> AuthState {
        let client = DeskClient::new("http://127.0.0.1:9/api/v1", Arc::new(InMemorySessionStore::new()));
        AuthState::new(client)
    }

    #[test]
    fn test_has_permission() {
        let mut state = state();
        assert!(!state.has_permission("tickets.view"));

        state.set_user(user(false, &["tickets.view"]));
        assert!(state.has_permission("tickets.view"));
        assert!(!state.has_permission("users.manage"));

        state.set_user(user(true, &[]));
        assert!(state.has_permission("users.manage"));
    }

    #[tokio::test]
    async fn test_check_auth_without_token_makes_no_request() {
        // The base URL points at a closed port; any request would fail
        let mut state = state();
        let restored = state.check_auth().await.unwrap();
        assert!(restored.is_none());
        assert!(!state.is_authenticated());
    }
}
