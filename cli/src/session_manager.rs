use anyhow::{Context, Result};
use colored::*;
use servicedesk_core::{AuthLost, AuthLostReason, DeskClient, DeskConfig, FileSessionStore};
use std::sync::Arc;
use tracing::debug;

/// Builds the API client over the session file shared by every invocation
pub struct SessionManager;

impl SessionManager {
    pub fn client(config: &DeskConfig) -> Result<DeskClient> {
        let session_path = config
            .session_path()
            .context("Failed to locate the session file")?;
        debug!("Using session file {}", session_path.display());

        let store = Arc::new(FileSessionStore::new(session_path));
        let client = DeskClient::from_config(config, store)
            .context("Failed to resolve the API base URL")?
            .with_auth_lost_hook(report_lost_session);
        Ok(client)
    }
}

/// A terminal has no login page to navigate to; tell the user how to get back in
fn report_lost_session(event: &AuthLost) {
    let reason = match event.reason {
        AuthLostReason::NoRefreshToken => "Your session has expired.",
        AuthLostReason::RefreshFailed => "Your session could not be renewed.",
    };
    eprintln!(
        "{} {}",
        reason.red().bold(),
        "Run `servicedesk login` to sign in again.".yellow()
    );
}
