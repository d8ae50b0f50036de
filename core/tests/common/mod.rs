//! Common test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use servicedesk_core::{AuthLost, DeskClient, InMemorySessionStore, SessionStore, TokenPair};
use wiremock::MockServer;

/// A client wired to a mock backend, an inspectable store and a recorded auth-lost hook
pub struct Harness {
    pub server: MockServer,
    pub store: Arc<InMemorySessionStore>,
    pub lost: Arc<Mutex<Vec<AuthLost>>>,
    pub client: DeskClient,
}

impl Harness {
    pub async fn start() -> Self {
        Self::with_store(InMemorySessionStore::new()).await
    }

    pub async fn with_tokens(access: &str, refresh: &str) -> Self {
        Self::with_store(InMemorySessionStore::with_tokens(&TokenPair::new(access, refresh))).await
    }

    pub async fn with_store(store: InMemorySessionStore) -> Self {
        let server = MockServer::start().await;
        let store = Arc::new(store);
        let lost = Arc::new(Mutex::new(Vec::new()));

        let recorder = lost.clone();
        let client = DeskClient::new(format!("{}/api/v1", server.uri()), store.clone())
            .with_auth_lost_hook(move |event| recorder.lock().unwrap().push(event.clone()));

        Self {
            server,
            store,
            lost,
            client,
        }
    }

    pub fn tokens(&self) -> Option<TokenPair> {
        self.store.tokens().unwrap()
    }

    pub fn lost_events(&self) -> Vec<AuthLost> {
        self.lost.lock().unwrap().clone()
    }

    /// Requests the mock server saw for `path`, in arrival order
    pub async fn requests_to(&self, path: &str) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == path)
            .collect()
    }
}

/// Authorization header value of a recorded request
pub fn authorization(request: &wiremock::Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn token_body(access: &str, refresh: &str) -> Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "bearer"
    })
}

pub fn user_body(is_admin: bool, permissions: &[&str]) -> Value {
    json!({
        "id": 7,
        "email": "dispatcher@example.com",
        "first_name": "Olena",
        "last_name": "Koval",
        "phone": null,
        "is_active": true,
        "is_admin": is_admin,
        "department_id": 2,
        "department": {"id": 2, "name": "Support"},
        "roles": [{"id": 3, "name": "Dispatcher"}],
        "permissions": permissions,
        "created_at": "2024-01-10T08:00:00",
        "updated_at": "2024-02-01T09:30:00"
    })
}

pub fn ticket_body(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "ticket_number": format!("TKT-{:05}", id),
        "title": "Station offline",
        "description": "Connector 2 does not start charging",
        "category": "hardware",
        "priority": "high",
        "status": status,
        "station_id": 11,
        "station": {
            "id": 11,
            "station_id": "UA-KYIV-0042",
            "station_number": "42",
            "name": "Khreshchatyk 22",
            "address": "Khreshchatyk St, 22",
            "operator_name": "VoltNet"
        },
        "port_number": 2,
        "reporter_name": "Ivan",
        "reporter_phone": "+380501112233",
        "reporter_email": null,
        "assigned_user_id": null,
        "assigned_user": null,
        "assigned_department_id": 2,
        "assigned_department": {"id": 2, "name": "Support"},
        "created_by_id": 7,
        "created_by": {"id": 7, "first_name": "Olena", "last_name": "Koval", "email": "dispatcher@example.com"},
        "created_at": "2024-03-01T10:15:00",
        "updated_at": "2024-03-01T10:15:00",
        "resolved_at": null,
        "closed_at": null,
        "sla_due_date": "2024-03-01T14:15:00",
        "sla_breached": false,
        "ai_log_analysis": null,
        "comments_count": 0,
        "attachments_count": 0
    })
}
