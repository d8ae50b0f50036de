// Client library for the charging-station service desk:
// - Configuration and base URL resolution
// - Token storage
// - Authenticated request pipeline with refresh-on-401
// - Typed wrappers for the REST API

pub mod api;
pub mod auth_state;
pub mod client;
pub mod config;
pub mod errors;
pub mod request;
pub mod session;
pub mod types;

pub use auth_state::AuthState;
pub use client::{AuthLost, AuthLostHook, AuthLostReason, DeskClient, REFRESH_PATH};
pub use config::*;
pub use errors::*;
pub use request::{ApiRequest, FormPart, FormValue, PendingRequest, RequestBody};
pub use session::{
    FileSessionStore, InMemorySessionStore, SessionStore, SessionStoreError, SessionStoreRef,
    TokenPair, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
};
pub use types::*;
