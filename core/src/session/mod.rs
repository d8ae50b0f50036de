//! Token storage for the service desk client
//!
//! The access/refresh token pair lives behind the `SessionStore` trait so the
//! request pipeline never touches ambient state directly. Two backends are
//! provided: an in-memory map for tests and embedding, and a JSON file that
//! plays the role browser local storage plays for the web console.

pub mod adapters;
pub mod store;

pub use adapters::{FileSessionStore, InMemorySessionStore};
pub use store::{
    SessionStore, SessionStoreError, SessionStoreRef, TokenPair, ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
};
