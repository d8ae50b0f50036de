//! Typed wrappers over the service desk REST API.
//!
//! Each group borrows the `DeskClient`, so every call goes through the
//! authenticated pipeline.

pub mod auth;
pub mod departments;
pub mod incident_types;
pub mod knowledge;
pub mod log_analysis;
pub mod notifications;
pub mod operators;
pub mod roles;
pub mod stations;
pub mod tickets;
pub mod users;

use crate::client::DeskClient;

pub use auth::AuthApi;
pub use departments::DepartmentsApi;
pub use incident_types::IncidentTypesApi;
pub use knowledge::KnowledgeApi;
pub use log_analysis::LogAnalysisApi;
pub use notifications::NotificationsApi;
pub use operators::OperatorsApi;
pub use roles::RolesApi;
pub use stations::StationsApi;
pub use tickets::TicketsApi;
pub use users::UsersApi;

impl DeskClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    pub fn tickets(&self) -> TicketsApi<'_> {
        TicketsApi { client: self }
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi { client: self }
    }

    pub fn departments(&self) -> DepartmentsApi<'_> {
        DepartmentsApi { client: self }
    }

    pub fn operators(&self) -> OperatorsApi<'_> {
        OperatorsApi { client: self }
    }

    pub fn stations(&self) -> StationsApi<'_> {
        StationsApi { client: self }
    }

    pub fn knowledge(&self) -> KnowledgeApi<'_> {
        KnowledgeApi { client: self }
    }

    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi { client: self }
    }

    pub fn roles(&self) -> RolesApi<'_> {
        RolesApi { client: self }
    }

    pub fn incident_types(&self) -> IncidentTypesApi<'_> {
        IncidentTypesApi { client: self }
    }

    pub fn log_analysis(&self) -> LogAnalysisApi<'_> {
        LogAnalysisApi { client: self }
    }
}
