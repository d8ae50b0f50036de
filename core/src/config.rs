use crate::errors::{DeskError, DeskResult};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable holding an explicit API base URL.
pub const API_URL_ENV: &str = "SERVICEDESK_API_URL";
/// Environment variable holding the console origin used to derive the API URL.
pub const ORIGIN_ENV: &str = "SERVICEDESK_ORIGIN";

/// Port the backend listens on when the base URL is derived from the origin.
pub const DERIVED_API_PORT: u16 = 8000;
/// Path prefix of the versioned REST API.
pub const API_PREFIX: &str = "/api/v1";

const APP_NAME: &str = "servicedesk";

/// Configuration for the service desk client
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DeskConfig {
    /// Explicit API base URL; when unset it is derived from `origin`
    pub api_url: Option<String>,
    /// Origin the console is served from, e.g. `https://desk.example.com`
    pub origin: Option<String>,
    pub login_path: Option<String>,
    pub session_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub language: Option<String>,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            origin: Some("http://localhost".to_string()),
            login_path: Some("/login".to_string()),
            session_file: None,
            log_level: Some("warn".to_string()),
            language: Some("ua".to_string()),
        }
    }
}

impl DeskConfig {
    /// Loads configuration from a file if it exists, otherwise returns the default config
    pub fn load_from_file(path: &Path) -> DeskResult<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                DeskError::ConfigError(format!("Failed to read config file: {}", e))
            })?;

            let config: Self = toml::from_str(&content).map_err(|e| {
                DeskError::ConfigError(format!("Failed to parse config file: {}", e))
            })?;

            Ok(Self::default().merge(&config))
        } else {
            Ok(Self::default())
        }
    }

    /// Loads the default config file, then applies `.env` and environment overrides
    pub fn load() -> DeskResult<Self> {
        Self::load_from(&get_default_config_file()?)
    }

    /// Like `load`, but reading the given config file
    pub fn load_from(path: &Path) -> DeskResult<Self> {
        dotenvy::dotenv().ok();
        debug!("Loading configuration from {}", path.display());
        Ok(Self::load_from_file(path)?.with_env_overrides())
    }

    /// Saves configuration to a file
    pub fn save_to_file(&self, path: &Path) -> DeskResult<()> {
        let content = toml::to_string(self).map_err(|e| {
            DeskError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DeskError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(path, content).map_err(|e| {
            DeskError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Merges this config with another config, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            api_url: other.api_url.clone().or_else(|| self.api_url.clone()),
            origin: other.origin.clone().or_else(|| self.origin.clone()),
            login_path: other.login_path.clone().or_else(|| self.login_path.clone()),
            session_file: other
                .session_file
                .clone()
                .or_else(|| self.session_file.clone()),
            log_level: other.log_level.clone().or_else(|| self.log_level.clone()),
            language: other.language.clone().or_else(|| self.language.clone()),
        }
    }

    /// Applies `SERVICEDESK_API_URL` and `SERVICEDESK_ORIGIN` on top of this config
    pub fn with_env_overrides(self) -> Self {
        let overrides = Self {
            api_url: non_empty_var(API_URL_ENV),
            origin: non_empty_var(ORIGIN_ENV),
            login_path: None,
            session_file: None,
            log_level: None,
            language: None,
        };
        self.merge(&overrides)
    }

    /// Resolves the API base URL once: explicit value first, then derived from the origin.
    pub fn base_url(&self) -> DeskResult<String> {
        let origin = self.origin.as_deref().unwrap_or("http://localhost");
        resolve_base_url(self.api_url.as_deref(), origin)
    }

    pub fn login_path(&self) -> &str {
        self.login_path.as_deref().unwrap_or("/login")
    }

    /// Where the token pair is persisted between CLI invocations
    pub fn session_path(&self) -> DeskResult<PathBuf> {
        match &self.session_file {
            Some(path) => Ok(path.clone()),
            None => Ok(get_default_config_dir()?.join("session.json")),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Resolves the base URL against which every API path is joined.
///
/// An explicit value is used verbatim (minus a trailing slash). Otherwise the
/// URL is `{protocol}//{hostname}:8000/api/v1`, built from the scheme and host
/// of `origin`; the origin's own port and path are ignored.
pub fn resolve_base_url(explicit: Option<&str>, origin: &str) -> DeskResult<String> {
    if let Some(url) = explicit.map(str::trim).filter(|u| !u.is_empty()) {
        return Ok(url.trim_end_matches('/').to_string());
    }

    let parsed = Url::parse(origin)
        .map_err(|e| DeskError::ConfigError(format!("Invalid origin '{}': {}", origin, e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| DeskError::ConfigError(format!("Origin '{}' has no host", origin)))?;

    Ok(format!(
        "{}://{}:{}{}",
        parsed.scheme(),
        host,
        DERIVED_API_PORT,
        API_PREFIX
    ))
}

/// Helper function to get default config directory
pub fn get_default_config_dir() -> DeskResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        DeskError::ConfigError("Could not determine home directory".to_string())
    })?;

    Ok(home_dir.join(".config").join(APP_NAME))
}

/// Helper function to get default config file path
pub fn get_default_config_file() -> DeskResult<PathBuf> {
    Ok(get_default_config_dir()?.join("config.toml"))
}
