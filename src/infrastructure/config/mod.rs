//! Layered configuration and the credential loader.
//!
//! Precedence, lowest first: compiled defaults, `mailsmith.toml`, the raw
//! backend variables (`SUPABASE_URL`, `SUPABASE_SERVICE_ROLE_KEY`,
//! `DATABASE_URL`), then `MAILSMITH_*` overrides with `__` for nesting.

use crate::domain::email::EmailConfig;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::seed_plan::SeedPlan;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "mailsmith.toml";

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub supabase_url: Option<String>,
    pub supabase_service_role_key: Option<String>,
    pub database_url: Option<String>,
    pub seed: SeedPlan,
    pub llm: LLMConfig,
    pub email: EmailConfig,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("supabase_url", &self.supabase_url)
            .field(
                "supabase_service_role_key",
                &self.supabase_service_role_key.as_ref().map(|_| "<redacted>"),
            )
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("seed", &self.seed)
            .field("llm", &self.llm)
            .field("email", &self.email)
            .finish()
    }
}

pub struct ConfigService;

impl ConfigService {
    /// Loads `.env` (if present) and extracts the layered configuration.
    pub fn load(config_path: &Path) -> Result<AppConfig> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env"),
            Err(err) if err.not_found() => debug!("No .env file found"),
            Err(err) => return Err(AppError::ConfigError(format!("Failed to read .env: {}", err))),
        }
        Self::extract(Self::figment(config_path))
    }

    pub fn figment(config_path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(config_path))
            .merge(Env::raw().only(&["NEXT_PUBLIC_SUPABASE_URL"]).map(|_| "supabase_url".into()))
            .merge(Env::raw().only(&[
                "SUPABASE_URL",
                "SUPABASE_SERVICE_ROLE_KEY",
                "DATABASE_URL",
            ]))
            .merge(Env::prefixed("MAILSMITH_").split("__"))
    }

    pub fn extract(figment: Figment) -> Result<AppConfig> {
        Ok(figment.extract()?)
    }
}

/// Endpoint and privileged key for the hosted REST surface.
#[derive(Clone)]
pub struct RestCredentials {
    pub url: Url,
    service_key: String,
}

impl RestCredentials {
    pub fn new(url: Url, service_key: String) -> Self {
        Self { url, service_key }
    }

    pub fn service_key(&self) -> &str {
        &self.service_key
    }
}

impl fmt::Debug for RestCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestCredentials")
            .field("url", &self.url.as_str())
            .field("service_key", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct PgCredentials {
    database_url: String,
}

impl PgCredentials {
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

impl fmt::Debug for PgCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PgCredentials { database_url: <redacted> }")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Rest,
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub enum BackendCredentials {
    Rest(RestCredentials),
    Postgres(PgCredentials),
    Memory,
}

fn required(value: Option<&str>, name: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(AppError::ConfigError(format!(
            "{} is missing or empty",
            name
        ))),
    }
}

impl AppConfig {
    /// Credential loader: fails before any I/O when a required secret is absent.
    pub fn backend_credentials(&self, kind: BackendKind) -> Result<BackendCredentials> {
        match kind {
            BackendKind::Rest => {
                let raw_url = required(self.supabase_url.as_deref(), "SUPABASE_URL")?;
                let service_key = required(
                    self.supabase_service_role_key.as_deref(),
                    "SUPABASE_SERVICE_ROLE_KEY",
                )?;
                let url = Url::parse(&raw_url).map_err(|e| {
                    AppError::ConfigError(format!("SUPABASE_URL is not a valid URL: {}", e))
                })?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(AppError::ConfigError(format!(
                        "SUPABASE_URL must be http(s), got '{}'",
                        url.scheme()
                    )));
                }
                Ok(BackendCredentials::Rest(RestCredentials::new(url, service_key)))
            }
            BackendKind::Postgres => {
                let database_url = required(self.database_url.as_deref(), "DATABASE_URL")?;
                Ok(BackendCredentials::Postgres(PgCredentials { database_url }))
            }
            BackendKind::Memory => Ok(BackendCredentials::Memory),
        }
    }
}
