//! Startup configuration.
//!
//! Process settings come from environment variables ([`ServerConfig`]); the
//! identity settings come from a JSON document ([`IdentityConfig`]) whose
//! path is itself an environment variable. Both are validated once at startup.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use gatehouse_core::email_token::{life_span_from_hours, TokenKind};
use gatehouse_core::permissions::PermissionTable;
use gatehouse_core::preferences::OptionGroup;
use serde::Deserialize;

use crate::auth::jwt::{JwtConfig, DEFAULT_SESSION_EXPIRY_HOURS};
use crate::auth::password::DEFAULT_COST;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("token_password must be at least 60 characters, got {0}")]
    SecretTooShort(usize),

    #[error("tokenLifeSpan must be a positive number of hours")]
    NonPositiveLifeSpan,

    #[error("tokenLifeSpan must be at most 87600 hours, got {0}")]
    LifeSpanTooLong(f64),
}

/// Longest accepted `tokenLifeSpan`, in hours (ten years).
pub const MAX_TOKEN_LIFE_SPAN_HOURS: f64 = 87_600.0;

// ---------------------------------------------------------------------------
// Identity document
// ---------------------------------------------------------------------------

/// Template file and subject line for one kind of token e-mail.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MailTemplateConfig {
    pub template: String,
    pub subject: String,
}

/// The JSON identity document. Unknown keys are ignored.
#[derive(Clone, Deserialize)]
pub struct IdentityConfig {
    /// Session signing secret.
    pub token_password: String,
    /// Validity window of e-mail tokens, in hours.
    #[serde(rename = "tokenLifeSpan")]
    pub token_life_span: f64,
    pub password_reset: MailTemplateConfig,
    pub user_activation: MailTemplateConfig,
    pub one_time_password: MailTemplateConfig,
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("token_password", &"<redacted>")
            .field("token_life_span", &self.token_life_span)
            .field("password_reset", &self.password_reset)
            .field("user_activation", &self.user_activation)
            .field("one_time_password", &self.one_time_password)
            .finish()
    }
}

impl IdentityConfig {
    pub fn from_json(document: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(document)
    }

    /// Read, parse and validate the document at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let document = read_file(path)?;
        let config = Self::from_json(&document).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.token_life_span.is_finite() || self.token_life_span <= 0.0 {
            return Err(ConfigError::NonPositiveLifeSpan);
        }
        if self.token_life_span > MAX_TOKEN_LIFE_SPAN_HOURS {
            return Err(ConfigError::LifeSpanTooLong(self.token_life_span));
        }
        Ok(())
    }

    pub fn life_span(&self) -> chrono::Duration {
        life_span_from_hours(self.token_life_span)
    }

    pub fn template_for(&self, kind: TokenKind) -> &MailTemplateConfig {
        match kind {
            TokenKind::Activation => &self.user_activation,
            TokenKind::Reset => &self.password_reset,
            TokenKind::OneTimeLogin => &self.one_time_password,
        }
    }
}

// ---------------------------------------------------------------------------
// Server configuration
// ---------------------------------------------------------------------------

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: String,
    /// Permission table document.
    pub roles_file: PathBuf,
    /// Preference option schema; `None` means no declared options.
    pub preferences_schema: Option<PathBuf>,
    /// How often expired e-mail tokens are purged.
    pub token_retention_interval_secs: u64,
    /// bcrypt cost for new hashes.
    pub password_cost: u32,
    /// Log token e-mails instead of sending them.
    pub mail_log_only: bool,
    pub identity: IdentityConfig,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                    |
    /// |----------------------------------|----------------------------|
    /// | `HOST`                           | `0.0.0.0`                  |
    /// | `PORT`                           | `3000`                     |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                       |
    /// | `DATABASE_URL`                   | required                   |
    /// | `IDENTITY_CONFIG`                | `config.json`              |
    /// | `ROLES_FILE`                     | `roles.json`               |
    /// | `PREFERENCES_SCHEMA`             | unset                      |
    /// | `TOKEN_RETENTION_INTERVAL_SECS`  | `3600`                     |
    /// | `SESSION_EXPIRY_HOURS`           | `24`                       |
    /// | `BCRYPT_COST`                    | `12`                       |
    /// | `MAIL_LOG_ONLY`                  | `false`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000)?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30)?;
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let identity_path: PathBuf = env_or("IDENTITY_CONFIG", PathBuf::from("config.json"))?;
        let identity = IdentityConfig::load(&identity_path)?;

        let session_expiry_hours: i64 =
            env_or("SESSION_EXPIRY_HOURS", DEFAULT_SESSION_EXPIRY_HOURS)?;
        let jwt = JwtConfig::new(identity.token_password.clone(), session_expiry_hours)?;

        let token_retention_interval_secs = non_zero(
            "TOKEN_RETENTION_INTERVAL_SECS",
            env_or("TOKEN_RETENTION_INTERVAL_SECS", 3600)?,
        )?;

        let password_cost: u32 = env_or("BCRYPT_COST", DEFAULT_COST)?;
        if !(4..=31).contains(&password_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                message: format!("{password_cost} is outside 4..=31"),
            });
        }

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            roles_file: env_or("ROLES_FILE", PathBuf::from("roles.json"))?,
            preferences_schema: std::env::var("PREFERENCES_SCHEMA").ok().map(PathBuf::from),
            token_retention_interval_secs,
            password_cost,
            mail_log_only: env_or("MAIL_LOG_ONLY", false)?,
            identity,
            jwt,
        })
    }

    pub fn load_permission_table(&self) -> Result<PermissionTable, ConfigError> {
        let document = read_file(&self.roles_file)?;
        PermissionTable::from_json(&document).map_err(|source| ConfigError::Parse {
            path: self.roles_file.display().to_string(),
            source,
        })
    }

    pub fn load_option_schema(&self) -> Result<OptionGroup, ConfigError> {
        let Some(path) = &self.preferences_schema else {
            return Ok(OptionGroup::default());
        };
        let document = read_file(path)?;
        OptionGroup::from_json(&document).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

fn env_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn non_zero(key: &'static str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            message: "must be at least 1".into(),
        });
    }
    Ok(value)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })
}
