//! Configuration management for the library gateway

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Hosted REST endpoint the gateway proxies to
#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    /// Project URL; `/rest/v1/<table>` is appended per request
    pub url: String,
    pub api_key: String,
    /// Bearer token sent with each request, defaults to `api_key`
    pub access_token: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_minutes: i64,
    /// Admin account created at startup when missing
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkflowConfig {
    /// Attempts at flipping a copy's availability before compensating
    pub flip_attempts: u32,
    /// Borrow duration when the member record does not set one
    pub default_borrow_days: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix LIBRARY_)
            .add_source(
                Environment::with_prefix("LIBRARY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("remote.url", env::var("REMOTE_URL").ok())?
            .set_override_option("remote.api_key", env::var("REMOTE_API_KEY").ok())?
            .set_override_option("remote.access_token", env::var("REMOTE_ACCESS_TOKEN").ok())?
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            access_token: None,
            timeout_seconds: 30,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-this-secret-in-production".to_string(),
            jwt_expiration_minutes: 30,
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 300 }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            flip_attempts: 2,
            default_borrow_days: 14,
        }
    }
}
