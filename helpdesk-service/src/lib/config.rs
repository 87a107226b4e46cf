use std::env;

use auth::TokenConfig;
use auth::TokenPolicy;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Application configuration for helpdesk-service.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Token signing and session lifetime settings.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_ttl_minutes")]
    pub access_ttl_minutes: i64,
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
    /// Refresh tokens with less than this much lifetime left are rotated
    #[serde(default = "default_rotation_threshold_minutes")]
    pub rotation_threshold_minutes: i64,
    #[serde(default)]
    pub leeway_seconds: i64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_ttl_minutes() -> i64 {
    20
}

fn default_refresh_ttl_days() -> i64 {
    7
}

fn default_rotation_threshold_minutes() -> i64 {
    60
}

/// Convert a configured count into a positive duration.
fn positive_duration(
    key: &str,
    value: i64,
    convert: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    match convert(value) {
        Some(duration) if value > 0 => Ok(duration),
        _ => Err(ConfigError::Message(format!(
            "jwt.{} must be a positive value in range, got {}",
            key, value
        ))),
    }
}

impl JwtConfig {
    /// Codec configuration derived from these settings.
    ///
    /// # Errors
    /// * `ConfigError::Message` - A lifetime is zero, negative or out of range
    pub fn token_config(&self) -> Result<TokenConfig, ConfigError> {
        if self.leeway_seconds < 0 {
            return Err(ConfigError::Message(format!(
                "jwt.leeway_seconds must not be negative, got {}",
                self.leeway_seconds
            )));
        }

        Ok(TokenConfig {
            secret: self.secret.clone(),
            policy: TokenPolicy {
                access_ttl: positive_duration(
                    "access_ttl_minutes",
                    self.access_ttl_minutes,
                    Duration::try_minutes,
                )?,
                refresh_ttl: positive_duration(
                    "refresh_ttl_days",
                    self.refresh_ttl_days,
                    Duration::try_days,
                )?,
                leeway_seconds: self.leeway_seconds,
            },
        })
    }

    /// # Errors
    /// * `ConfigError::Message` - Threshold is zero, negative or out of range
    pub fn rotation_threshold(&self) -> Result<Duration, ConfigError> {
        positive_duration(
            "rotation_threshold_minutes",
            self.rotation_threshold_minutes,
            Duration::try_minutes,
        )
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.jwt.token_config()?;
        config.jwt.rotation_threshold()?;

        Ok(config)
    }
}
