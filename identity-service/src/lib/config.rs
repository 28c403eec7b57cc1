use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub email: EmailConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    /// Adds the `Secure` attribute to the refresh cookie. Off in local
    /// development where the server runs plain HTTP.
    pub cookie_secure: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_secret: String,
    pub refresh_ttl_days: i64,
}

/// Email delivery settings.
///
/// `mode` selects the outbound adapter: "smtp" sends real mail, anything
/// else logs messages instead of delivering them.
#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub mode: String,
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
    /// Frontend base URL used to build verification and reset links.
    pub client_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub window_seconds: u64,
    pub max_attempts: u32,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}
