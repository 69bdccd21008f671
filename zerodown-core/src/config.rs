use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Default action text shown when a ticket carries no recommendation.
pub const DEFAULT_FALLBACK_ACTION: &str = "Manual inspection required.";

#[derive(Debug, Deserialize, Clone)]
pub struct ZeroDownConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// Remote chat endpoint settings. `api_url` is the base URL; requests go to
/// `{api_url}/chat`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ChatConfig {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub fallback_action: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            fallback_action: DEFAULT_FALLBACK_ACTION.to_string(),
        }
    }
}

impl ZeroDownConfig {
    /// Load from an optional TOML file, then apply `ZERODOWN__SECTION__KEY`
    /// environment overrides.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(env_source())
            .build()?;
        s.try_deserialize()
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?;
        s.try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("ZERODOWN")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = ZeroDownConfig::from_toml(
            r#"
            [database]
            url = "postgresql://localhost/zerodown"
            "#,
        )
        .expect("minimal config should parse");

        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.service.log_level, "info");
        assert!(config.chat.api_url.is_none());
        assert!(config.chat.timeout_secs.is_none());
        assert_eq!(config.dashboard.fallback_action, DEFAULT_FALLBACK_ACTION);
    }

    #[test]
    fn test_full_config_parses_every_section() {
        let config = ZeroDownConfig::from_toml(
            r#"
            [service]
            log_level = "debug"

            [database]
            url = "postgresql://db/zerodown"
            max_connections = 12

            [chat]
            api_url = "http://chat.internal:8000"
            timeout_secs = 20

            [http]
            host = "0.0.0.0"
            port = 8080

            [dashboard]
            fallback_action = "Call the shift lead."
            "#,
        )
        .expect("full config should parse");

        assert_eq!(config.service.log_level, "debug");
        assert_eq!(config.database.max_connections, 12);
        assert_eq!(config.chat.api_url.as_deref(), Some("http://chat.internal:8000"));
        assert_eq!(config.chat.timeout_secs, Some(20));
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.dashboard.fallback_action, "Call the shift lead.");
    }

    #[test]
    fn test_missing_database_url_is_an_error() {
        let result = ZeroDownConfig::from_toml(
            r#"
            [http]
            port = 8080
            "#,
        );
        assert!(result.is_err(), "database.url is required");
    }
}
