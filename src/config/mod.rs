use config::{Config, ConfigError, Environment, File, Map};
use serde::{Deserialize, Serialize};

use crate::logging::LogGate;

pub const DEFAULT_PORT: u16 = 3001;
pub const BIND_ALL_INTERFACES: &str = "0.0.0.0";
pub const DEV_DISPLAY_HOST: &str = "localhost";
/// Used in production when the platform did not inject an external URL.
pub const PLACEHOLDER_EXTERNAL_URL: &str = "https://your-app.onrender.com";
pub const DEFAULT_JWT_EXPIRE_HOURS: i64 = 24;

/// Variables exactly as they arrive from the environment (keys lower-cased).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEnv {
    node_env: Option<String>,
    debug: Option<String>,
    jwt_secret: Option<String>,
    jwt_expire_hours: Option<String>,
    server_host: Option<String>,
    port: Option<String>,
    render_external_url: Option<String>,
    server_url: Option<String>,
    google_places_api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Production,
    Development,
}

impl RuntimeEnv {
    fn from_node_env(value: Option<&str>) -> Self {
        match value {
            Some("production") => RuntimeEnv::Production,
            _ => RuntimeEnv::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeEnv::Production => "production",
            RuntimeEnv::Development => "development",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// `SERVER_HOST`; doubles as the display host for development URLs
    pub host: Option<String>,
    pub port: Option<u16>,
    pub render_external_url: Option<String>,
    pub server_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Option<String>,
    pub expire_hours: i64,
}

#[derive(Debug, Clone, Default)]
pub struct PlacesConfig {
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: RuntimeEnv,
    pub debug: bool,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub places: PlacesConfig,
}

/// Where the server binds and how the outside world reaches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
    pub url: String,
}

impl AppConfig {
    /// Load from `.env`, an optional `config.toml`, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        Self::from_raw(config.try_deserialize()?)
    }

    /// Build from an explicit set of variables instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source: Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let config = Config::builder()
            .add_source(Environment::default().ignore_empty(true).source(Some(source)))
            .build()?;

        Self::from_raw(config.try_deserialize()?)
    }

    fn from_raw(raw: RawEnv) -> Result<Self, ConfigError> {
        let port = non_empty(raw.port)
            .map(|p| {
                p.trim().parse::<u16>().map_err(|e| {
                    ConfigError::Message(format!("PORT must be an integer, got {:?}: {}", p, e))
                })
            })
            .transpose()?;

        let expire_hours = non_empty(raw.jwt_expire_hours)
            .map(|h| {
                h.trim().parse::<i64>().map_err(|e| {
                    ConfigError::Message(format!(
                        "JWT_EXPIRE_HOURS must be an integer, got {:?}: {}",
                        h, e
                    ))
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_JWT_EXPIRE_HOURS);

        Ok(Self {
            environment: RuntimeEnv::from_node_env(raw.node_env.as_deref()),
            debug: raw.debug.as_deref() == Some("true"),
            server: ServerConfig {
                host: non_empty(raw.server_host),
                port,
                render_external_url: non_empty(raw.render_external_url),
                server_url: non_empty(raw.server_url),
            },
            jwt: JwtConfig {
                secret: non_empty(raw.jwt_secret),
                expire_hours,
            },
            places: PlacesConfig {
                api_key: non_empty(raw.google_places_api_key),
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == RuntimeEnv::Production
    }

    pub fn log_gate(&self) -> LogGate {
        LogGate::new(self.is_production(), self.debug)
    }

    /// Resolve bind host, port and public base URL. Not cached.
    pub fn server_address(&self) -> ServerAddress {
        let host = self
            .server
            .host
            .clone()
            .unwrap_or_else(|| BIND_ALL_INTERFACES.to_string());
        let port = self.server.port.unwrap_or(DEFAULT_PORT);

        let url = match self.environment {
            RuntimeEnv::Production => self
                .server
                .render_external_url
                .clone()
                .or_else(|| self.server.server_url.clone())
                .unwrap_or_else(|| PLACEHOLDER_EXTERNAL_URL.to_string()),
            RuntimeEnv::Development => format!(
                "http://{}:{}",
                self.server.host.as_deref().unwrap_or(DEV_DISPLAY_HOST),
                port
            ),
        };

        ServerAddress { host, port, url }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: RuntimeEnv::Development,
            debug: false,
            server: ServerConfig::default(),
            jwt: JwtConfig {
                secret: None,
                expire_hours: DEFAULT_JWT_EXPIRE_HOURS,
            },
            places: PlacesConfig::default(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_vars() -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    #[test]
    fn test_defaults_resolve_to_localhost_url() {
        let config = AppConfig::from_vars(no_vars()).unwrap();
        let address = config.server_address();

        assert_eq!(address.host, "0.0.0.0");
        assert_eq!(address.port, 3001);
        assert_eq!(address.url, "http://localhost:3001");
    }

    #[test]
    fn test_port_override_without_host() {
        let config = AppConfig::from_vars([("PORT", "5000")]).unwrap();
        let address = config.server_address();

        assert_eq!(address.port, 5000);
        assert_eq!(address.host, BIND_ALL_INTERFACES);
        assert_eq!(address.url, "http://localhost:5000");
    }

    #[test]
    fn test_server_host_used_for_bind_and_dev_url() {
        let config =
            AppConfig::from_vars([("SERVER_HOST", "192.168.1.20"), ("PORT", "8080")]).unwrap();
        let address = config.server_address();

        assert_eq!(address.host, "192.168.1.20");
        assert_eq!(address.url, "http://192.168.1.20:8080");
    }

    #[test]
    fn test_production_url_precedence() {
        let both = AppConfig::from_vars([
            ("NODE_ENV", "production"),
            ("RENDER_EXTERNAL_URL", "https://civic.onrender.com"),
            ("SERVER_URL", "https://api.civic.example"),
        ])
        .unwrap();
        assert_eq!(both.server_address().url, "https://civic.onrender.com");

        let server_url_only = AppConfig::from_vars([
            ("NODE_ENV", "production"),
            ("SERVER_URL", "https://api.civic.example"),
        ])
        .unwrap();
        assert_eq!(server_url_only.server_address().url, "https://api.civic.example");

        let neither = AppConfig::from_vars([("NODE_ENV", "production")]).unwrap();
        assert_eq!(neither.server_address().url, PLACEHOLDER_EXTERNAL_URL);
    }

    #[test]
    fn test_production_ignores_server_host_for_url() {
        let config = AppConfig::from_vars([
            ("NODE_ENV", "production"),
            ("SERVER_HOST", "10.0.0.5"),
            ("PORT", "10000"),
        ])
        .unwrap();
        let address = config.server_address();

        assert_eq!(address.host, "10.0.0.5");
        assert_eq!(address.port, 10000);
        assert_eq!(address.url, PLACEHOLDER_EXTERNAL_URL);
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = AppConfig::from_vars([("SERVER_HOST", ""), ("JWT_SECRET", "")]).unwrap();

        assert_eq!(config.server_address().host, BIND_ALL_INTERFACES);
        assert!(config.jwt.secret.is_none());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = AppConfig::from_vars([("PORT", "not-a-port")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_flags() {
        let config = AppConfig::from_vars([
            ("NODE_ENV", "staging"),
            ("DEBUG", "true"),
            ("JWT_EXPIRE_HOURS", "12"),
        ])
        .unwrap();

        assert!(!config.is_production());
        assert!(config.debug);
        assert_eq!(config.jwt.expire_hours, 12);

        let loose_debug = AppConfig::from_vars([("DEBUG", "1")]).unwrap();
        assert!(!loose_debug.debug);
    }
}
