use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub oracle: OracleConfig,
}

pub const DEFAULT_DATABASE_PATH: &str = "SamplePortfolioDecisionMart.db";
pub const DEFAULT_ORACLE_MODEL: &str = "gemini-flash-latest";
pub const DEFAULT_ORACLE_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 30;

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;
        let static_dir =
            PathBuf::from(env::var("APP_STATIC_DIR").unwrap_or_else(|_| "dist".to_string()));

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let database_path = PathBuf::from(
            env::var("APP_DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string()),
        );

        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let model =
            env::var("APP_ORACLE_MODEL").unwrap_or_else(|_| DEFAULT_ORACLE_MODEL.to_string());
        let endpoint =
            env::var("APP_ORACLE_ENDPOINT").unwrap_or_else(|_| DEFAULT_ORACLE_ENDPOINT.to_string());
        let timeout_secs = match env::var("APP_ORACLE_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout { value: raw })?,
            Err(_) => DEFAULT_ORACLE_TIMEOUT_SECS,
        };

        Ok(Self {
            environment,
            server: ServerConfig {
                host,
                port,
                static_dir,
            },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig { database_path },
            oracle: OracleConfig {
                api_key,
                model,
                endpoint,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Compiled dashboard assets served for non-API routes.
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the SQLite decision mart.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

/// Connection settings for the generative scoring service.
#[derive(Clone)]
pub struct OracleConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must be an IP address or 'localhost'")
            }
            ConfigError::InvalidTimeout { value } => write!(
                f,
                "APP_ORACLE_TIMEOUT_SECS must be a positive number of seconds (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidTimeout { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "PORT",
            "APP_LOG_LEVEL",
            "APP_STATIC_DIR",
            "APP_DATABASE_PATH",
            "GEMINI_API_KEY",
            "APP_ORACLE_MODEL",
            "APP_ORACLE_ENDPOINT",
            "APP_ORACLE_TIMEOUT_SECS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(
            config.storage.database_path,
            PathBuf::from(DEFAULT_DATABASE_PATH)
        );
        assert_eq!(config.oracle.model, DEFAULT_ORACLE_MODEL);
        assert_eq!(config.oracle.timeout, Duration::from_secs(30));
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn falls_back_to_bare_port_variable() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PORT", "8080");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.server.port, 8080);
        reset_env();
    }

    #[test]
    fn rejects_zero_oracle_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ORACLE_TIMEOUT_SECS", "0");
        match AppConfig::load() {
            Err(ConfigError::InvalidTimeout { value }) => assert_eq!(value, "0"),
            other => panic!("expected invalid timeout, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = OracleConfig {
            api_key: Some("secret-key".to_string()),
            model: DEFAULT_ORACLE_MODEL.to_string(),
            endpoint: DEFAULT_ORACLE_ENDPOINT.to_string(),
            timeout: Duration::from_secs(5),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
