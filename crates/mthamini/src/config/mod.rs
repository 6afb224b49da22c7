use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::guarantor::navigation::{WizardRoute, WizardRoutes};

/// Distinguishes runtime behavior for different stages of the intake client.
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
}

/// Top-level configuration for the intake client and the local stub backend.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub api: ApiConfig,
    pub wizard: WizardRoutes,
    pub stub: ServerConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("MTHAMINI_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url = ApiConfig::normalize_base_url(
            &env::var("MTHAMINI_API_BASE_URL")
                .unwrap_or_else(|_| ApiConfig::DEFAULT_BASE_URL.to_string()),
        )?;
        let timeout_ms = env::var("MTHAMINI_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or(ConfigError::InvalidTimeout)?;

        let defaults = WizardRoutes::default();
        let next = env::var("MTHAMINI_NEXT_ROUTE")
            .map(WizardRoute::new)
            .unwrap_or(defaults.next);
        let previous = env::var("MTHAMINI_PREVIOUS_ROUTE")
            .map(WizardRoute::new)
            .unwrap_or(defaults.previous);

        let host = env::var("MTHAMINI_STUB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("MTHAMINI_STUB_PORT")
            .unwrap_or_else(|_| "4000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("MTHAMINI_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            api: ApiConfig {
                base_url,
                request_timeout: Duration::from_millis(timeout_ms),
            },
            wizard: WizardRoutes { previous, next },
            stub: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Location of the guarantor API and the per-submission deadline.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl ApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:4000";

    /// Validates an absolute http(s) URL and strips trailing slashes so endpoint
    /// paths can be appended verbatim.
    pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::InvalidBaseUrl {
                value: raw.to_string(),
                reason: "value is empty".to_string(),
            });
        }

        let parsed = reqwest::Url::parse(trimmed).map_err(|err| ConfigError::InvalidBaseUrl {
            value: raw.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                value: raw.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(trimmed.to_string())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Settings controlling where the stub backend binds.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidTimeout,
    InvalidBaseUrl { value: String, reason: String },
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "MTHAMINI_STUB_PORT must be a valid u16"),
            ConfigError::InvalidTimeout => write!(
                f,
                "MTHAMINI_REQUEST_TIMEOUT_MS must be a positive number of milliseconds"
            ),
            ConfigError::InvalidBaseUrl { value, reason } => {
                write!(f, "API base URL '{}' is invalid: {}", value, reason)
            }
            ConfigError::InvalidHost { .. } => {
                write!(f, "MTHAMINI_STUB_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidBaseUrl { .. } => None,
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
            "MTHAMINI_ENV",
            "MTHAMINI_API_BASE_URL",
            "MTHAMINI_REQUEST_TIMEOUT_MS",
            "MTHAMINI_NEXT_ROUTE",
            "MTHAMINI_PREVIOUS_ROUTE",
            "MTHAMINI_STUB_HOST",
            "MTHAMINI_STUB_PORT",
            "MTHAMINI_LOG_LEVEL",
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
        assert_eq!(config.api.base_url, "http://127.0.0.1:4000");
        assert_eq!(config.api.request_timeout, Duration::from_secs(30));
        assert_eq!(config.wizard.next.as_str(), "/vehicle");
        assert_eq!(config.wizard.previous.as_str(), "/personal");
        assert_eq!(config.stub.port, 4000);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn overrides_are_read_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MTHAMINI_ENV", "prod");
        env::set_var("MTHAMINI_API_BASE_URL", "https://intake.example.org/");
        env::set_var("MTHAMINI_REQUEST_TIMEOUT_MS", "2500");
        env::set_var("MTHAMINI_NEXT_ROUTE", "/review");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.api.base_url, "https://intake.example.org");
        assert_eq!(config.api.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.wizard.next.as_str(), "/review");
        reset_env();
    }

    #[test]
    fn rejects_zero_timeout_and_bad_urls() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MTHAMINI_REQUEST_TIMEOUT_MS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidTimeout)
        ));
        reset_env();

        assert!(ApiConfig::normalize_base_url("ftp://files.example.org").is_err());
        assert!(ApiConfig::normalize_base_url("   ").is_err());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MTHAMINI_STUB_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.stub.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 4000));
        reset_env();
    }
}
