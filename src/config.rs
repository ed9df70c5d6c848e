//! Configuration loading and constants.
//!
//! Configuration comes from three layers, highest priority first: command line
//! flags and their bound environment variables (`PORT`, `APP_ENV`, then
//! `NODE_ENV` for the environment label), an optional TOML file, and the
//! built-in defaults below. `AppConfig` is resolved once at startup and never
//! mutated afterwards.

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// =============================================================================
// HTTP
// =============================================================================

/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listening port
pub const DEFAULT_PORT: u16 = 3000;

/// Probe results must never be served from an intermediate cache
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

/// Response header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// =============================================================================
// Deployment environment
// =============================================================================

/// Environment label used when none is configured
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Primary environment variable for the environment label
pub const ENVIRONMENT_VAR: &str = "APP_ENV";

/// Fallback environment variable, honoured when `APP_ENV` is unset
pub const LEGACY_ENVIRONMENT_VAR: &str = "NODE_ENV";

// =============================================================================
// Unit conversion
// =============================================================================

/// Bytes in a megabyte (binary, 1024 * 1024)
pub const BYTES_PER_MEGABYTE: u64 = 1_048_576;

/// Bytes in a gigabyte (binary, 1024 * 1024 * 1024)
pub const BYTES_PER_GIGABYTE: u64 = 1_073_741_824;

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Configuration file read when `--config` is not given; optional
pub const DEFAULT_CONFIG_PATH: &str = "config/vitals.toml";

/// Default log filter when neither `--log-level` nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "vitals=info";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listener configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Deployment environment label, reported verbatim by `/` and `/health`
    #[serde(default = "AppConfig::default_environment")]
    pub environment: String,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_PORT
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::Validation(format!(
                "unknown log format '{}', expected 'text' or 'json'",
                other
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

/// Values supplied on the command line or through bound environment variables.
///
/// Every field left as `None` falls through to the file or the default.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub environment: Option<String>,
    pub log_format: Option<LogFormat>,
}

impl ConfigOverrides {
    /// Pick the environment label from `--environment`/`APP_ENV` and `NODE_ENV`.
    ///
    /// The first non-empty value wins; `None` leaves the file or default in place.
    pub fn environment_from(
        app_env: Option<String>,
        node_env: Option<String>,
    ) -> Option<String> {
        app_env
            .filter(|e| !e.is_empty())
            .or_else(|| node_env.filter(|e| !e.is_empty()))
    }
}

impl AppConfig {
    fn default_environment() -> String {
        DEFAULT_ENVIRONMENT.to_string()
    }

    /// Parse a configuration file. The file must exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the file layer.
    ///
    /// An explicitly requested file must exist. Without one, the default path is
    /// used if present and the built-in defaults otherwise.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => Self::load(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default_resolved()),
        }
    }

    /// Built-in defaults with no file involved.
    pub fn default_resolved() -> Self {
        Self {
            http: HttpServerConfig::default(),
            environment: Self::default_environment(),
            logging: LoggingConfig::default(),
        }
    }

    /// Apply the command line / environment layer on top of this configuration.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(host) = overrides.host {
            self.http.host = host;
        }
        if let Some(port) = overrides.port {
            self.http.port = port;
        }
        // An empty label counts as unset
        if let Some(environment) = overrides.environment.filter(|e| !e.is_empty()) {
            self.environment = environment;
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.host.trim().is_empty() {
            return Err(ConfigError::Validation("http.host must not be empty".to_string()));
        }
        if self.environment.is_empty() {
            return Err(ConfigError::Validation("environment must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default_resolved();
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.environment, "development");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.http.port, DEFAULT_PORT);
        assert_eq!(config.environment, DEFAULT_ENVIRONMENT);
    }

    #[test]
    fn test_parse_full_file() {
        let config = AppConfig::parse(
            r#"
            environment = "production"

            [http]
            host = "127.0.0.1"
            port = 8080

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.environment, "production");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_rejects_unknown_log_format() {
        let err = AppConfig::parse("[logging]\nformat = \"xml\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_out_of_range_port() {
        let err = AppConfig::parse("[http]\nport = 70000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = AppConfig::parse("environment = \"staging\"\n[http]\nport = 8080\n")
            .unwrap()
            .with_overrides(ConfigOverrides {
                port: Some(9090),
                environment: Some("production".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.environment, "production");
        assert_eq!(config.http.host, DEFAULT_HOST);
    }

    #[test]
    fn test_empty_environment_override_falls_back() {
        let config = AppConfig::default_resolved()
            .with_overrides(ConfigOverrides {
                environment: Some(String::new()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_app_env_wins_over_node_env() {
        let environment = ConfigOverrides::environment_from(
            Some("staging".to_string()),
            Some("production".to_string()),
        );
        assert_eq!(environment.as_deref(), Some("staging"));
    }

    #[test]
    fn test_node_env_used_when_app_env_unset() {
        assert_eq!(
            ConfigOverrides::environment_from(None, Some("production".to_string())).as_deref(),
            Some("production")
        );
        assert_eq!(
            ConfigOverrides::environment_from(Some(String::new()), Some("production".to_string()))
                .as_deref(),
            Some("production")
        );
    }

    #[test]
    fn test_empty_node_env_falls_back_to_default() {
        let environment = ConfigOverrides::environment_from(None, Some(String::new()));
        assert_eq!(environment, None);
        let config = AppConfig::default_resolved()
            .with_overrides(ConfigOverrides {
                environment,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.environment, DEFAULT_ENVIRONMENT);
    }

    #[test]
    fn test_node_env_beats_file() {
        let config = AppConfig::parse("environment = \"staging\"\n")
            .unwrap()
            .with_overrides(ConfigOverrides {
                environment: ConfigOverrides::environment_from(
                    None,
                    Some("production".to_string()),
                ),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.environment, "production");
    }

    #[test]
    fn test_default_log_filter_targets_crate_only() {
        let directives: Vec<&str> = DEFAULT_LOG_FILTER.split(',').collect();
        assert_eq!(directives, ["vitals=info"]);
        tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();
    }

    #[test]
    fn test_empty_environment_in_file_rejected() {
        let err = AppConfig::parse("environment = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = 4000").unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.http.port, 4000);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = AppConfig::load_or_default(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("yaml".parse::<LogFormat>().is_err());
    }
}
