use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::NaiveTime;

pub const DEFAULT_REMINDER_TIME: &str = "09:00";
pub const DEFAULT_MAIL_FROM: &str = "noreply@hiretrack.local";

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
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub reminders: ReminderConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            reminders: ReminderConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
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

/// When and from whom the daily reminder goes out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderConfig {
    pub enabled: bool,
    /// Local wall-clock time of the daily run.
    pub send_at: NaiveTime,
    pub sender: String,
}

impl ReminderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let enabled = match env::var("APP_REMINDERS_ENABLED") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "APP_REMINDERS_ENABLED",
                value: raw,
            })?,
            Err(_) => true,
        };

        let raw_time =
            env::var("APP_REMINDER_TIME").unwrap_or_else(|_| DEFAULT_REMINDER_TIME.to_string());
        let send_at = NaiveTime::parse_from_str(raw_time.trim(), "%H:%M")
            .map_err(|source| ConfigError::InvalidReminderTime {
                value: raw_time.clone(),
                source,
            })?;

        let sender = env::var("APP_MAIL_FROM")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string());

        Ok(Self {
            enabled,
            send_at,
            sender,
        })
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            send_at: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            sender: DEFAULT_MAIL_FROM.to_string(),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidFlag {
        name: &'static str,
        value: String,
    },
    InvalidReminderTime {
        value: String,
        source: chrono::ParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false (got '{value}')")
            }
            ConfigError::InvalidReminderTime { value, .. } => {
                write!(f, "APP_REMINDER_TIME must be HH:MM (got '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidFlag { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidReminderTime { source, .. } => Some(source),
        }
    }
}
