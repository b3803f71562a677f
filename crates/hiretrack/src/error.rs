use std::fmt;

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::tracker::TrackerError;

/// Failures that stop the process: startup, serving, or a command-line workflow.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Tracker(TrackerError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Tracker(err) => write!(f, "tracker error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Tracker(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<TrackerError> for AppError {
    fn from(value: TrackerError) -> Self {
        Self::Tracker(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::ValidationError;
    use std::error::Error as _;

    #[test]
    fn display_prefixes_the_failing_layer() {
        let err = AppError::from(ConfigError::InvalidPort);
        assert_eq!(
            err.to_string(),
            "configuration error: APP_PORT must be a valid u16"
        );

        let err = AppError::from(TrackerError::from(ValidationError::Blank { field: "name" }));
        assert_eq!(err.to_string(), "tracker error: name must not be blank");
        assert!(err.source().is_some());
    }
}
