//! Error types for configuration loading.

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable was not set.
    #[error("missing environment configuration")]
    MissingEnv {
        /// Name of the missing environment variable.
        name: &'static str,
    },
    /// An environment variable was set but contained an invalid value.
    #[error("invalid configuration value")]
    InvalidValue {
        /// Name of the offending environment variable.
        name: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when it is safe to report.
        value: Option<String>,
    },
    /// A URL setting failed to parse.
    #[error("invalid configuration url")]
    InvalidUrl {
        /// Name of the offending environment variable.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Source URL parse error.
        source: url::ParseError,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
