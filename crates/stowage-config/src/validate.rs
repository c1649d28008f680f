//! Parsing helpers for raw environment values.

use std::time::Duration;

use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::model::LogFormatSetting;

/// Trim a raw value and treat blank strings as unset.
#[must_use]
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Treat blank strings as unset but otherwise keep the raw value untouched.
///
/// Credentials and database names are handed to the dump tool as given;
/// surrounding whitespace may be significant.
#[must_use]
pub fn verbatim(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

/// Parse a positive number of seconds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when the value is not an integer or is zero.
pub fn parse_seconds(name: &'static str, value: &str) -> ConfigResult<Duration> {
    let seconds = value
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue {
            name,
            reason: "not_an_integer",
            value: Some(value.to_string()),
        })?;
    if seconds == 0 {
        return Err(ConfigError::InvalidValue {
            name,
            reason: "zero",
            value: Some(value.to_string()),
        });
    }
    Ok(Duration::from_secs(seconds))
}

/// Parse an absolute base URL, dropping any trailing slash from the path.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] when the value cannot be parsed and
/// [`ConfigError::InvalidValue`] when it cannot serve as a base URL.
pub fn parse_base_url(name: &'static str, value: &str) -> ConfigResult<Url> {
    let mut url = Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidValue {
            name,
            reason: "not_a_base_url",
            value: Some(value.to_string()),
        });
    }
    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);
    Ok(url)
}

/// Parse a log format name.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for anything other than `json` or `pretty`.
pub fn parse_log_format(name: &'static str, value: &str) -> ConfigResult<LogFormatSetting> {
    match value.to_ascii_lowercase().as_str() {
        "json" => Ok(LogFormatSetting::Json),
        "pretty" => Ok(LogFormatSetting::Pretty),
        _ => Err(ConfigError::InvalidValue {
            name,
            reason: "unknown_log_format",
            value: Some(value.to_string()),
        }),
    }
}
