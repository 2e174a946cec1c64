use std::path::PathBuf;
use std::time::Duration;

use humantime::parse_duration;

use crate::error::ConfigError;

pub(super) fn env_string(key: &'static str) -> std::result::Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(ConfigError::InvalidField {
            field: key,
            message: err.to_string(),
        }),
    }
}

pub(super) fn env_parse<T>(key: &'static str) -> std::result::Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)?
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|err| ConfigError::InvalidField {
                    field: key,
                    message: err.to_string(),
                })
        })
        .transpose()
}

/// Accepts `1/true/yes/y` and `0/false/no/n`, case-insensitive.
pub(super) fn env_bool(key: &'static str) -> std::result::Result<Option<bool>, ConfigError> {
    env_string(key)?
        .map(|value| {
            parse_bool(&value).ok_or_else(|| ConfigError::InvalidField {
                field: key,
                message: format!("expected a boolean, got {value:?}"),
            })
        })
        .transpose()
}

pub(super) fn env_path(key: &'static str) -> std::result::Result<Option<PathBuf>, ConfigError> {
    Ok(env_string(key)?.map(PathBuf::from))
}

pub(super) fn env_duration(
    key: &'static str,
) -> std::result::Result<Option<Duration>, ConfigError> {
    env_string(key)?
        .map(|value| {
            parse_duration(value.trim()).map_err(|err| ConfigError::InvalidField {
                field: key,
                message: err.to_string(),
            })
        })
        .transpose()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
