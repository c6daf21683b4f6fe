//! Helpers for resolving settings from environment-style key/value lookups.
//!
//! Every resolver takes a `lookup` closure instead of reading the process
//! environment directly, so callers can pass `|k| std::env::var(k).ok()` in
//! production and a map in tests.

use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use std::str::FromStr;

pub fn parse_log_level(value: &str) -> Option<LevelFilter> {
    match value.to_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Log level from `key`, falling back to `default` when unset or unknown.
pub fn resolve_log_level<F>(lookup: &F, key: &str, default: LevelFilter) -> LevelFilter
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .as_deref()
        .and_then(parse_log_level)
        .unwrap_or(default)
}

/// Log file path from `key`. Empty or `none` disables file logging; an unset
/// key falls back to `default`.
pub fn resolve_log_file<F>(lookup: &F, key: &str, default: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        None => Some(default.to_string()),
    }
}

/// Required, non-empty string setting.
pub fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("{key} environment variable is required"))
}

/// Parsed setting, or `default` when unset. A value that is present but does
/// not parse is an error.
pub fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key}={raw:?} is not a valid value")),
        None => Ok(default),
    }
}

/// Comma-separated list setting, or `default` when unset.
pub fn parse_list_or<F, T>(lookup: &F, key: &str, default: Vec<T>) -> Result<Vec<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<T>()
                .with_context(|| format!("{key}: {part:?} is not a valid list entry"))
        })
        .collect()
}
