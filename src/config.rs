use std::env;
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub log_format: LogFormat,
    pub registration_queue_size: usize,
    pub notification_buffer_size: usize,
    pub routing_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("compact") => LogFormat::Compact,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "invalid LOG_FORMAT: {other}, expected compact or json"
                )));
            }
        };

        Ok(Self {
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format,
            registration_queue_size: positive(
                "REGISTRATION_QUEUE_SIZE",
                parse_or_default(&lookup, "REGISTRATION_QUEUE_SIZE", 1024)?,
            )?,
            notification_buffer_size: positive(
                "NOTIFICATION_BUFFER_SIZE",
                parse_or_default(&lookup, "NOTIFICATION_BUFFER_SIZE", 1024)?,
            )?,
            routing_timeout_ms: parse_or_default(&lookup, "ROUTING_TIMEOUT_MS", 5000)?,
        })
    }

    pub fn routing_timeout(&self) -> Duration {
        Duration::from_millis(self.routing_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            registration_queue_size: 1024,
            notification_buffer_size: 1024,
            routing_timeout_ms: 5000,
        }
    }
}

fn parse_or_default<T, F>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Config(format!("invalid {key}: {err}"))),
        None => Ok(default),
    }
}

fn positive(key: &str, value: usize) -> Result<usize, AppError> {
    if value == 0 {
        return Err(AppError::Config(format!("{key} must be > 0")));
    }
    Ok(value)
}
