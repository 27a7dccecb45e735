use std::env;
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    /// Email that is always promoted to super_admin, even with a populated
    /// registry.
    pub owner_email: String,
    pub event_buffer_size: usize,
    pub complete_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            owner_email: env::var("OWNER_EMAIL")
                .unwrap_or_else(|_| "admin@gmail.com".to_string())
                .trim()
                .to_ascii_lowercase(),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 64)?,
            complete_timeout: Duration::from_millis(parse_or_default(
                "COMPLETE_TIMEOUT_MS",
                5_000,
            )?),
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
