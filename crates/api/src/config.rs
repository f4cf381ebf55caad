//! Process configuration from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `PORT` | `5000` |
//! | `JWT_SECRET` | `dev-secret` (warns) |
//! | `SESSION_TTL_MINUTES` | `1440` |
//! | `DATABASE_URL` | unset: in-memory store |
//! | `DATABASE_MAX_CONNECTIONS` | `10` |
//! | `CORS_ORIGIN` | `http://localhost:5173` |
//! | `CLASSROLL_UTC_OFFSET_MINUTES` | server's local offset |
//!
//! Log output is configured separately by `classroll_observability`
//! (`RUST_LOG`, `CLASSROLL_LOG_FORMAT`).

use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

use classroll_core::DayBoundary;

const DEFAULT_PORT: u16 = 5000;
const DEV_JWT_SECRET: &str = "dev-secret";
const DEFAULT_SESSION_TTL_MINUTES: i64 = 24 * 60;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{name} is invalid: {reason}")]
pub struct ConfigError {
    pub name: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
    pub session_ttl: Duration,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub cors_origin: String,
    pub day_boundary: DayBoundary,
}

impl Config {
    /// Read the process environment. `main` loads `.env` beforehand.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let session_ttl_minutes: i64 = parse_or(&get, "SESSION_TTL_MINUTES", DEFAULT_SESSION_TTL_MINUTES)?;
        if session_ttl_minutes <= 0 {
            return Err(ConfigError {
                name: "SESSION_TTL_MINUTES",
                reason: "must be positive".to_string(),
            });
        }

        let database_max_connections = parse_or(&get, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if database_max_connections == 0 {
            return Err(ConfigError {
                name: "DATABASE_MAX_CONNECTIONS",
                reason: "must be at least 1".to_string(),
            });
        }

        let day_boundary = match get("CLASSROLL_UTC_OFFSET_MINUTES") {
            Some(raw) => {
                let minutes: i32 = raw.parse().map_err(|e| ConfigError {
                    name: "CLASSROLL_UTC_OFFSET_MINUTES",
                    reason: format!("{e}"),
                })?;
                DayBoundary::from_offset_minutes(minutes).map_err(|e| ConfigError {
                    name: "CLASSROLL_UTC_OFFSET_MINUTES",
                    reason: e.to_string(),
                })?
            }
            None => DayBoundary::local(),
        };

        Ok(Self {
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
            jwt_secret,
            session_ttl: Duration::minutes(session_ttl_minutes),
            database_url: get("DATABASE_URL"),
            database_max_connections,
            cors_origin: get("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            day_boundary,
        })
    }

    /// In-memory configuration with a UTC day boundary.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            port: 0,
            jwt_secret: jwt_secret.to_string(),
            session_ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            database_url: None,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            day_boundary: DayBoundary::utc(),
        }
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(name) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError {
            name,
            reason: format!("'{raw}': {e}"),
        }),
        None => Ok(default),
    }
}
