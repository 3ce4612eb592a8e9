//! Environment-driven server configuration.
//!
//! # Invariants
//! - Every value has a default except `JWT_SECRET`.
//! - Malformed values surface as [`ConfigError`], never as panics.

use axum::http::HeaderValue;
use internhub_core::auth::MIN_SECRET_BYTES;
use internhub_core::default_log_level;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DATABASE_PATH: &str = "./internhub.db";
const DEFAULT_JWT_EXPIRES_IN: &str = "1h";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:4173";
const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "{key} must be set"),
            Self::Invalid { key, message } => write!(f, "invalid {key}: {message}"),
        }
    }
}

impl Error for ConfigError {}

fn invalid(key: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        message: message.into(),
    }
}

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub jwt_secret: String,
    pub jwt_ttl_secs: i64,
    pub cors_origin: HeaderValue,
    pub upload_dir: PathBuf,
    pub max_file_size: usize,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl ServerConfig {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let jwt_secret = read("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_SECRET_BYTES {
            return Err(invalid(
                "JWT_SECRET",
                format!("must be at least {MIN_SECRET_BYTES} characters"),
            ));
        }

        let port = match read("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|err| invalid("PORT", err.to_string()))?,
            None => DEFAULT_PORT,
        };
        let jwt_ttl_secs = parse_duration_secs(
            &read("JWT_EXPIRES_IN").unwrap_or_else(|| DEFAULT_JWT_EXPIRES_IN.to_string()),
        )
        .map_err(|message| invalid("JWT_EXPIRES_IN", message))?;
        let cors_origin = read("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());
        let cors_origin = HeaderValue::from_str(&cors_origin)
            .map_err(|err| invalid("CORS_ORIGIN", err.to_string()))?;
        let max_file_size = match read("MAX_FILE_SIZE") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) => return Err(invalid("MAX_FILE_SIZE", "must be positive")),
                Ok(size) => size,
                Err(err) => return Err(invalid("MAX_FILE_SIZE", err.to_string())),
            },
            None => DEFAULT_MAX_FILE_SIZE,
        };

        Ok(Self {
            host: read("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_path: PathBuf::from(
                read("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            ),
            jwt_secret,
            jwt_ttl_secs,
            cors_origin,
            upload_dir: PathBuf::from(
                read("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
            ),
            max_file_size,
            log_level: read("LOG_LEVEL").unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read("LOG_DIR"),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Debug for ServerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_path", &self.database_path)
            .field("jwt_ttl_secs", &self.jwt_ttl_secs)
            .field("cors_origin", &self.cors_origin)
            .field("upload_dir", &self.upload_dir)
            .field("max_file_size", &self.max_file_size)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .finish_non_exhaustive()
    }
}

/// Parses `Ns`, `Nm`, `Nh`, `Nd` or a bare number of seconds.
fn parse_duration_secs(raw: &str) -> Result<i64, String> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last() {
        Some((idx, unit)) if unit.is_ascii_alphabetic() => (&raw[..idx], unit),
        _ => (raw, 's'),
    };
    let multiplier = match unit.to_ascii_lowercase() {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        other => return Err(format!("unknown unit `{other}`; expected s, m, h or d")),
    };
    let amount = digits
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("`{raw}` is not a duration"))?;
    if amount <= 0 {
        return Err("must be positive".to_string());
    }
    amount
        .checked_mul(multiplier)
        .ok_or_else(|| format!("`{raw}` is too large"))
}

#[cfg(test)]
mod tests {
    use super::{parse_duration_secs, ConfigError, ServerConfig};
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = config_from(&[("JWT_SECRET", SECRET)]).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:3001");
        assert_eq!(config.jwt_ttl_secs, 3_600);
        assert_eq!(config.max_file_size, 5 * 1024 * 1024);
        assert_eq!(config.cors_origin, "http://localhost:4173");
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn secret_is_required_and_must_be_long_enough() {
        assert_eq!(
            config_from(&[]).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
        assert!(matches!(
            config_from(&[("JWT_SECRET", "short")]).unwrap_err(),
            ConfigError::Invalid { key: "JWT_SECRET", .. }
        ));
    }

    #[test]
    fn malformed_values_are_rejected() {
        for (key, value) in [
            ("PORT", "eighty"),
            ("JWT_EXPIRES_IN", "10w"),
            ("MAX_FILE_SIZE", "0"),
        ] {
            let err = config_from(&[("JWT_SECRET", SECRET), (key, value)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: k, .. } if k == key));
        }
    }

    #[test]
    fn durations_accept_units() {
        assert_eq!(parse_duration_secs("45").unwrap(), 45);
        assert_eq!(parse_duration_secs("30m").unwrap(), 1_800);
        assert_eq!(parse_duration_secs("7d").unwrap(), 604_800);
        assert!(parse_duration_secs("-1h").is_err());
        assert!(parse_duration_secs("h").is_err());
    }

    #[test]
    fn debug_output_hides_secret() {
        let config = config_from(&[("JWT_SECRET", SECRET)]).unwrap();
        assert!(!format!("{config:?}").contains(SECRET));
    }
}
