use std::env;
use std::path::PathBuf;
use std::time::Duration;

use gist_core::summarizer::handler::DEFAULT_MAX_WAIT;
use gist_core::summarizer::transport::{DEFAULT_DOMAIN, TransportConfig};
use thiserror::Error;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HISTORY_PATH: &str = "gist_db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryBackend {
    Sled,
    File,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    pub provider_session_id: String,
    pub summarizer_domain: String,
    pub max_wait: Duration,
    pub request_timeout: Duration,
    pub history_backend: HistoryBackend,
    pub history_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let secs = |name: &'static str, default: u64| match lookup(name) {
            None => Ok(Duration::from_secs(default)),
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid { name, value }),
        };

        let history_backend = match lookup("HISTORY_BACKEND").as_deref().map(str::trim) {
            None | Some("sled") => HistoryBackend::Sled,
            Some("file") => HistoryBackend::File,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "HISTORY_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN")?,
            provider_session_id: required("YANDEX_SESSION_ID")?,
            summarizer_domain: lookup("SUMMARIZER_DOMAIN").unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            max_wait: secs("SUMMARIZER_MAX_WAIT_SECS", DEFAULT_MAX_WAIT.as_secs())?,
            request_timeout: secs("SUMMARIZER_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            history_backend,
            history_path: lookup("HISTORY_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_PATH)),
        })
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::for_domain(
            &self.summarizer_domain,
            self.provider_session_id.clone(),
            self.request_timeout,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "TELEGRAM_BOT_TOKEN",
        "YANDEX_SESSION_ID",
        "SUMMARIZER_DOMAIN",
        "SUMMARIZER_MAX_WAIT_SECS",
        "SUMMARIZER_REQUEST_TIMEOUT_SECS",
        "HISTORY_BACKEND",
        "HISTORY_PATH",
    ];

    fn clear_env() {
        for key in KEYS {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    fn set_env(key: &str, value: &str) {
        unsafe {
            env::set_var(key, value);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        set_env("TELEGRAM_BOT_TOKEN", "123:abc");
        set_env("YANDEX_SESSION_ID", "session");

        let config = AppConfig::from_env().unwrap();

        assert_eq!(config.summarizer_domain, "300.ya.ru");
        assert_eq!(config.max_wait, Duration::from_secs(300));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.history_backend, HistoryBackend::Sled);
        assert_eq!(config.history_path, PathBuf::from("gist_db"));
        assert_eq!(config.transport_config().base_url, "https://300.ya.ru");
        assert_eq!(config.transport_config().credential, "session");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        set_env("TELEGRAM_BOT_TOKEN", "123:abc");
        set_env("YANDEX_SESSION_ID", "session");
        set_env("SUMMARIZER_MAX_WAIT_SECS", "60");
        set_env("HISTORY_BACKEND", "file");
        set_env("HISTORY_PATH", "/var/lib/gist");

        let config = AppConfig::from_env().unwrap();

        assert_eq!(config.max_wait, Duration::from_secs(60));
        assert_eq!(config.history_backend, HistoryBackend::File);
        assert_eq!(config.history_path, PathBuf::from("/var/lib/gist"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_credential() {
        clear_env();
        set_env("TELEGRAM_BOT_TOKEN", "123:abc");

        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("YANDEX_SESSION_ID")));
        clear_env();
    }

    #[test]
    fn test_invalid_number() {
        let err = AppConfig::from_lookup(|name| match name {
            "TELEGRAM_BOT_TOKEN" | "YANDEX_SESSION_ID" => Some("x".to_string()),
            "SUMMARIZER_REQUEST_TIMEOUT_SECS" => Some("soon".to_string()),
            _ => None,
        })
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Invalid { name: "SUMMARIZER_REQUEST_TIMEOUT_SECS", .. }
        ));
    }

    #[test]
    fn test_unknown_backend() {
        let err = AppConfig::from_lookup(|name| match name {
            "HISTORY_BACKEND" => Some("postgres".to_string()),
            _ => Some("x".to_string()),
        })
        .unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { name: "HISTORY_BACKEND", .. }));
    }
}
