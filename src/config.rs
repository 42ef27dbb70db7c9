//! Runtime configuration
//!
//! Everything the server needs from its environment is read once at startup
//! into [`AppConfig`] and handed to constructors from there.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

pub const ENV_DATABASE_PATH: &str = "NUTRICARE_DATABASE_PATH";
pub const ENV_GEMINI_API_KEY: &str = "NUTRICARE_GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "NUTRICARE_GEMINI_MODEL";
pub const ENV_GEMINI_BASE_URL: &str = "NUTRICARE_GEMINI_BASE_URL";
pub const ENV_GEMINI_TIMEOUT_SECS: &str = "NUTRICARE_GEMINI_TIMEOUT_SECS";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 30;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Settings for the Gemini generative-text service
#[derive(Debug)]
pub struct GeminiConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Config pointing at the public Gemini endpoint with default model and timeout
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_GEMINI_TIMEOUT_SECS),
        }
    }
}

/// Process-wide configuration
#[derive(Debug)]
pub struct AppConfig {
    pub database_path: PathBuf,
    /// `None` when no API key is configured; AI recommendations are then unavailable.
    pub gemini: Option<GeminiConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(ENV_DATABASE_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let gemini = match lookup(ENV_GEMINI_API_KEY).filter(|k| !k.trim().is_empty()) {
            Some(key) => {
                let mut config = GeminiConfig::new(SecretString::from(key.trim().to_string()));
                if let Some(model) = lookup(ENV_GEMINI_MODEL).filter(|m| !m.trim().is_empty()) {
                    config.model = model.trim().to_string();
                }
                if let Some(url) = lookup(ENV_GEMINI_BASE_URL).filter(|u| !u.trim().is_empty()) {
                    config.base_url = url.trim().trim_end_matches('/').to_string();
                }
                if let Some(raw) = lookup(ENV_GEMINI_TIMEOUT_SECS) {
                    let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                        name: ENV_GEMINI_TIMEOUT_SECS,
                        value: raw.clone(),
                    })?;
                    config.timeout = Duration::from_secs(secs);
                }
                Some(config)
            }
            None => None,
        };

        Ok(Self {
            database_path,
            gemini,
        })
    }
}

/// Database path from `NUTRICARE_DATABASE_PATH`, or the default location.
///
/// For maintenance binaries that need the database but not the AI settings.
pub fn database_path_from_env() -> PathBuf {
    std::env::var(ENV_DATABASE_PATH)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_database_path)
}

/// `<project>/data/nutricare.db`, resolved relative to the executable
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path.push("data");
    path.push("nutricare.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_api_key() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.gemini.is_none());
        assert!(config.database_path.ends_with("data/nutricare.db"));
    }

    #[test]
    fn test_gemini_settings_from_env() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_DATABASE_PATH, "/tmp/nc.db"),
            (ENV_GEMINI_API_KEY, " secret-key "),
            (ENV_GEMINI_MODEL, "gemini-pro"),
            (ENV_GEMINI_BASE_URL, "http://localhost:9000/"),
            (ENV_GEMINI_TIMEOUT_SECS, "5"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/nc.db"));
        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.api_key.expose_secret(), "secret-key");
        assert_eq!(gemini.model, "gemini-pro");
        assert_eq!(gemini.base_url, "http://localhost:9000");
        assert_eq!(gemini.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_api_key_disables_gemini() {
        let config = AppConfig::from_lookup(lookup_from(&[(ENV_GEMINI_API_KEY, "   ")])).unwrap();
        assert!(config.gemini.is_none());
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[
            (ENV_GEMINI_API_KEY, "key"),
            (ENV_GEMINI_TIMEOUT_SECS, "soon"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: ENV_GEMINI_TIMEOUT_SECS, .. })
        ));
    }

    #[test]
    fn test_api_key_is_redacted_in_debug() {
        let config = AppConfig::from_lookup(lookup_from(&[(ENV_GEMINI_API_KEY, "top-secret")])).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("top-secret"));
    }
}
