//! Application configuration
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! environment variables. The CLI applies its own flags on top.
//!
//! ```toml
//! endpoint = "http://localhost:30180/api/translate"
//! request_timeout_secs = 60
//! ticker_period_ms = 2000
//! default_method = "bing"
//! default_font = "mangati"
//! ```

use crate::options::{FontStyle, TranslationConfig, TranslationMethod};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://provider.gpu.gpufarm.xyz:30180/api/translate";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_TICKER_PERIOD_MS: u64 = 2_000;

pub const ENDPOINT_ENV: &str = "MANGA_TRANSLATE_ENDPOINT";
pub const TIMEOUT_ENV: &str = "MANGA_TRANSLATE_TIMEOUT_SECS";

/// Phrases cycled through while a page is being translated
pub const DEFAULT_PHRASES: [&str; 5] = [
    "Translating manga magic...",
    "Converting speech bubbles...",
    "Decoding Japanese wisdom...",
    "Preparing your manga experience...",
    "Almost there, just a few more panels...",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file couldn't be read
    Io(String),
    /// The config file isn't valid TOML or has unknown values
    Parse(String),
    /// A value is present but unusable
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Failed to read config: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Full URL of the translate endpoint
    pub endpoint: String,
    pub request_timeout_secs: u64,
    /// How often the status phrase advances during a request
    pub ticker_period_ms: u64,
    pub default_method: TranslationMethod,
    pub default_font: FontStyle,
    pub phrases: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            ticker_period_ms: DEFAULT_TICKER_PERIOD_MS,
            default_method: TranslationMethod::default(),
            default_font: FontStyle::default(),
            phrases: DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load defaults, the optional file at `path`, then environment overrides
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> ConfigResult<Self> {
        let config: Config = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in practice)
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            self.endpoint = endpoint.trim().to_string();
        }

        if let Some(timeout) = lookup(TIMEOUT_ENV) {
            self.request_timeout_secs = timeout.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{} must be a whole number, got '{}'", TIMEOUT_ENV, timeout))
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint cannot be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.ticker_period_ms == 0 {
            return Err(ConfigError::Invalid(
                "ticker_period_ms must be greater than zero".to_string(),
            ));
        }
        if self.phrases.is_empty() {
            return Err(ConfigError::Invalid("phrases cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn ticker_period(&self) -> Duration {
        Duration::from_millis(self.ticker_period_ms)
    }

    /// The option selection a fresh controller starts with
    pub fn initial_selection(&self) -> TranslationConfig {
        TranslationConfig::new(self.default_method, self.default_font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.ticker_period(), Duration::from_millis(2_000));
        assert_eq!(config.phrases.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = Config::from_toml(
            r#"
            endpoint = "http://localhost:30180/api/translate"
            default_method = "bing"
            default_font = "mangati"
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:30180/api/translate");
        assert_eq!(config.default_method, TranslationMethod::Bing);
        assert_eq!(config.default_font, FontStyle::Mangati);
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_from_toml_rejects_unknown_method() {
        let result = Config::from_toml(r#"default_method = "deepl""#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_toml_rejects_unknown_key() {
        let result = Config::from_toml(r#"api_key = "secret""#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_empty_phrases_invalid() {
        let result = Config::from_toml("phrases = []");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_period_invalid() {
        let result = Config::from_toml("ticker_period_ms = 0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENDPOINT_ENV, " http://10.0.0.2:5000/api/translate "),
            (TIMEOUT_ENV, "30"),
        ]);
        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.endpoint, "http://10.0.0.2:5000/api/translate");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_env_bad_timeout() {
        let mut config = Config::default();
        let result = config.apply_env(|key| (key == TIMEOUT_ENV).then(|| "soon".to_string()));
        match result {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("soon")),
            other => panic!("Expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
