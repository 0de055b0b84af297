//! Engine configuration.

use crate::error::{LocalEngineError, Result};
use crate::locale::LocaleId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const ENV_PREFIX: &str = "LOCALENGINE";

/// Configuration file formats accepted by [`EngineConfig::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }
}

/// Engine configuration.
///
/// # Examples
///
/// ```
/// use localengine_core::EngineConfig;
/// use std::time::Duration;
///
/// let config = EngineConfig::new("./i18n")
///     .with_default_locale("en-GB")
///     .with_auto_detect(false)
///     .with_cache_ttl(Duration::from_secs(60));
///
/// assert_eq!(config.cache_ttl(), Duration::from_secs(60));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory or URL the loader reads from
    pub base_path: String,

    /// Locale of last resort for every lookup
    pub default_locale: String,

    /// Consult the auto-detector at construction
    pub auto_detect: bool,

    /// Lifetime of a cache entry before it is considered stale
    pub cache_ttl_seconds: u64,

    /// Period of the background refresher; `0` disables it
    pub refresh_interval_seconds: u64,

    /// How long `stop()` waits for the refresher to exit
    pub shutdown_grace_millis: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_path: ".".to_string(),
            default_locale: "en-US".to_string(),
            auto_detect: true,
            cache_ttl_seconds: 300,
            refresh_interval_seconds: 300,
            shutdown_grace_millis: 1000,
        }
    }
}

impl EngineConfig {
    /// Default configuration reading from `base_path`.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Self::default()
        }
    }

    /// Set the default locale.
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    /// Enable or disable auto-detection.
    pub fn with_auto_detect(mut self, enabled: bool) -> Self {
        self.auto_detect = enabled;
        self
    }

    /// Set the cache TTL (whole seconds).
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_seconds = ttl.as_secs();
        self
    }

    /// Set the refresh interval (whole seconds); zero disables refreshing.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval_seconds = interval.as_secs();
        self
    }

    /// Set the shutdown grace period.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace_millis = grace.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// `None` when the refresher is disabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_seconds > 0).then(|| Duration::from_secs(self.refresh_interval_seconds))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_millis)
    }

    /// Parsed default locale.
    pub fn default_locale_id(&self) -> Result<LocaleId> {
        LocaleId::parse(&self.default_locale)
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        self.default_locale_id().map_err(|_| {
            LocalEngineError::Config(format!("invalid default_locale '{}'", self.default_locale))
        })?;

        if self.cache_ttl_seconds == 0 {
            return Err(LocalEngineError::Config(
                "cache_ttl_seconds must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Defaults overridden by `LOCALENGINE_*` environment variables.
    ///
    /// Recognized: `BASE_PATH`, `DEFAULT_LOCALE`, `AUTO_DETECT`, `CACHE_TTL`,
    /// `REFRESH_INTERVAL`, `SHUTDOWN_GRACE_MS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(format!("{}_{}", ENV_PREFIX, name)).ok())
    }

    /// Like [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("BASE_PATH") {
            config.base_path = path;
        }
        if let Some(locale) = lookup("DEFAULT_LOCALE") {
            config.default_locale = locale;
        }
        if let Some(flag) = lookup("AUTO_DETECT") {
            config.auto_detect = parse_flag("AUTO_DETECT", &flag)?;
        }
        if let Some(ttl) = lookup("CACHE_TTL") {
            config.cache_ttl_seconds = parse_number("CACHE_TTL", &ttl)?;
        }
        if let Some(interval) = lookup("REFRESH_INTERVAL") {
            config.refresh_interval_seconds = parse_number("REFRESH_INTERVAL", &interval)?;
        }
        if let Some(grace) = lookup("SHUTDOWN_GRACE_MS") {
            config.shutdown_grace_millis = parse_number("SHUTDOWN_GRACE_MS", &grace)?;
        }

        Ok(config)
    }

    /// Load from a `.json` or `.toml` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(FileFormat::from_extension)
            .ok_or_else(|| {
                LocalEngineError::Config(format!("unsupported config file: {}", path.display()))
            })?;

        let content = std::fs::read_to_string(path).map_err(|e| {
            LocalEngineError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        Self::parse(&content, format)
    }

    /// Parse configuration text. Missing fields take their defaults.
    pub fn parse(content: &str, format: FileFormat) -> Result<Self> {
        match format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| LocalEngineError::Config(format!("JSON parse error: {}", e))),
            FileFormat::Toml => toml::from_str(content)
                .map_err(|e| LocalEngineError::Config(format!("TOML parse error: {}", e))),
        }
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(LocalEngineError::Config(format!(
            "{}_{}: expected a boolean, got '{}'",
            ENV_PREFIX, name, other
        ))),
    }
}

fn parse_number(name: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| {
        LocalEngineError::Config(format!(
            "{}_{}: expected a non-negative integer, got '{}'",
            ENV_PREFIX, name, value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_locale, "en-US");
        assert!(config.auto_detect);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(300)));
        assert_eq!(config.shutdown_grace(), Duration::from_secs(1));
    }

    #[test]
    fn test_zero_interval_disables_refresh() {
        let config = EngineConfig::default().with_refresh_interval(Duration::ZERO);
        assert_eq!(config.refresh_interval(), None);
    }

    #[test]
    fn test_validate() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(matches!(
            EngineConfig::default().with_default_locale("not a locale").validate(),
            Err(LocalEngineError::Config(_))
        ));
        assert!(EngineConfig::default().with_cache_ttl(Duration::ZERO).validate().is_err());
    }

    // Environment variables are process-global, so these tests go through
    // an explicit lookup instead of mutating the real environment.
    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("BASE_PATH", "/srv/i18n"),
            ("DEFAULT_LOCALE", "fr-FR"),
            ("AUTO_DETECT", "false"),
            ("CACHE_TTL", "60"),
            ("REFRESH_INTERVAL", "0"),
        ]
        .into_iter()
        .collect();

        let config = EngineConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.base_path, "/srv/i18n");
        assert_eq!(config.default_locale, "fr-FR");
        assert!(!config.auto_detect);
        assert_eq!(config.cache_ttl_seconds, 60);
        assert_eq!(config.refresh_interval(), None);
        assert_eq!(config.shutdown_grace_millis, 1000);
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let result = EngineConfig::from_lookup(|name| (name == "CACHE_TTL").then(|| "soon".to_string()));
        assert!(matches!(result, Err(LocalEngineError::Config(msg)) if msg.contains("CACHE_TTL")));

        let result = EngineConfig::from_lookup(|name| (name == "AUTO_DETECT").then(|| "maybe".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_toml_with_defaults() {
        let config = EngineConfig::parse(
            r#"
            base_path = "https://cdn.example.com/i18n"
            cache_ttl_seconds = 120
            "#,
            FileFormat::Toml,
        )
        .unwrap();

        assert_eq!(config.base_path, "https://cdn.example.com/i18n");
        assert_eq!(config.cache_ttl_seconds, 120);
        assert_eq!(config.default_locale, "en-US");
    }

    #[test]
    fn test_parse_json() {
        let config = EngineConfig::parse(r#"{"default_locale": "de-DE", "auto_detect": false}"#, FileFormat::Json)
            .unwrap();
        assert_eq!(config.default_locale, "de-DE");
        assert!(!config.auto_detect);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("localengine.toml");
        std::fs::write(&path, "refresh_interval_seconds = 30\n").unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(30)));

        assert!(EngineConfig::from_file(dir.path().join("config.yaml")).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_extension("JSON"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("toml"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("ini"), None);
    }
}
