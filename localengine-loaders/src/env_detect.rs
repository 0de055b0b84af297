//! Locale detection from POSIX locale environment variables.

use localengine_core::{AutoDetector, LocaleId, canonical_variant};
use localengine_log::debug;

/// Variables consulted, highest priority first.
pub const LOCALE_VARS: [&str; 4] = ["LC_ALL", "LC_MESSAGES", "LANG", "LANGUAGE"];

type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Detects the user's locale from `LC_ALL`, `LC_MESSAGES`, `LANG` and
/// `LANGUAGE`.
///
/// Empty values and the `C`/`POSIX` locales are skipped.
pub struct EnvDetector {
    lookup: Box<Lookup>,
}

impl std::fmt::Debug for EnvDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvDetector").finish_non_exhaustive()
    }
}

impl Default for EnvDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvDetector {
    /// Detector reading the process environment.
    pub fn new() -> Self {
        Self::with_lookup(|name| std::env::var(name).ok())
    }

    /// Detector reading variables through `lookup`.
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }
}

impl AutoDetector for EnvDetector {
    fn detect(&self) -> Option<LocaleId> {
        for var in LOCALE_VARS {
            let Some(value) = (self.lookup)(var) else {
                continue;
            };
            // LANGUAGE holds a priority list such as "fr:en".
            let first = value.split(':').next().unwrap_or_default();
            if let Some(locale) = normalize_locale(first) {
                debug!("Detected locale {} from {}", locale, var);
                return Some(locale);
            }
        }
        None
    }
}

/// Normalize a POSIX locale string.
///
/// Drops the codeset and modifier (`fr_FR.UTF-8` → `fr-FR`,
/// `zh_CN@euro` → `zh-CN`) and expands a bare language to its common
/// regional variant when one is known (`de` → `de-DE`).
pub fn normalize_locale(raw: &str) -> Option<LocaleId> {
    let name = raw.split(['.', '@']).next().unwrap_or_default().trim();
    if name.is_empty() || name == "C" || name == "POSIX" {
        return None;
    }

    let locale = LocaleId::parse(name).ok()?;
    if locale.has_region() {
        return Some(locale);
    }
    canonical_variant(locale.language()).or(Some(locale))
}
