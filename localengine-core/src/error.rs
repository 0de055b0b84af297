//! Error types for engine operations.

use crate::locale::LocaleId;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, LocalEngineError>;

/// Errors surfaced by the engine to its callers.
#[derive(Debug, Error)]
pub enum LocalEngineError {
    /// No loader attempt could resolve the locale
    #[error("Locale '{locale}' not found")]
    LocaleNotFound { locale: String },

    /// The loader failed to fetch or parse the locale
    #[error("Error loading locale '{locale}': {source}")]
    LocaleFile {
        locale: String,
        #[source]
        source: LoadError,
    },

    /// The key was not present in any locale of the fallback chain
    #[error("Translation key '{key}' not found (tried: {})", format_chain(.chain))]
    TranslationKey { key: String, chain: Vec<LocaleId> },

    /// The input is not a usable locale identifier
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The engine was stopped and cannot be restarted
    #[error("Engine has been stopped")]
    EngineStopped,
}

impl LocalEngineError {
    /// Whether the error means "nothing to show" rather than a hard failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LocalEngineError::LocaleNotFound { .. } | LocalEngineError::TranslationKey { .. }
        )
    }
}

fn format_chain(chain: &[LocaleId]) -> String {
    chain
        .iter()
        .map(LocaleId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors reported by a [`Loader`](crate::Loader) implementation.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source has no data for this locale
    #[error("no locale data for '{0}'")]
    NotFound(String),

    /// Reading the source failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The source was found but could not be parsed
    #[error("failed to parse '{locale}': {message}")]
    Parse { locale: String, message: String },

    /// Any other loader failure
    #[error("{0}")]
    Other(String),
}
