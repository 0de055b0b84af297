//! Locale cache, fallback resolution and background refresh.
//!
//! `localengine-core` resolves dotted translation keys to localized text. It
//! keeps parsed locale data in a TTL cache, walks a fallback chain when the
//! requested locale lacks a key, and refreshes stale entries on a background
//! task while foreground lookups continue.
//!
//! # Features
//!
//! - **Fallback chains** - `es-MX` falls back to `es`, `es-ES`, then the default locale
//! - **TTL cache** - stale entries keep serving until a reload succeeds
//! - **Background refresh** - a cancellable tokio task bound to the engine
//! - **Locale change listeners** - isolated, snapshot-dispatched callbacks
//! - **Pluggable sources** - anything implementing [`Loader`]
//!
//! # Examples
//!
//! ```
//! use localengine_core::prelude::*;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let labels = TranslationTree::new().with("ok", "OK").with("cancel", "Cancel");
//! let loader = MemoryLoader::new()
//!     .with_locale(LocaleId::parse("en-US")?, TranslationTree::new().with("button_labels", labels));
//!
//! let engine = LocalEngine::builder(Arc::new(loader))
//!     .config(EngineConfig::default().with_auto_detect(false))
//!     .spawn_refresher(false)
//!     .build()
//!     .await?;
//!
//! assert_eq!(engine.get_text("button_labels.ok", None, None).await?, "OK");
//! assert!(engine.get_text("button_labels.missing", None, None).await.is_err());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod callbacks;
pub mod config;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod loader;
pub mod locale;
pub mod refresher;
pub mod tree;

pub use cache::{CacheEntry, CacheStats, CacheStore};
pub use callbacks::{CallbackDispatcher, CallbackHandle, CallbackResult, LocaleChangeCallback};
pub use config::{EngineConfig, FileFormat};
pub use engine::{LocalEngine, LocalEngineBuilder};
pub use error::{LoadError, LocalEngineError, Result};
pub use fallback::{canonical_variant, resolve_chain};
pub use loader::{AutoDetector, FixedDetector, LoadedLocale, Loader, MemoryLoader, Metadata};
pub use locale::LocaleId;
pub use refresher::{BackgroundRefresher, RefreshReport, RefresherHandle};
pub use tree::{TranslationTree, TranslationValue};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::LocalEngine;
    pub use crate::error::{LoadError, LocalEngineError, Result};
    pub use crate::loader::{AutoDetector, LoadedLocale, Loader, MemoryLoader, Metadata};
    pub use crate::locale::LocaleId;
    pub use crate::tree::{TranslationTree, TranslationValue};
}
