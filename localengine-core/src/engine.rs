//! The engine orchestrator.

use crate::cache::{CacheEntry, CacheStats, CacheStore};
use crate::callbacks::{CallbackDispatcher, CallbackHandle, CallbackResult};
use crate::config::EngineConfig;
use crate::error::{LocalEngineError, Result};
use crate::fallback::resolve_chain;
use crate::loader::{AutoDetector, Loader, Metadata};
use crate::locale::LocaleId;
use crate::refresher::{BackgroundRefresher, RefresherHandle};
use localengine_log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::time::Instant;

/// Localization engine.
///
/// Cloning is cheap and every clone shares the same cache, locale state and
/// background refresher. The refresher is signalled when the last clone is
/// dropped; call [`stop`](Self::stop) to wait for it to exit.
///
/// # Examples
///
/// ```
/// use localengine_core::{EngineConfig, LocalEngine, LocaleId, MemoryLoader, TranslationTree};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> localengine_core::Result<()> {
/// let loader = MemoryLoader::new()
///     .with_locale(LocaleId::parse("en-US")?, TranslationTree::new().with("greeting", "Hello"))
///     .with_locale(LocaleId::parse("es-ES")?, TranslationTree::new().with("greeting", "Hola"));
///
/// let engine = LocalEngine::builder(Arc::new(loader))
///     .config(EngineConfig::default().with_auto_detect(false))
///     .build()
///     .await?;
///
/// engine.set_locale("es-ES").await?;
/// assert_eq!(engine.get_text("greeting", None, None).await?, "Hola");
/// assert_eq!(engine.get_text("missing", None, Some("N/A")).await?, "N/A");
///
/// engine.stop().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: EngineConfig,
    default_locale: LocaleId,
    current_locale: RwLock<LocaleId>,
    cache: Arc<CacheStore>,
    loader: Arc<dyn Loader>,
    callbacks: CallbackDispatcher,
    refresher: Mutex<Option<RefresherHandle>>,
    stopped: AtomicBool,
}

impl std::fmt::Debug for LocalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEngine")
            .field("current_locale", &*self.inner.current_locale.read())
            .field("default_locale", &self.inner.default_locale)
            .field("cached", &self.inner.cache.len())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// Builder for [`LocalEngine`].
pub struct LocalEngineBuilder {
    loader: Arc<dyn Loader>,
    config: EngineConfig,
    detector: Option<Box<dyn AutoDetector>>,
    spawn_refresher: bool,
}

impl LocalEngineBuilder {
    /// Replace the configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Detector consulted once during [`build`](Self::build) when
    /// `auto_detect` is enabled.
    pub fn detector(mut self, detector: impl AutoDetector + 'static) -> Self {
        self.detector = Some(Box::new(detector));
        self
    }

    /// Whether `build` starts the background refresher (default `true`).
    pub fn spawn_refresher(mut self, spawn: bool) -> Self {
        self.spawn_refresher = spawn;
        self
    }

    /// Validate the configuration, pick the initial locale and start the
    /// refresher.
    ///
    /// A detected locale is used only if it can be loaded; otherwise the
    /// engine starts on the default locale. Construction does not fail
    /// because locale data is missing.
    pub async fn build(self) -> Result<LocalEngine> {
        self.config.validate()?;
        let default_locale = self.config.default_locale_id()?;

        let engine = LocalEngine {
            inner: Arc::new(EngineInner {
                cache: Arc::new(CacheStore::new(self.config.cache_ttl())),
                current_locale: RwLock::new(default_locale.clone()),
                default_locale,
                loader: self.loader,
                callbacks: CallbackDispatcher::new(),
                refresher: Mutex::new(None),
                stopped: AtomicBool::new(false),
                config: self.config,
            }),
        };

        let detected = match (&self.detector, engine.inner.config.auto_detect) {
            (Some(detector), true) => detector.detect(),
            _ => None,
        };

        match detected {
            Some(locale) if engine.entry_or_load(&locale).await.is_some() => {
                info!("Using detected locale {}", locale);
                *engine.inner.current_locale.write() = locale;
            }
            Some(locale) => {
                info!(
                    "Detected locale {} is not available, using {}",
                    locale, engine.inner.default_locale
                );
                engine.warm(&engine.inner.default_locale).await;
            }
            None => engine.warm(&engine.inner.default_locale).await,
        }

        if self.spawn_refresher {
            engine.start()?;
        }
        Ok(engine)
    }
}

impl LocalEngine {
    /// Start building an engine backed by `loader`.
    pub fn builder(loader: Arc<dyn Loader>) -> LocalEngineBuilder {
        LocalEngineBuilder {
            loader,
            config: EngineConfig::default(),
            detector: None,
            spawn_refresher: true,
        }
    }

    /// Build an engine with `config` and no auto-detector.
    pub async fn new(loader: Arc<dyn Loader>, config: EngineConfig) -> Result<Self> {
        Self::builder(loader).config(config).build().await
    }

    /// Look up `key` for `locale` (or the current locale), following the
    /// fallback chain.
    ///
    /// Candidates that cannot be loaded are skipped. If the chain is
    /// exhausted, `default` is returned when given; otherwise the error is
    /// [`TranslationKey`](LocalEngineError::TranslationKey) when at least one
    /// candidate loaded, or [`LocaleNotFound`](LocalEngineError::LocaleNotFound)
    /// when none did.
    pub async fn get_text(&self, key: &str, locale: Option<&str>, default: Option<&str>) -> Result<String> {
        let target = match locale {
            Some(tag) => LocaleId::parse(tag)?,
            None => self.get_current_locale(),
        };
        let chain = resolve_chain(&target, &self.inner.default_locale);

        let mut any_loaded = false;
        for candidate in &chain {
            let Some(entry) = self.entry_or_load(candidate).await else {
                continue;
            };
            any_loaded = true;
            if let Some(text) = entry.tree.resolve_text(key) {
                return Ok(text.to_string());
            }
        }

        if let Some(default) = default {
            return Ok(default.to_string());
        }
        if any_loaded {
            Err(LocalEngineError::TranslationKey {
                key: key.to_string(),
                chain,
            })
        } else {
            Err(LocalEngineError::LocaleNotFound {
                locale: target.to_string(),
            })
        }
    }

    /// [`get_text`](Self::get_text) in the current locale with a default.
    pub async fn get_text_or(&self, key: &str, default: &str) -> String {
        self.get_text(key, None, Some(default))
            .await
            .unwrap_or_else(|_| default.to_string())
    }

    /// Whether `key` resolves anywhere along the fallback chain.
    ///
    /// Only an invalid locale identifier is an error.
    pub async fn has_key(&self, key: &str, locale: Option<&str>) -> Result<bool> {
        match self.get_text(key, locale, None).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Switch the current locale.
    ///
    /// The locale must be cached or loadable. Listeners are notified after
    /// the switch, with no engine lock held, and only if the locale changed.
    pub async fn set_locale(&self, locale: &str) -> Result<()> {
        let target = LocaleId::parse(locale)?;
        if self.entry_or_load(&target).await.is_none() {
            return Err(LocalEngineError::LocaleNotFound {
                locale: target.to_string(),
            });
        }

        let old = {
            let mut current = self.inner.current_locale.write();
            if *current == target {
                None
            } else {
                Some(std::mem::replace(&mut *current, target.clone()))
            }
        };

        if let Some(old) = old {
            info!("Locale changed from {} to {}", old, target);
            self.inner.callbacks.dispatch(Some(&old), &target);
        }
        Ok(())
    }

    /// The active locale.
    pub fn get_current_locale(&self) -> LocaleId {
        self.inner.current_locale.read().clone()
    }

    /// The configured default locale.
    pub fn default_locale(&self) -> &LocaleId {
        &self.inner.default_locale
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Sorted union of cached locales and those the loader can enumerate.
    ///
    /// A failing enumeration is logged and only the cached locales are
    /// returned.
    pub async fn get_available_locales(&self) -> Vec<LocaleId> {
        let mut available: BTreeSet<LocaleId> = self.inner.cache.locales().into_iter().collect();
        match self.inner.loader.list_available().await {
            Ok(listed) => available.extend(listed),
            Err(e) => warn!("Failed to list available locales: {}", e),
        }
        available.into_iter().collect()
    }

    /// Metadata of `locale` (or the current locale), loading it if needed.
    ///
    /// `Ok(None)` if the locale cannot be loaded.
    pub async fn get_metadata(&self, locale: Option<&str>) -> Result<Option<Metadata>> {
        let target = self.target_locale(locale)?;
        Ok(self
            .entry_or_load(&target)
            .await
            .map(|entry| entry.metadata.clone()))
    }

    /// Load `locale` (or the current locale) again, ignoring the TTL.
    ///
    /// On failure the cached entry, if any, is kept and the loader error is
    /// returned.
    pub async fn reload_locale(&self, locale: Option<&str>) -> Result<()> {
        let target = self.target_locale(locale)?;
        let loaded = self
            .inner
            .loader
            .load(&target)
            .await
            .map_err(|source| LocalEngineError::LocaleFile {
                locale: target.to_string(),
                source,
            })?;

        self.inner.cache.install(&target, loaded, Instant::now());
        info!("Reloaded locale {}", target);
        Ok(())
    }

    /// Drop the cached entry for `locale`, or every entry when `None`.
    pub fn clear_cache(&self, locale: Option<&str>) -> Result<()> {
        match locale {
            Some(tag) => {
                self.inner.cache.invalidate(&LocaleId::parse(tag)?);
            }
            None => self.inner.cache.invalidate_all(),
        }
        Ok(())
    }

    /// Register a listener called with `(old, new)` after each locale change.
    pub fn add_locale_change_callback<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(Option<&LocaleId>, &LocaleId) -> CallbackResult + Send + Sync + 'static,
    {
        self.inner.callbacks.add(callback)
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_locale_change_callback(&self, handle: CallbackHandle) -> bool {
        self.inner.callbacks.remove(handle)
    }

    /// Identifiers of every cached locale, sorted.
    pub fn cached_locales(&self) -> Vec<LocaleId> {
        self.inner.cache.locales()
    }

    /// Whether `locale` is cached and not past its TTL.
    pub fn is_cached(&self, locale: &str) -> bool {
        let Ok(locale) = LocaleId::parse(locale) else {
            return false;
        };
        self.inner.cache.contains(&locale) && !self.inner.cache.is_stale(&locale, Instant::now())
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats(Instant::now())
    }

    /// Start the background refresher.
    ///
    /// Does nothing if it is already running or the refresh interval is
    /// zero. Must be called from within a tokio runtime.
    pub fn start(&self) -> Result<()> {
        // `stop` flips the flag under this lock, so a refresher can never be
        // installed after `stop` has emptied the slot.
        let mut slot = self.inner.refresher.lock();
        if self.inner.stopped.load(Ordering::SeqCst) {
            return Err(LocalEngineError::EngineStopped);
        }
        let Some(interval) = self.inner.config.refresh_interval() else {
            debug!("Refresh interval is zero, background refresher disabled");
            return Ok(());
        };
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(LocalEngineError::Config(
                "background refresher requires a tokio runtime".to_string(),
            ));
        }

        if slot.as_ref().is_some_and(RefresherHandle::is_running) {
            return Ok(());
        }
        let refresher = BackgroundRefresher::new(
            Arc::clone(&self.inner.cache),
            Arc::clone(&self.inner.loader),
            interval,
        );
        *slot = Some(refresher.spawn());
        Ok(())
    }

    /// Whether the background refresher is alive.
    pub fn is_running(&self) -> bool {
        self.inner
            .refresher
            .lock()
            .as_ref()
            .is_some_and(RefresherHandle::is_running)
    }

    /// Stop the refresher, drop all cached data and unregister listeners.
    ///
    /// Waits at most the configured grace period for the refresher to exit.
    /// Calling `stop` again is a no-op. In-flight lookups are not cancelled.
    pub async fn stop(&self) {
        let handle = {
            let mut slot = self.inner.refresher.lock();
            if self.inner.stopped.swap(true, Ordering::SeqCst) {
                return;
            }
            slot.take()
        };
        if let Some(handle) = handle {
            handle.shutdown(self.inner.config.shutdown_grace()).await;
        }

        self.inner.cache.invalidate_all();
        self.inner.callbacks.clear();
        info!("Engine stopped");
    }

    fn target_locale(&self, locale: Option<&str>) -> Result<LocaleId> {
        match locale {
            Some(tag) => LocaleId::parse(tag),
            None => Ok(self.get_current_locale()),
        }
    }

    /// Cached entry for `locale`, loading and installing it on a miss.
    ///
    /// Stale entries are returned as-is; refreshing them is the background
    /// task's job. `None` means the locale could not be loaded.
    async fn entry_or_load(&self, locale: &LocaleId) -> Option<Arc<CacheEntry>> {
        if let Some(entry) = self.inner.cache.get(locale) {
            return Some(entry);
        }

        match self.inner.loader.load(locale).await {
            Ok(loaded) => Some(self.inner.cache.install(locale, loaded, Instant::now())),
            Err(e) => {
                debug!("Locale {} unavailable: {}", locale, e);
                None
            }
        }
    }

    async fn warm(&self, locale: &LocaleId) {
        if self.entry_or_load(locale).await.is_none() {
            warn!("Default locale {} could not be loaded", locale);
        }
    }
}
