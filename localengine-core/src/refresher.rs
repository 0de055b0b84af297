//! Periodic background refresh of stale cache entries.

use crate::cache::CacheStore;
use crate::loader::Loader;
use localengine_log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Outcome of one refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Stale entries found at the start of the cycle
    pub stale: usize,
    /// Entries replaced with freshly loaded data
    pub refreshed: usize,
    /// Reloads that failed; the old entry was kept
    pub failed: usize,
}

/// Reloads stale entries through the loader on a fixed period.
///
/// The loader call runs without any lock held; only the final swap into
/// the [`CacheStore`] is synchronized. Failures keep the stale entry in place
/// and are logged, never propagated.
pub struct BackgroundRefresher {
    cache: Arc<CacheStore>,
    loader: Arc<dyn Loader>,
    interval: Duration,
}

impl BackgroundRefresher {
    pub fn new(cache: Arc<CacheStore>, loader: Arc<dyn Loader>, interval: Duration) -> Self {
        Self {
            cache,
            loader,
            interval,
        }
    }

    /// Period between cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single refresh pass over the stale entries.
    pub async fn run_cycle(&self) -> RefreshReport {
        let stale = self.cache.stale_locales(Instant::now());
        let mut report = RefreshReport {
            stale: stale.len(),
            ..RefreshReport::default()
        };

        for locale in stale {
            match self.loader.load(&locale).await {
                Ok(loaded) => {
                    if self.cache.replace_existing(&locale, loaded, Instant::now()) {
                        report.refreshed += 1;
                    } else {
                        debug!("Locale {} was evicted during refresh, not reinstalling", locale);
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    warn!("Background refresh of locale {} failed: {}", locale, e);
                }
            }
        }

        if report.stale > 0 {
            debug!(
                "Refresh cycle: {} stale, {} refreshed, {} failed",
                report.stale, report.refreshed, report.failed
            );
        }
        report
    }

    /// Start the periodic task on the current tokio runtime.
    pub fn spawn(self) -> RefresherHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        info!("Starting background refresher (interval {:?})", self.interval);
        let task = tokio::spawn(self.run(shutdown_rx));

        RefresherHandle {
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    // A dropped sender counts as a stop request.
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            if *shutdown.borrow() {
                break;
            }
            self.run_cycle().await;
        }

        info!("Background refresher stopped");
    }
}

/// Owner of a running refresher task.
///
/// Dropping the handle signals the task and aborts it without waiting.
#[derive(Debug)]
pub struct RefresherHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl RefresherHandle {
    /// Whether the task is still alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Ask the task to stop at its next check point.
    pub fn signal(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Signal the task and wait up to `grace` for it to exit.
    ///
    /// Returns `true` if the task exited in time; otherwise it is aborted
    /// and `false` is returned.
    pub async fn shutdown(mut self, grace: Duration) -> bool {
        self.signal();
        let Some(mut task) = self.task.take() else {
            return true;
        };

        match tokio::time::timeout(grace, &mut task).await {
            Ok(_) => true,
            Err(_) => {
                warn!("Background refresher did not stop within {:?}, aborting", grace);
                task.abort();
                false
            }
        }
    }
}

impl Drop for RefresherHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = self.shutdown.send(true);
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::loader::{LoadedLocale, Metadata, MemoryLoader};
    use crate::locale::LocaleId;
    use crate::tree::TranslationTree;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn locale(tag: &str) -> LocaleId {
        LocaleId::parse(tag).unwrap()
    }

    fn tree(text: &str) -> TranslationTree {
        TranslationTree::new().with("greeting", text)
    }

    fn greeting(cache: &CacheStore, tag: &str) -> Option<String> {
        cache
            .get(&locale(tag))
            .and_then(|e| e.tree.resolve_text("greeting").map(str::to_string))
    }

    /// Loader that never finishes, to exercise the shutdown grace period.
    struct HangingLoader;

    #[async_trait]
    impl Loader for HangingLoader {
        async fn load(&self, _locale: &LocaleId) -> Result<LoadedLocale, LoadError> {
            std::future::pending().await
        }

        async fn list_available(&self) -> Result<Vec<LocaleId>, LoadError> {
            Ok(Vec::new())
        }
    }

    struct CountingLoader {
        inner: MemoryLoader,
        loads: AtomicUsize,
    }

    #[async_trait]
    impl Loader for CountingLoader {
        async fn load(&self, locale: &LocaleId) -> Result<LoadedLocale, LoadError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load(locale).await
        }

        async fn list_available(&self) -> Result<Vec<LocaleId>, LoadError> {
            self.inner.list_available().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_refreshes_only_stale_entries() {
        let cache = Arc::new(CacheStore::new(Duration::from_secs(10)));
        let loader = Arc::new(MemoryLoader::new());
        loader.insert(locale("en-US"), tree("Hello again"), Metadata::default());
        loader.insert(locale("de-DE"), tree("Hallo wieder"), Metadata::default());

        cache.put(&locale("en-US"), tree("Hello"), Metadata::default(), Instant::now());
        tokio::time::advance(Duration::from_secs(6)).await;
        cache.put(&locale("de-DE"), tree("Hallo"), Metadata::default(), Instant::now());
        tokio::time::advance(Duration::from_secs(5)).await;

        let refresher = BackgroundRefresher::new(Arc::clone(&cache), loader, Duration::from_secs(1));
        let report = refresher.run_cycle().await;

        assert_eq!(report, RefreshReport { stale: 1, refreshed: 1, failed: 0 });
        assert_eq!(greeting(&cache, "en-US").as_deref(), Some("Hello again"));
        assert_eq!(greeting(&cache, "de-DE").as_deref(), Some("Hallo"));
        assert!(!cache.is_stale(&locale("en-US"), Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reload_keeps_stale_entry() {
        let cache = Arc::new(CacheStore::new(Duration::from_secs(1)));
        cache.put(&locale("fr-FR"), tree("Bonjour"), Metadata::default(), Instant::now());
        tokio::time::advance(Duration::from_millis(1500)).await;

        let refresher =
            BackgroundRefresher::new(Arc::clone(&cache), Arc::new(MemoryLoader::new()), Duration::from_secs(1));
        let report = refresher.run_cycle().await;

        assert_eq!(report, RefreshReport { stale: 1, refreshed: 0, failed: 1 });
        assert_eq!(greeting(&cache, "fr-FR").as_deref(), Some("Bonjour"));
        assert!(cache.is_stale(&locale("fr-FR"), Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_task_reloads_and_stops() {
        let cache = Arc::new(CacheStore::new(Duration::from_secs(5)));
        let inner = MemoryLoader::new();
        inner.insert(locale("es-ES"), tree("Hola de nuevo"), Metadata::default());
        let loader = Arc::new(CountingLoader {
            inner,
            loads: AtomicUsize::new(0),
        });
        cache.put(&locale("es-ES"), tree("Hola"), Metadata::default(), Instant::now());

        let handle = BackgroundRefresher::new(
            Arc::clone(&cache),
            Arc::clone(&loader) as Arc<dyn Loader>,
            Duration::from_secs(2),
        )
        .spawn();
        assert!(handle.is_running());

        // Cycles at t=2 and t=4 find nothing stale; t=6 reloads.
        tokio::time::sleep(Duration::from_secs(7)).await;
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert_eq!(greeting(&cache, "es-ES").as_deref(), Some("Hola de nuevo"));

        assert!(handle.shutdown(Duration::from_secs(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_wakes_sleeping_task() {
        let cache = Arc::new(CacheStore::new(Duration::from_secs(60)));
        let handle = BackgroundRefresher::new(cache, Arc::new(MemoryLoader::new()), Duration::from_secs(3600))
            .spawn();

        let started = Instant::now();
        assert!(handle.shutdown(Duration::from_secs(1)).await);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_aborts_after_grace() {
        let cache = Arc::new(CacheStore::new(Duration::from_millis(10)));
        cache.put(&locale("ko-KR"), tree("annyeong"), Metadata::default(), Instant::now());
        let handle = BackgroundRefresher::new(Arc::clone(&cache), Arc::new(HangingLoader), Duration::from_millis(50))
            .spawn();

        // Let the task enter a load that never completes.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!handle.shutdown(Duration::from_millis(200)).await);
        assert_eq!(greeting(&cache, "ko-KR").as_deref(), Some("annyeong"));
    }
}
