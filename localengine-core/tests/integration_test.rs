//! Integration tests for localengine-core

use async_trait::async_trait;
use localengine_core::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn locale(tag: &str) -> LocaleId {
    LocaleId::parse(tag).unwrap()
}

/// Loader that fails for one locale and counts every call.
struct FlakyLoader {
    inner: MemoryLoader,
    broken: LocaleId,
    calls: AtomicUsize,
}

#[async_trait]
impl Loader for FlakyLoader {
    async fn load(&self, locale: &LocaleId) -> std::result::Result<LoadedLocale, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *locale == self.broken {
            return Err(LoadError::Parse {
                locale: locale.to_string(),
                message: "unexpected end of input".to_string(),
            });
        }
        self.inner.load(locale).await
    }

    async fn list_available(&self) -> std::result::Result<Vec<LocaleId>, LoadError> {
        Err(LoadError::Other("listing not supported".to_string()))
    }
}

fn flaky_loader() -> Arc<FlakyLoader> {
    let inner = MemoryLoader::new()
        .with_locale(locale("en-US"), TranslationTree::new().with("greeting", "Hello"))
        .with_locale(locale("de-DE"), TranslationTree::new().with("greeting", "Hallo"));
    Arc::new(FlakyLoader {
        inner,
        broken: locale("de-AT"),
        calls: AtomicUsize::new(0),
    })
}

async fn engine(loader: Arc<FlakyLoader>) -> LocalEngine {
    LocalEngine::builder(loader)
        .config(EngineConfig::default().with_auto_detect(false))
        .spawn_refresher(false)
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_broken_candidate_is_skipped() {
    let engine = engine(flaky_loader()).await;
    let text = engine.get_text("greeting", Some("de-AT"), None).await.unwrap();
    assert_eq!(text, "Hallo");
}

#[tokio::test]
async fn test_reload_surfaces_parse_error() {
    let engine = engine(flaky_loader()).await;
    let err = engine.reload_locale(Some("de-AT")).await.unwrap_err();
    assert!(matches!(
        err,
        LocalEngineError::LocaleFile { source: LoadError::Parse { .. }, .. }
    ));
}

#[tokio::test]
async fn test_cached_lookups_do_not_reload() {
    let loader = flaky_loader();
    let engine = engine(Arc::clone(&loader)).await;
    let after_build = loader.calls.load(Ordering::SeqCst);

    for _ in 0..10 {
        assert_eq!(engine.get_text("greeting", None, None).await.unwrap(), "Hello");
    }
    assert_eq!(loader.calls.load(Ordering::SeqCst), after_build);
}

#[tokio::test]
async fn test_available_locales_survive_listing_failure() {
    let engine = engine(flaky_loader()).await;
    engine.get_text("greeting", Some("de-DE"), None).await.unwrap();
    assert_eq!(
        engine.get_available_locales().await,
        vec![locale("de-DE"), locale("en-US")]
    );
}

#[tokio::test]
async fn test_separate_engines_are_independent() {
    let first = engine(flaky_loader()).await;
    let second = engine(flaky_loader()).await;

    first.set_locale("de-DE").await.unwrap();
    second.clear_cache(None).unwrap();

    assert_eq!(first.get_current_locale(), locale("de-DE"));
    assert_eq!(second.get_current_locale(), locale("en-US"));
    assert!(first.is_cached("en-US"));
    assert!(!second.is_cached("en-US"));
}

#[tokio::test(start_paused = true)]
async fn test_refresher_stops_within_grace() {
    let engine = LocalEngine::builder(flaky_loader())
        .config(
            EngineConfig::default()
                .with_auto_detect(false)
                .with_refresh_interval(Duration::from_secs(60))
                .with_shutdown_grace(Duration::from_millis(100)),
        )
        .build()
        .await
        .unwrap();
    assert!(engine.is_running());

    tokio::time::timeout(Duration::from_millis(150), engine.stop())
        .await
        .unwrap();
    assert!(!engine.is_running());
}

#[test]
fn test_error_display() {
    let err = LocalEngineError::LocaleNotFound {
        locale: "xx-YY".to_string(),
    };
    assert!(err.to_string().contains("xx-YY"));
    assert!(err.is_not_found());
    assert!(!LocalEngineError::EngineStopped.is_not_found());
}

#[test]
fn test_chain_is_public() {
    let chain = resolve_chain(&locale("zh-TW"), &locale("en-US"));
    assert_eq!(chain, vec![locale("zh-TW"), locale("zh"), locale("zh-CN"), locale("en-US")]);
    assert_eq!(canonical_variant("ja"), Some(locale("ja-JP")));
}
