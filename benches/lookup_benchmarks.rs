//! Lookup benchmarks for localengine

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use localengine::prelude::*;
use std::hint::black_box;
use std::sync::Arc;

fn sample_tree(width: usize) -> TranslationTree {
    let mut section = TranslationTree::new();
    for i in 0..width {
        section.insert(format!("key_{}", i), format!("value {}", i));
    }
    TranslationTree::new()
        .with("greeting", "Hello")
        .with("section", TranslationTree::new().with("nested", section))
}

fn build_engine(rt: &tokio::runtime::Runtime) -> LocalEngine {
    let loader = MemoryLoader::new()
        .with_locale(LocaleId::parse("en-US").unwrap(), sample_tree(200))
        .with_locale(LocaleId::parse("es-ES").unwrap(), sample_tree(200));

    rt.block_on(async {
        let engine = LocalEngine::builder(Arc::new(loader))
            .config(EngineConfig::default().with_auto_detect(false))
            .spawn_refresher(false)
            .build()
            .await
            .unwrap();
        // Warm the fallback target so the benchmark measures cached lookups.
        engine.get_text("greeting", Some("es-ES"), None).await.unwrap();
        engine
    })
}

fn lookup_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let engine = build_engine(&rt);

    let mut group = c.benchmark_group("lookup");
    group.throughput(Throughput::Elements(1));

    group.bench_function("cached_flat_key", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(engine.get_text("greeting", None, None).await.unwrap()) });
    });

    group.bench_function("cached_nested_key", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(engine.get_text("section.nested.key_150", None, None).await.unwrap())
        });
    });

    group.bench_function("regional_fallback", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(engine.get_text("greeting", Some("es-MX"), None).await.unwrap())
        });
    });

    group.bench_function("missing_key_with_default", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(engine.get_text("no.such.key", None, Some("-")).await.unwrap())
        });
    });

    group.finish();
}

fn resolver_benchmark(c: &mut Criterion) {
    let tree = sample_tree(1000);
    let requested = LocaleId::parse("pt-BR").unwrap();
    let default = LocaleId::parse("en-US").unwrap();

    let mut group = c.benchmark_group("resolver");

    group.bench_function("resolve_chain", |b| {
        b.iter(|| black_box(resolve_chain(black_box(&requested), black_box(&default))));
    });

    group.bench_function("resolve_dotted_key", |b| {
        b.iter(|| black_box(tree.resolve_text(black_box("section.nested.key_999"))));
    });

    group.finish();
}

criterion_group!(benches, lookup_benchmark, resolver_benchmark);
criterion_main!(benches);
