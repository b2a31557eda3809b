use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use taskforge_orchestrator::domain::models::{CapabilityCategory, Pattern, ProviderProfile, ProviderStatus};
use taskforge_orchestrator::infrastructure::config::QualityFloor;
use taskforge_orchestrator::services::{StrategySelector, TaskAnalyzer};

fn sample_providers(n: usize) -> Vec<ProviderProfile> {
    (0..n)
        .map(|i| {
            ProviderProfile::new(format!("provider-{i}"))
                .with_capabilities([CapabilityCategory::Search, CapabilityCategory::Web, CapabilityCategory::Development])
                .with_status(ProviderStatus::Connected)
                .with_priority(1.0)
        })
        .collect()
}

/// Selector scoring cost as the registry grows, always missing the cache
/// (provider signature changes with every added provider).
fn benchmark_select_by_registry_size(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("strategy_selector_by_registry_size");

    let analyzer = TaskAnalyzer::new(64);
    let analysis = rt
        .block_on(analyzer.analyze(
            "first search github for mcp servers, then clone the top 3, analyze their code, \
             and produce a comparison report",
        ))
        .unwrap();
    let success_rates: HashMap<Pattern, f64> = HashMap::new();

    for size in [1usize, 8, 32, 128] {
        let providers = sample_providers(size);
        let selector = StrategySelector::new(0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &providers, |b, providers| {
            b.to_async(&rt).iter(|| async {
                selector
                    .select(
                        black_box(&analysis),
                        black_box(providers),
                        QualityFloor::Good,
                        &success_rates,
                    )
                    .await
            });
        });
    }

    group.finish();
}

fn benchmark_select_warm_cache(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let analyzer = TaskAnalyzer::new(64);
    let analysis = rt.block_on(analyzer.analyze("read the file notes.txt")).unwrap();
    let providers = sample_providers(8);
    let success_rates: HashMap<Pattern, f64> = HashMap::new();

    let selector = StrategySelector::new(64);
    rt.block_on(selector.select(&analysis, &providers, QualityFloor::Acceptable, &success_rates));

    c.bench_function("strategy_selector_warm_cache_hit", |b| {
        b.to_async(&rt).iter(|| async {
            selector
                .select(
                    black_box(&analysis),
                    black_box(&providers),
                    QualityFloor::Acceptable,
                    &success_rates,
                )
                .await
        });
    });
}

criterion_group!(benches, benchmark_select_by_registry_size, benchmark_select_warm_cache);
criterion_main!(benches);
