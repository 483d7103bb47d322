use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use metrics_util::debugging::DebuggingRecorder;
use uuid::Uuid;

use arbor::application::categories::{
    CascadePolicy, CategoryService, CreateCategoryCommand,
};
use arbor::cache::{CacheConfig, CacheCoordinator, MemoryCache};
use arbor::infra::memory::InMemoryCategories;

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let config = CacheConfig {
        capacity: 1,
        ..Default::default()
    };
    let backend = Arc::new(MemoryCache::with_capacity(NonZeroUsize::MIN));
    let cache = CacheCoordinator::new(backend, config);
    let repo = InMemoryCategories::new();
    let service = CategoryService::new(
        Arc::new(repo.clone()),
        Arc::new(repo),
        cache,
        CascadePolicy::default(),
    );

    let first = service
        .create_category(CreateCategoryCommand {
            name: "Peripherals".to_string(),
            parent_id: None,
        })
        .await
        .expect("create first");
    let second = service
        .create_category(CreateCategoryCommand {
            name: "Keyboards".to_string(),
            parent_id: Some(first.id),
        })
        .await
        .expect("create second");

    // miss then hit on the node key
    service.get_category(first.id).await.expect("first read");
    service.get_category(first.id).await.expect("cached read");
    // a second key pushes the first out of a single-slot cache
    service.get_category(second.id).await.expect("second read");
    // collection miss
    service.list_categories().await.expect("listing");

    assert!(service.get_category(Uuid::new_v4()).await.is_err());

    let snapshot = snapshotter.snapshot().into_vec();
    let names: HashSet<String> = snapshot
        .iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for metric in [
        "arbor_cache_hit_total",
        "arbor_cache_miss_total",
        "arbor_cache_evict_total",
    ] {
        assert!(names.contains(metric), "missing metric: {metric}");
    }

    let kinds: HashSet<String> = snapshot
        .iter()
        .filter(|(composite_key, _, _, _)| composite_key.key().name() == "arbor_cache_miss_total")
        .flat_map(|(composite_key, _, _, _)| {
            composite_key
                .key()
                .labels()
                .filter(|label| label.key() == "kind")
                .map(|label| label.value().to_string())
                .collect::<Vec<_>>()
        })
        .collect();
    assert!(kinds.contains("node"));
    assert!(kinds.contains("collection"));
}
