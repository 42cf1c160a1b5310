// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::setup_db;
use eventcrawl::config::settings::Settings;
use eventcrawl::domain::repositories::event_repository::EventRepository;
use eventcrawl::engines::fake_browser::{FakeBrowser, FakeDocument};
use eventcrawl::engines::traits::ResourceKind;
use eventcrawl::infrastructure::repositories::event_repo_impl::EventRepositoryImpl;
use eventcrawl::infrastructure::repositories::source_repo_impl::SourceRepositoryImpl;
use eventcrawl::infrastructure::storage::InMemoryStorage;
use eventcrawl::strategies::discovery::DiscoveryStrategy;
use eventcrawl::strategies::registry::{StrategyRegistry, LUMA_SEARCH_V2};
use eventcrawl::workers::scheduler::{CrawlScheduler, CycleOutcome, SaveReport};
use serde_json::json;
use std::sync::Arc;

/// 种子写入 → 发现策略 → 事件落库 → 数据源不再到期
#[tokio::test]
async fn test_seeded_source_is_crawled_once() {
    let mut settings = Settings::defaults().unwrap();
    settings.discovery.settle_delay_ms = 0;

    let db = setup_db().await;
    let sources = Arc::new(SourceRepositoryImpl::new(db.clone()));
    let events = Arc::new(EventRepositoryImpl::new(db));

    let mut registry = StrategyRegistry::new();
    registry.register(
        LUMA_SEARCH_V2,
        Arc::new(DiscoveryStrategy::new(
            settings.discovery.clone(),
            Arc::new(InMemoryStorage::new()),
        )),
    );

    let event = json!({
        "api_id": "evt-market",
        "event": {
            "api_id": "evt-market",
            "name": "Nimman Night Market",
            "url": "nimman-night-market",
            "start_at": "2026-02-20T11:00:00.000Z"
        }
    });
    let browser = FakeBrowser::new()
        .with_page(
            "https://www.google.com/search",
            FakeDocument::html(r#"<div class="g"><a href="https://lu.ma/nimman-night-market">Market</a></div>"#),
        )
        .with_page(
            "https://lu.ma/nimman-night-market",
            FakeDocument::html("<html></html>").with_response(
                "https://api.lu.ma/event/get",
                ResourceKind::Fetch,
                "application/json",
                event.to_string(),
            ),
        );

    let scheduler = CrawlScheduler::new(
        sources,
        events.clone(),
        Arc::new(registry),
        Arc::new(browser.clone()),
        settings.scheduler.clone(),
    );

    let seeded = scheduler.seed_if_empty().await.unwrap().unwrap();
    assert_eq!(seeded.strategy_key, LUMA_SEARCH_V2);
    assert!(scheduler.seed_if_empty().await.unwrap().is_none());

    let outcome = scheduler.run_cycle().await.unwrap();
    assert_eq!(
        outcome,
        CycleOutcome::Crawled {
            source_id: seeded.id,
            report: SaveReport {
                saved: 1,
                failed: 0,
                skipped: 0
            },
            advanced: true,
        }
    );

    let stored = events
        .find_by_url("https://lu.ma/nimman-night-market")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "Nimman Night Market");

    assert_eq!(scheduler.run_cycle().await.unwrap(), CycleOutcome::Idle);
    assert_eq!(browser.pages_opened(), 1);
    assert_eq!(browser.pages_closed(), 1);
}
