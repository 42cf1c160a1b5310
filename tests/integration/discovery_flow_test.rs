// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use eventcrawl::config::settings::Settings;
use eventcrawl::domain::repositories::storage_repository::StorageRepository;
use eventcrawl::engines::fake_browser::{FakeBrowser, FakeDocument};
use eventcrawl::engines::traits::{BrowserDriver, DriverError, ResourceKind};
use eventcrawl::infrastructure::storage::InMemoryStorage;
use eventcrawl::strategies::discovery::DiscoveryStrategy;
use eventcrawl::strategies::traits::{ScrapeStrategy, StrategyError};
use serde_json::json;
use std::sync::Arc;

const SEED_URL: &str = "https://lu.ma/search?q=chiang+mai";
const SEARCH_PREFIX: &str = "https://www.google.com/search";

fn strategy(storage: Arc<InMemoryStorage>) -> DiscoveryStrategy {
    let settings = Settings::defaults().unwrap().discovery;
    DiscoveryStrategy::new(settings, storage)
}

fn search_results() -> FakeDocument {
    FakeDocument::html(
        r#"<html><body>
            <div class="g"><a href="/url?q=https://lu.ma/doi-suthep-hike&amp;sa=U">Doi Suthep Hike</a></div>
            <div class="g"><a href="https://lu.ma/cnx-night-run">Night Run</a></div>
            <div class="g"><a href="https://lu.ma/gone">Removed event</a></div>
            <div class="g"><a href="https://www.facebook.com/events/1">Elsewhere</a></div>
        </body></html>"#,
    )
}

fn hike_page() -> FakeDocument {
    let hike = json!({
        "api_id": "evt-hike",
        "name": "Doi Suthep Hike",
        "url": "doi-suthep-hike",
        "start_at": "2026-02-14T00:00:00.000Z",
        "geo_address_info": { "full_address": "Doi Suthep, Chiang Mai" },
        "cover_url": "https://images.lumacdn.com/hike.png"
    });

    FakeDocument::html("<html><body><h1>Doi Suthep Hike</h1></body></html>")
        .with_evaluation(json!({
            "props": { "pageProps": { "initialData": { "data": { "api_id": "evt-hike", "event": hike.clone() } } } }
        }))
        .with_response(
            "https://api.lu.ma/event/get?event_api_id=evt-hike",
            ResourceKind::Fetch,
            "application/json; charset=utf-8",
            json!({ "api_id": "evt-hike", "event": hike }).to_string(),
        )
        .with_response(
            "https://images.lumacdn.com/hike.png",
            ResourceKind::Image,
            "image/png",
            "",
        )
}

fn night_run_page() -> FakeDocument {
    let discover = json!({
        "entries": [
            {
                "api_id": "evt-run",
                "event": {
                    "api_id": "evt-run",
                    "name": "CNX Night Run",
                    "url": "cnx-night-run",
                    "start_at": "2026-03-01T12:00:00.000Z",
                    "geo_address_info": { "city": "Chiang Mai", "country": "Thailand" }
                }
            },
            {
                "api_id": "evt-hike",
                "event": { "api_id": "evt-hike", "name": "Doi Suthep Hike (duplicate)", "url": "doi-suthep-hike", "start_at": "2026-02-14T00:00:00.000Z" }
            }
        ]
    });

    FakeDocument::html("<html><body></body></html>").with_response(
        "https://api.lu.ma/discover/get-paginated-events",
        ResourceKind::Xhr,
        "application/json",
        discover.to_string(),
    )
}

/// 搜索 → 详情页 → JSON 挖掘 → 规范化的完整流程
#[tokio::test(start_paused = true)]
async fn test_discovery_mines_events_from_detail_pages() {
    let browser = FakeBrowser::new()
        .with_page(SEARCH_PREFIX, search_results())
        .with_page("https://lu.ma/doi-suthep-hike", hike_page())
        .with_page("https://lu.ma/cnx-night-run", night_run_page())
        .with_page("https://lu.ma/gone", FakeDocument::failing());
    let storage = Arc::new(InMemoryStorage::new());
    let strategy = strategy(storage.clone());

    let page = browser.open_page().await.unwrap();
    let events = strategy.scrape(page.as_ref(), SEED_URL).await.unwrap();
    page.close().await.unwrap();

    assert_eq!(events.len(), 2);

    let hike = &events[0];
    assert_eq!(hike.title, "Doi Suthep Hike");
    assert_eq!(hike.url, "https://lu.ma/doi-suthep-hike");
    assert_eq!(hike.location.as_deref(), Some("Doi Suthep, Chiang Mai"));
    assert_eq!(hike.source_domain, "lu.ma");
    assert_eq!(
        hike.start_time.map(|t| t.to_rfc3339()),
        Some("2026-02-14T00:00:00+00:00".to_string())
    );
    assert_eq!(hike.metadata["api_id"], "evt-hike");

    let run = &events[1];
    assert_eq!(run.title, "CNX Night Run");
    assert_eq!(run.url, "https://lu.ma/cnx-night-run");
    assert_eq!(run.location.as_deref(), Some("Chiang Mai, Thailand"));

    // The image response is never read
    assert_eq!(browser.bodies_fetched(), 2);

    let visits = browser.visits().await;
    assert_eq!(visits.len(), 4);
    assert!(visits[0].starts_with("https://www.google.com/search?q=site%3Alu.ma"));
    assert_eq!(&visits[1..], &[
        "https://lu.ma/doi-suthep-hike".to_string(),
        "https://lu.ma/cnx-night-run".to_string(),
        "https://lu.ma/gone".to_string(),
    ]);

    assert!(storage.list("diagnostics/").await.unwrap().is_empty());
}

/// 搜索结果页被拦截时保存诊断快照，并返回空结果而不是错误
#[tokio::test(start_paused = true)]
async fn test_blocked_search_saves_snapshots() {
    let browser = FakeBrowser::new().with_page(
        SEARCH_PREFIX,
        FakeDocument::html("<html><body><p>Our systems have detected unusual traffic</p></body></html>"),
    );
    let storage = Arc::new(InMemoryStorage::new());
    let strategy = strategy(storage.clone());

    let page = browser.open_page().await.unwrap();
    let events = strategy.scrape(page.as_ref(), SEED_URL).await.unwrap();

    assert!(events.is_empty());
    assert_eq!(browser.visits().await.len(), 1);

    let keys = storage.list("diagnostics/").await.unwrap();
    assert_eq!(keys.len(), 2);
    assert!(keys[0].starts_with("diagnostics/search_empty_"));
    assert!(keys[1].starts_with("diagnostics/search_timeout_"));
    assert!(keys.iter().all(|key| key.ends_with(".html")));

    let snapshot = storage.get(&keys[0]).await.unwrap().unwrap();
    assert!(String::from_utf8(snapshot).unwrap().contains("unusual traffic"));
}

#[tokio::test]
async fn test_search_navigation_failure_is_reported() {
    let browser = FakeBrowser::new();
    let strategy = strategy(Arc::new(InMemoryStorage::new()));

    let page = browser.open_page().await.unwrap();
    let result = strategy.scrape(page.as_ref(), SEED_URL).await;

    assert!(matches!(
        result,
        Err(StrategyError::Driver(DriverError::Navigation { .. }))
    ));
}
