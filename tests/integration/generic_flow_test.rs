// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::setup_db;
use super::rule_generator_test::{completion, settings_for};
use eventcrawl::config::settings::Settings;
use eventcrawl::domain::repositories::rule_repository::RuleRepository;
use eventcrawl::domain::services::rule_engine::AdaptiveRuleEngine;
use eventcrawl::domain::services::rule_generator::LlmRuleGenerator;
use eventcrawl::engines::fake_browser::{FakeBrowser, FakeDocument};
use eventcrawl::engines::traits::BrowserDriver;
use eventcrawl::infrastructure::repositories::rule_repo_impl::RuleRepositoryImpl;
use eventcrawl::strategies::generic::GenericStrategy;
use eventcrawl::strategies::traits::ScrapeStrategy;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CALENDAR_URL: &str = "https://events.example.org/calendar/march";

fn calendar_page() -> FakeDocument {
    FakeDocument::html(
        r#"<html><body><ul>
            <li class="listing">
                <h2>Lantern Workshop</h2>
                <time>2026-03-07T18:00:00+07:00</time>
                <span class="venue">Wat Phan Tao</span>
                <a class="more" href="/e/lantern-workshop">More</a>
            </li>
            <li class="listing">
                <h2>Sunday Walking Street</h2>
                <time>Every Sunday</time>
                <a class="more" href="https://events.example.org/e/walking-street">More</a>
            </li>
            <li class="listing"><h2>Sold out</h2></li>
        </ul></body></html>"#,
    )
}

/// 首次访问生成规则并持久化，再次访问命中缓存
#[tokio::test]
async fn test_generated_rules_are_applied_and_reused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"event_card_selector": "li.listing", "title_selector": "h2", "date_selector": "time", "location_selector": ".venue", "link_selector": "a.more"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let db = setup_db().await;
    let rule_repo = Arc::new(RuleRepositoryImpl::new(db));
    let generator = Arc::new(LlmRuleGenerator::new(&settings_for(&server)).unwrap());
    let engine = Arc::new(AdaptiveRuleEngine::new(rule_repo.clone(), generator));
    let strategy = GenericStrategy::new(engine.clone());

    let browser = FakeBrowser::new().with_page(CALENDAR_URL, calendar_page());

    for _ in 0..2 {
        let page = browser.open_page().await.unwrap();
        let events = strategy.scrape(page.as_ref(), CALENDAR_URL).await.unwrap();
        page.close().await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Lantern Workshop");
        assert_eq!(events[0].url, "https://events.example.org/e/lantern-workshop");
        assert_eq!(events[0].location.as_deref(), Some("Wat Phan Tao"));
        assert!(events[0].start_time.is_some());
        assert_eq!(events[1].title, "Sunday Walking Street");
        assert!(events[1].start_time.is_none());
        assert_eq!(events[1].metadata["date_text"], "Every Sunday");
    }

    assert_eq!(engine.cached_domains(), 1);
    let stored = rule_repo.find_by_domain("events.example.org").await.unwrap().unwrap();
    assert_eq!(stored.event_card_selector, "li.listing");
    assert_eq!(stored.location_selector, ".venue");
}

/// 未配置规则生成服务时使用兜底选择器
#[tokio::test]
async fn test_unconfigured_generator_uses_fallback_rules() {
    let db = setup_db().await;
    let rule_repo = Arc::new(RuleRepositoryImpl::new(db));
    let settings = Settings::defaults().unwrap().rule_generator;
    let generator = Arc::new(LlmRuleGenerator::new(&settings).unwrap());
    let engine = Arc::new(AdaptiveRuleEngine::new(rule_repo.clone(), generator));
    let strategy = GenericStrategy::new(engine);

    let browser = FakeBrowser::new().with_page(
        "https://cnx.example.com/whats-on",
        FakeDocument::html(
            r#"<div class="event-card"><h3>Jazz Night</h3><a href="/jazz">Tickets</a></div>"#,
        ),
    );

    let page = browser.open_page().await.unwrap();
    let events = strategy
        .scrape(page.as_ref(), "https://cnx.example.com/whats-on")
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].url, "https://cnx.example.com/jazz");

    let stored = rule_repo.find_by_domain("cnx.example.com").await.unwrap().unwrap();
    assert_eq!(stored.event_card_selector, "div.event-card");
}
