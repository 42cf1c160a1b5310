// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::Utc;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::settings::DiscoverySettings;
use crate::domain::models::event::CanonicalEvent;
use crate::domain::repositories::storage_repository::StorageRepository;
use crate::engines::traits::{PageSession, WaitCondition};
use crate::strategies::collector::JsonResponseCollector;
use crate::strategies::miner::EventMiner;
use crate::strategies::normalize::normalize_candidates;
use crate::strategies::registry::LUMA_SEARCH_V2;
use crate::strategies::traits::{ScrapeStrategy, StrategyError};
use crate::utils::url_utils::host_matches;

const NEXT_DATA_SCRIPT: &str = r#"(() => {
    const script = document.getElementById('__NEXT_DATA__');
    return script ? JSON.parse(script.textContent) : null;
})()"#;

/// 发现策略
///
/// 目标站点的搜索页由客户端渲染，直接抓取拿不到事件。这里改为：
/// 通过搜索引擎的 `site:` 查询找到目标站点的事件详情页，逐个访问，
/// 从导航期间的 JSON 响应和页面内嵌的 `__NEXT_DATA__` 中挖掘事件。
pub struct DiscoveryStrategy {
    settings: DiscoverySettings,
    storage: Arc<dyn StorageRepository>,
    miner: EventMiner,
}

impl DiscoveryStrategy {
    pub fn new(settings: DiscoverySettings, storage: Arc<dyn StorageRepository>) -> Self {
        let miner = EventMiner::new(settings.max_mining_depth, settings.max_mining_nodes);
        Self {
            settings,
            storage,
            miner,
        }
    }

    /// 由数据源URL构造搜索引擎查询：`site:<目标站点> "<q>"`
    pub fn search_query(&self, url: &str) -> String {
        let query = Url::parse(url)
            .ok()
            .and_then(|u| {
                u.query_pairs()
                    .find(|(key, _)| key == "q")
                    .map(|(_, value)| value.trim().to_string())
            })
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| self.settings.default_query.clone());

        format!("site:{} \"{}\"", self.settings.target_host, query)
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}?q={}",
            self.settings.search_base_url,
            urlencoding::encode(query)
        )
    }

    /// 从搜索结果页提取指向目标站点的链接
    ///
    /// 解开 `/url?q=` 形式的跳转链接，排除搜索引擎自身的链接，按出现顺序去重并截断
    pub fn extract_links(&self, html: &str) -> Vec<String> {
        let selector = match Selector::parse(&format!("{} a", self.settings.result_marker_selector))
        {
            Ok(selector) => selector,
            Err(e) => {
                warn!("Invalid result selector: {}", e);
                return Vec::new();
            }
        };

        let Ok(search_base) = Url::parse(&self.settings.search_base_url) else {
            return Vec::new();
        };
        let search_host = search_base.host_str().unwrap_or_default().to_string();

        let document = Html::parse_document(html);
        let mut seen = HashSet::new();

        document
            .select(&selector)
            .filter_map(|anchor| anchor.value().attr("href"))
            .filter_map(|href| unwrap_redirect(&search_base, href))
            .filter(|link| {
                link.host_str().is_some_and(|host| {
                    host_matches(host, &self.settings.target_host) && !host_matches(host, &search_host)
                })
            })
            .map(|link| link.to_string())
            .filter(|link| seen.insert(link.clone()))
            .take(self.settings.max_links)
            .collect()
    }

    async fn save_snapshot(&self, page: &dyn PageSession, kind: &str) {
        let html = match page.content().await {
            Ok(html) => html,
            Err(e) => {
                warn!("Could not read page for {} snapshot: {}", kind, e);
                return;
            }
        };

        let key = format!(
            "diagnostics/{}_{}.html",
            kind,
            Utc::now().format("%Y%m%dT%H%M%S%3f")
        );
        match self.storage.save(&key, html.as_bytes()).await {
            Ok(()) => info!("Saved diagnostic snapshot to {}", key),
            Err(e) => warn!("Failed to save diagnostic snapshot {}: {}", key, e),
        }
    }

    async fn mine_detail_page(
        &self,
        page: &dyn PageSession,
        link: &str,
        collector: &mut JsonResponseCollector,
    ) -> Result<(), StrategyError> {
        info!("Visiting event page: {}", link);
        page.navigate(link, WaitCondition::DomContentLoaded, Some(&mut *collector))
            .await?;

        let next_data = page.evaluate(NEXT_DATA_SCRIPT).await?;
        if next_data.is_null() {
            warn!("No __NEXT_DATA__ found on {}", link);
        } else {
            collector.mine_value(&next_data, link);
        }

        tokio::time::sleep(Duration::from_millis(self.settings.settle_delay_ms)).await;
        Ok(())
    }
}

/// 搜索引擎结果中的 `/url?q=<目标>` 跳转链接还原为目标URL
fn unwrap_redirect(search_base: &Url, href: &str) -> Option<Url> {
    let resolved = search_base.join(href).ok()?;
    if resolved.path() == "/url" {
        let target = resolved
            .query_pairs()
            .find(|(key, _)| key == "q" || key == "url")
            .map(|(_, value)| value.into_owned())?;
        return Url::parse(&target).ok();
    }
    Some(resolved)
}

#[async_trait]
impl ScrapeStrategy for DiscoveryStrategy {
    fn name(&self) -> &'static str {
        LUMA_SEARCH_V2
    }

    fn can_handle(&self, url: &str) -> bool {
        Url::parse(url)
            .map(|u| {
                u.host_str()
                    .is_some_and(|host| host_matches(host, &self.settings.target_host))
                    && u.path().contains("search")
            })
            .unwrap_or(false)
    }

    #[instrument(skip(self, page))]
    async fn scrape(
        &self,
        page: &dyn PageSession,
        url: &str,
    ) -> Result<Vec<CanonicalEvent>, StrategyError> {
        let mut collector = JsonResponseCollector::new(self.miner);

        let query = self.search_query(url);
        info!("Searching for: {}", query);
        page.navigate(
            &self.search_url(&query),
            WaitCondition::DomContentLoaded,
            Some(&mut collector),
        )
        .await?;

        let timeout = Duration::from_secs(self.settings.result_wait_timeout_secs);
        let found = match page
            .wait_for_selector(&self.settings.result_marker_selector, timeout)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                warn!("Waiting for search results failed: {}", e);
                false
            }
        };
        if !found {
            warn!("Search result marker did not appear, saving snapshot");
            self.save_snapshot(page, "search_timeout").await;
        }

        let html = page.content().await?;
        let links = self.extract_links(&html);
        info!("Found {} potential event links: {:?}", links.len(), links);

        if links.is_empty() {
            warn!("Search returned no event links, saving snapshot");
            self.save_snapshot(page, "search_empty").await;
        }

        for link in &links {
            if let Err(e) = self.mine_detail_page(page, link, &mut collector).await {
                warn!("Failed to scrape {}: {}", link, e);
            }
        }

        let bodies = collector.bodies_seen();
        let candidates = collector.into_candidates();
        let events = normalize_candidates(&candidates, &self.settings.target_host);
        info!(
            "Extracted {} unique events from {} candidates ({} JSON bodies)",
            events.len(),
            candidates.len(),
            bodies
        );
        Ok(events)
    }
}
