// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use url::Url;

use crate::domain::models::event::{parse_timestamp, CanonicalEvent};
use crate::domain::models::rule::RuleSet;
use crate::domain::repositories::rule_repository::RuleRepository;
use crate::domain::services::rule_engine::AdaptiveRuleEngine;
use crate::engines::traits::{PageSession, WaitCondition};
use crate::strategies::registry::GENERIC_ADAPTIVE;
use crate::strategies::traits::{ScrapeStrategy, StrategyError};
use crate::utils::url_utils::resolve_url;

/// 通用自适应提取策略
///
/// 渲染页面后向规则引擎索取该域名的选择器，再按卡片提取事件
pub struct GenericStrategy<R: RuleRepository> {
    engine: Arc<AdaptiveRuleEngine<R>>,
}

impl<R: RuleRepository> GenericStrategy<R> {
    pub fn new(engine: Arc<AdaptiveRuleEngine<R>>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl<R: RuleRepository + 'static> ScrapeStrategy for GenericStrategy<R> {
    fn name(&self) -> &'static str {
        GENERIC_ADAPTIVE
    }

    fn can_handle(&self, url: &str) -> bool {
        Url::parse(url)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
            .unwrap_or(false)
    }

    #[instrument(skip(self, page))]
    async fn scrape(
        &self,
        page: &dyn PageSession,
        url: &str,
    ) -> Result<Vec<CanonicalEvent>, StrategyError> {
        let page_url = Url::parse(url).map_err(|e| StrategyError::InvalidUrl(e.to_string()))?;
        let domain = page_url
            .host_str()
            .ok_or_else(|| StrategyError::InvalidUrl(format!("{} has no host", url)))?
            .to_string();

        page.navigate(url, WaitCondition::Load, None).await?;
        let html = page.content().await?;

        let rules = self.engine.get_or_generate_rule(&domain, &html).await;
        let events = extract_events(&html, &rules, &page_url);

        info!("Extracted {} events from {}", events.len(), url);
        Ok(events)
    }
}

fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Invalid selector {:?}: {}", raw, e);
            None
        }
    }
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

fn scoped_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector).next().and_then(element_text)
}

fn scoped_link(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = card.select(selector).next()?;
    element
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .or_else(|| element_text(element))
}

/// 按规则从渲染后的 HTML 中提取事件
///
/// 所有子选择器都只在各自的卡片内查找。缺少标题或链接的卡片被丢弃，
/// 任一选择器无效时返回空列表。
///
/// # 参数
///
/// * `html` - 渲染后的页面 HTML
/// * `rules` - 该域名的规则集
/// * `page_url` - 页面URL，用于解析相对链接和确定来源域名
pub fn extract_events(html: &str, rules: &RuleSet, page_url: &Url) -> Vec<CanonicalEvent> {
    let (Some(card), Some(title), Some(date), Some(location), Some(link)) = (
        parse_selector(&rules.event_card_selector),
        parse_selector(&rules.title_selector),
        parse_selector(&rules.date_selector),
        parse_selector(&rules.location_selector),
        parse_selector(&rules.link_selector),
    ) else {
        return Vec::new();
    };

    let source_domain = page_url.host_str().unwrap_or_default().to_string();
    let document = Html::parse_document(html);

    document
        .select(&card)
        .filter_map(|element| {
            let title = scoped_text(element, &title)?;
            let href = scoped_link(element, &link)?;
            let url = resolve_url(page_url, &href).ok()?;
            let date_text = scoped_text(element, &date);

            Some(CanonicalEvent {
                title,
                url: url.to_string(),
                start_time: date_text.as_deref().and_then(parse_timestamp),
                end_time: None,
                location: scoped_text(element, &location),
                description: None,
                source_domain: source_domain.clone(),
                raw_html: Some(element.html()),
                metadata: json!({
                    "date_text": date_text,
                    "strategy": GENERIC_ADAPTIVE,
                }),
            })
        })
        .collect()
}
