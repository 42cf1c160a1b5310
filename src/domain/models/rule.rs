// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 默认事件卡片选择器
pub const DEFAULT_EVENT_CARD_SELECTOR: &str = "div.event-card";
/// 默认标题选择器
pub const DEFAULT_TITLE_SELECTOR: &str = "h3";
/// 默认日期选择器
pub const DEFAULT_DATE_SELECTOR: &str = ".date";
/// 默认地点选择器
pub const DEFAULT_LOCATION_SELECTOR: &str = ".location";
/// 默认链接选择器
pub const DEFAULT_LINK_SELECTOR: &str = "a";

/// 抓取规则集
///
/// 描述通用抽取策略如何在某个域名的页面上定位事件卡片及其字段。
/// 除卡片选择器外，其余选择器均相对于卡片元素。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// 规则所属域名（唯一）
    pub domain: String,
    pub event_card_selector: String,
    pub title_selector: String,
    pub date_selector: String,
    pub location_selector: String,
    pub link_selector: String,
}

/// 规则生成服务返回的原始选择器，每个字段都可能缺失
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRules {
    pub event_card_selector: Option<String>,
    pub title_selector: Option<String>,
    pub date_selector: Option<String>,
    pub location_selector: Option<String>,
    pub link_selector: Option<String>,
}

impl RuleSet {
    /// 通用兜底规则集
    pub fn fallback(domain: &str) -> Self {
        Self::from_generated(domain, GeneratedRules::default())
    }

    /// 由生成结果构造规则集，缺失字段使用固定默认值补齐
    pub fn from_generated(domain: &str, generated: GeneratedRules) -> Self {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
                .unwrap_or_else(|| default.to_string())
        }

        Self {
            domain: domain.to_string(),
            event_card_selector: or_default(
                generated.event_card_selector,
                DEFAULT_EVENT_CARD_SELECTOR,
            ),
            title_selector: or_default(generated.title_selector, DEFAULT_TITLE_SELECTOR),
            date_selector: or_default(generated.date_selector, DEFAULT_DATE_SELECTOR),
            location_selector: or_default(generated.location_selector, DEFAULT_LOCATION_SELECTOR),
            link_selector: or_default(generated.link_selector, DEFAULT_LINK_SELECTOR),
        }
    }
}
