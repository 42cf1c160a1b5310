// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 数据源注册表条目
///
/// 表示一个需要周期性抓取的种子URL。核心流程只会修改 `last_crawled_at`，
/// 并且只在一次抓取周期无错误完成之后修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// 数据源ID
    pub id: i32,
    /// 抓取种子URL
    pub url: String,
    /// 抓取频率（小时）
    pub frequency_hours: i32,
    /// 抓取策略键
    pub strategy_key: String,
    /// 最近一次成功抓取时间
    pub last_crawled_at: Option<DateTime<Utc>>,
    /// 是否启用
    pub is_active: bool,
}

/// 新数据源（用于注册表为空时的种子写入）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSeed {
    pub url: String,
    pub frequency_hours: i32,
    pub strategy_key: String,
}

impl Source {
    /// 判断数据源在给定时间点是否到期
    ///
    /// 未抓取过的数据源总是到期；否则最近抓取时间必须早于 `now - frequency`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }

        match self.last_crawled_at {
            None => true,
            Some(last) => last < now - Duration::hours(i64::from(self.frequency_hours)),
        }
    }
}

/// 从候选数据源中选出下一个要抓取的数据源
///
/// 按最近抓取时间升序排列，未抓取过的排在最前；时间相同时按ID排序。
pub fn select_due_source(sources: &[Source], now: DateTime<Utc>) -> Option<&Source> {
    sources
        .iter()
        .filter(|source| source.is_due(now))
        // Option orders None before Some, which puts never-crawled sources first
        .min_by_key(|source| (source.last_crawled_at, source.id))
}
