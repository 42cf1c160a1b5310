// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 候选记录
///
/// 在单个数据源的响应流/页面中挖掘出的事件形对象，仅存在于一次策略调用内，
/// 不直接持久化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// 原始事件形 JSON 对象
    pub payload: Value,
    /// 来源（响应URL或页面URL）
    pub provenance: String,
}

impl CandidateRecord {
    pub fn new(payload: Value, provenance: impl Into<String>) -> Self {
        Self {
            payload,
            provenance: provenance.into(),
        }
    }
}

/// 规范事件
///
/// 核心流程的输出单元，以 `url` 作为去重与 upsert 的键。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    /// 事件标题（必填）
    pub title: String,
    /// 规范绝对URL（必填，去重键）
    pub url: String,
    /// 开始时间
    pub start_time: Option<DateTime<Utc>>,
    /// 结束时间
    pub end_time: Option<DateTime<Utc>>,
    /// 扁平化后的地点文本
    pub location: Option<String>,
    /// 描述
    pub description: Option<String>,
    /// 来源域名
    pub source_domain: String,
    /// 原始载荷（调试/审计）
    pub raw_html: Option<String>,
    /// 自由格式元数据
    pub metadata: Value,
}

impl CanonicalEvent {
    /// 标题或URL为空的事件在进入持久化之前被丢弃
    pub fn is_persistable(&self) -> bool {
        !self.title.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// 将第三方时间字符串解析为 UTC 时间
///
/// 支持 RFC 3339 以及不带时区的 `YYYY-MM-DDTHH:MM:SS`（视为 UTC），其他格式返回 `None`。
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
