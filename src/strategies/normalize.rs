// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

use crate::domain::models::event::{parse_timestamp, CandidateRecord, CanonicalEvent};
use crate::utils::url_utils::resolve_url;

const IDENTIFIER_KEYS: [&str; 4] = ["url", "slug", "api_id", "id"];
const TITLE_KEYS: [&str; 2] = ["name", "title"];
const START_KEYS: [&str; 4] = ["start_at", "start_time", "startDate", "date"];
const END_KEYS: [&str; 3] = ["end_at", "end_time", "endDate"];
const LOCATION_KEYS: [&str; 3] = ["location", "geo_address_info", "address"];
const ADDRESS_PARTS: [&str; 5] = ["name", "address", "city", "region", "country"];

/// 将候选记录规范化为事件并按URL去重
///
/// 同一URL只保留第一次出现的记录，输出保持首次出现的顺序。
///
/// # 参数
///
/// * `candidates` - 挖掘得到的候选记录
/// * `source_domain` - 相对标识符拼接时使用的域名，同时写入 `source_domain`
pub fn normalize_candidates(
    candidates: &[CandidateRecord],
    source_domain: &str,
) -> Vec<CanonicalEvent> {
    let mut seen = HashSet::new();
    let mut events = Vec::new();

    for candidate in candidates {
        let Some(event) = normalize_candidate(candidate, source_domain) else {
            continue;
        };
        if seen.insert(event.url.clone()) {
            events.push(event);
        }
    }

    events
}

/// 规范化单条候选记录，缺少标题或标识符时返回 `None`
pub fn normalize_candidate(
    candidate: &CandidateRecord,
    source_domain: &str,
) -> Option<CanonicalEvent> {
    let record = match candidate.payload.get("event") {
        Some(Value::Object(inner)) => inner,
        _ => candidate.payload.as_object()?,
    };

    let title = first_text(record, &TITLE_KEYS)?;
    let identifier = first_text(record, &IDENTIFIER_KEYS)?;
    let url = canonical_url(&identifier, source_domain)?;

    let start_raw = first_text(record, &START_KEYS);
    let start_time = start_raw.as_deref().and_then(parse_timestamp);
    let end_time = first_text(record, &END_KEYS)
        .as_deref()
        .and_then(parse_timestamp);

    let mut metadata = json!({
        "api_id": record.get("api_id").cloned().unwrap_or(Value::Null),
        "cover_url": record.get("cover_url").cloned().unwrap_or(Value::Null),
        "provenance": candidate.provenance,
    });
    if start_time.is_none() {
        if let Some(raw) = start_raw {
            metadata["start_raw"] = Value::String(raw);
        }
    }

    Some(CanonicalEvent {
        title,
        url,
        start_time,
        end_time,
        location: flatten_location(record),
        description: first_text(record, &["description"]),
        source_domain: source_domain.to_string(),
        raw_html: serde_json::to_string(record).ok(),
        metadata,
    })
}

/// 绝对标识符原样保留，相对标识符拼接到 `https://<domain>/`
fn canonical_url(identifier: &str, source_domain: &str) -> Option<String> {
    if identifier.starts_with("http://") || identifier.starts_with("https://") {
        return Some(identifier.to_string());
    }

    let base = Url::parse(&format!("https://{}/", source_domain)).ok()?;
    match resolve_url(&base, identifier) {
        // Protocol-relative or scheme-bearing identifiers must not leave the source domain
        Ok(url) if url.host_str() != base.host_str() => {
            debug!("Dropping candidate with off-domain identifier {}", identifier);
            None
        }
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            debug!("Dropping candidate with unusable identifier {}: {}", identifier, e);
            None
        }
    }
}

fn first_text(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// 地点字段扁平化为一行文本
///
/// 字符串原样使用；对象优先取 `full_address`，其次拼接地址各部分，最后退化为紧凑 JSON
fn flatten_location(record: &Map<String, Value>) -> Option<String> {
    let value = LOCATION_KEYS
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())?;

    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(map) => {
            if let Some(Value::String(full)) = map.get("full_address") {
                if !full.trim().is_empty() {
                    return Some(full.trim().to_string());
                }
            }

            let parts: Vec<&str> = ADDRESS_PARTS
                .iter()
                .filter_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect();
            if !parts.is_empty() {
                return Some(parts.join(", "));
            }

            serde_json::to_string(value).ok()
        }
        Value::String(_) => None,
        other => serde_json::to_string(other).ok(),
    }
}
