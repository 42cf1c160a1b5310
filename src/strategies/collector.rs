// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::Value;
use tracing::debug;

use crate::domain::models::event::CandidateRecord;
use crate::engines::traits::{ObservedResponse, ResponseObserver};
use crate::strategies::miner::EventMiner;

/// JSON 响应收集器
///
/// 传入每一次导航，对看起来是 JSON 的响应进行事件挖掘。
/// 候选记录只在一次策略调用内存在，调用结束后通过 [`JsonResponseCollector::into_candidates`] 取出。
pub struct JsonResponseCollector {
    miner: EventMiner,
    candidates: Vec<CandidateRecord>,
    bodies_seen: usize,
}

impl JsonResponseCollector {
    pub fn new(miner: EventMiner) -> Self {
        Self {
            miner,
            candidates: Vec::new(),
            bodies_seen: 0,
        }
    }

    /// 挖掘不是来自网络响应的 JSON（例如页面内嵌的数据）
    pub fn mine_value(&mut self, value: &Value, provenance: &str) -> usize {
        self.miner.mine(value, &mut self.candidates, provenance)
    }

    pub fn bodies_seen(&self) -> usize {
        self.bodies_seen
    }

    pub fn into_candidates(self) -> Vec<CandidateRecord> {
        self.candidates
    }
}

impl ResponseObserver for JsonResponseCollector {
    fn wants_body(&self, response: &ObservedResponse) -> bool {
        if response.resource_kind.is_asset() {
            return false;
        }
        response.content_type().contains("application/json") || response.url.contains("json")
    }

    fn observe(&mut self, response: &ObservedResponse, body: &str) {
        self.bodies_seen += 1;

        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(_) => {
                debug!("Ignoring non-JSON body from {}", response.url);
                return;
            }
        };

        if let Some(map) = value.as_object() {
            let keys: Vec<&str> = map.keys().take(5).map(String::as_str).collect();
            debug!("JSON keys from {}: {:?}", response.url, keys);
        }

        let found = self.mine_value(&value, &response.url);
        if found > 0 {
            debug!("Mined {} candidates from {}", found, response.url);
        }
    }
}
