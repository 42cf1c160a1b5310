// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::models::event::CandidateRecord;

pub const DEFAULT_MAX_DEPTH: usize = 64;
pub const DEFAULT_MAX_NODES: usize = 100_000;

const ID_KEYS: [&str; 2] = ["api_id", "id"];
const START_KEYS: [&str; 3] = ["start_at", "start_time", "startDate"];

/// 事件挖掘器
///
/// 在任意形状的 JSON 中递归寻找"事件形"对象：带有非空标识（`api_id` 或 `id`），
/// 并且带有 `event`/`calendar` 子对象或开始时间字段。
/// 递归深度和访问节点数都有上限，超出上限时停止下探并记录一次警告。
#[derive(Debug, Clone, Copy)]
pub struct EventMiner {
    max_depth: usize,
    max_nodes: usize,
}

impl Default for EventMiner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES)
    }
}

struct Walk<'a> {
    sink: &'a mut Vec<CandidateRecord>,
    provenance: &'a str,
    visited: usize,
    appended: usize,
    bound_hit: bool,
}

impl EventMiner {
    pub fn new(max_depth: usize, max_nodes: usize) -> Self {
        Self {
            max_depth,
            max_nodes,
        }
    }

    /// 挖掘 JSON 树中的候选事件
    ///
    /// # 参数
    ///
    /// * `node` - JSON 根节点
    /// * `sink` - 候选记录追加到这里
    /// * `provenance` - 来源（响应URL或页面URL）
    ///
    /// # 返回值
    ///
    /// 本次追加的候选记录数量
    pub fn mine(&self, node: &Value, sink: &mut Vec<CandidateRecord>, provenance: &str) -> usize {
        let mut walk = Walk {
            sink,
            provenance,
            visited: 0,
            appended: 0,
            bound_hit: false,
        };
        self.visit(node, 0, &mut walk);

        if walk.bound_hit {
            warn!(
                "Mining of {} stopped early after {} nodes (depth limit {}, node limit {})",
                provenance, walk.visited, self.max_depth, self.max_nodes
            );
        }
        metrics::counter!("mined_candidates_total").increment(walk.appended as u64);
        walk.appended
    }

    fn visit(&self, node: &Value, depth: usize, walk: &mut Walk<'_>) {
        if !(node.is_object() || node.is_array()) || !self.admit(depth, walk) {
            return;
        }

        match node {
            Value::Array(items) => {
                for item in items {
                    self.visit(item, depth + 1, walk);
                }
            }
            Value::Object(map) => {
                self.inspect(map, walk);
                for value in map.values() {
                    self.visit(value, depth + 1, walk);
                }
            }
            _ => {}
        }
    }

    fn admit(&self, depth: usize, walk: &mut Walk<'_>) -> bool {
        if depth > self.max_depth || walk.visited >= self.max_nodes {
            walk.bound_hit = true;
            return false;
        }
        walk.visited += 1;
        true
    }

    fn inspect(&self, map: &Map<String, Value>, walk: &mut Walk<'_>) {
        if is_event_shaped(map) {
            walk.push(Value::Object(map.clone()));
        }

        if let Some(Value::Object(event)) = map.get("event") {
            if identifier(event).is_some() {
                walk.push(Value::Object(event.clone()));
            }
        }
    }
}

impl Walk<'_> {
    fn push(&mut self, payload: Value) {
        self.sink
            .push(CandidateRecord::new(payload, self.provenance.to_string()));
        self.appended += 1;
    }
}

fn identifier(map: &Map<String, Value>) -> Option<&Value> {
    ID_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

fn is_event_shaped(map: &Map<String, Value>) -> bool {
    if identifier(map).is_none() {
        return false;
    }

    let has_container = ["event", "calendar"]
        .iter()
        .any(|key| map.get(*key).is_some_and(Value::is_object));
    let has_start = START_KEYS
        .iter()
        .any(|key| map.get(*key).is_some_and(|value| !value.is_null()));

    has_container || has_start
}
