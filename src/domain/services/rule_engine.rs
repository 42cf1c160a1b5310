// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::models::rule::RuleSet;
use crate::domain::repositories::rule_repository::RuleRepository;
use crate::domain::services::rule_generator::RuleGenerator;

/// 默认 HTML 样本上限（字符数）
pub const DEFAULT_SAMPLE_LIMIT: usize = 5000;

/// 自适应规则引擎
///
/// 为任意域名提供一套可用的抓取规则，查找顺序为：
/// 进程内缓存 → 规则仓库 → 规则生成服务。生成失败或字段缺失时使用固定默认值，
/// 因此 [`AdaptiveRuleEngine::get_or_generate_rule`] 永远不会失败。
/// 规则仓库查询出错时，本次结果只返回给调用方，既不写回仓库也不进入缓存。
///
/// 缓存由引擎实例独占，调用方通过 `Arc` 共享同一个引擎。
pub struct AdaptiveRuleEngine<R: RuleRepository> {
    repository: Arc<R>,
    generator: Arc<dyn RuleGenerator>,
    cache: DashMap<String, RuleSet>,
    sample_limit: usize,
}

impl<R: RuleRepository> AdaptiveRuleEngine<R> {
    pub fn new(repository: Arc<R>, generator: Arc<dyn RuleGenerator>) -> Self {
        Self::with_sample_limit(repository, generator, DEFAULT_SAMPLE_LIMIT)
    }

    pub fn with_sample_limit(
        repository: Arc<R>,
        generator: Arc<dyn RuleGenerator>,
        sample_limit: usize,
    ) -> Self {
        Self {
            repository,
            generator,
            cache: DashMap::new(),
            sample_limit,
        }
    }

    /// 获取或生成域名的抓取规则
    ///
    /// # 参数
    ///
    /// * `domain` - 目标域名
    /// * `html_sample` - 页面渲染后的 HTML，仅在需要生成规则时使用（截断到样本上限）
    ///
    /// # 返回值
    ///
    /// 该域名的规则集；所有失败都在内部恢复
    pub async fn get_or_generate_rule(&self, domain: &str, html_sample: &str) -> RuleSet {
        if let Some(cached) = self.cache.get(domain) {
            metrics::counter!("rule_cache_hits_total").increment(1);
            return cached.clone();
        }

        // A failed lookup may hide stored rules, so the result is neither saved nor cached
        let store_reachable = match self.repository.find_by_domain(domain).await {
            Ok(Some(stored)) => {
                debug!("Loaded stored rules for {}", domain);
                self.cache.insert(domain.to_string(), stored.clone());
                return stored;
            }
            Ok(None) => true,
            Err(e) => {
                warn!("Rule store lookup failed for {}: {}", domain, e);
                false
            }
        };

        let sample = truncate_chars(html_sample, self.sample_limit);
        info!("Generating selectors for {} ({} chars sample)", domain, sample.chars().count());

        let rules = match self.generator.generate(domain, sample).await {
            Ok(generated) => {
                metrics::counter!("rule_generations_total", "outcome" => "generated").increment(1);
                RuleSet::from_generated(domain, generated)
            }
            Err(e) => {
                warn!("Rule generation failed for {}, using fallback: {}", domain, e);
                metrics::counter!("rule_generations_total", "outcome" => "fallback").increment(1);
                RuleSet::fallback(domain)
            }
        };

        if !store_reachable {
            return rules;
        }

        if let Err(e) = self.repository.save(&rules).await {
            warn!("Failed to persist rules for {}: {}", domain, e);
        }

        self.cache.insert(domain.to_string(), rules.clone());
        rules
    }

    /// 当前缓存的域名数量
    pub fn cached_domains(&self) -> usize {
        self.cache.len()
    }
}

/// 按字符（而非字节）截断，避免切断多字节字符
fn truncate_chars(input: &str, limit: usize) -> &str {
    match input.char_indices().nth(limit) {
        Some((byte_index, _)) => &input[..byte_index],
        None => input,
    }
}
