// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::strategies::traits::ScrapeStrategy;

/// 发现策略的键
pub const LUMA_SEARCH_V2: &str = "LUMA_SEARCH_V2";
/// 通用自适应提取策略的键
pub const GENERIC_ADAPTIVE: &str = "GENERIC_ADAPTIVE";

/// 策略分发错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unknown scraper strategy: {0}")]
    UnknownStrategy(String),
}

/// 策略注册表
///
/// 按数据源记录上的策略键分发到具体策略
#[derive(Default, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn ScrapeStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册策略，同名键会覆盖之前的注册
    pub fn register(&mut self, key: impl Into<String>, strategy: Arc<dyn ScrapeStrategy>) {
        let key = key.into();
        debug!("Registering strategy {} as {}", strategy.name(), key);
        self.strategies.insert(key, strategy);
    }

    /// 按键解析策略
    ///
    /// # 返回值
    ///
    /// * `Ok(Arc<dyn ScrapeStrategy>)` - 已注册的策略
    /// * `Err(DispatchError::UnknownStrategy)` - 键未注册
    pub fn resolve(&self, key: &str) -> Result<Arc<dyn ScrapeStrategy>, DispatchError> {
        self.strategies
            .get(key)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownStrategy(key.to_string()))
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
