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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含数据库、调度器、浏览器、发现策略、规则生成、存储和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 调度器配置
    pub scheduler: SchedulerSettings,
    /// 浏览器自动化配置
    pub browser: BrowserSettings,
    /// 发现策略配置
    pub discovery: DiscoverySettings,
    /// 规则生成服务配置
    pub rule_generator: RuleGeneratorSettings,
    /// 诊断快照存储配置
    pub storage: StorageSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 调度器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// 无任务或出错后的休眠间隔（秒）
    pub poll_interval_secs: u64,
    /// 注册表为空时写入的种子URL
    pub seed_url: String,
    /// 种子数据源的抓取频率（小时）
    pub seed_frequency_hours: i32,
    /// 种子数据源使用的策略键
    pub seed_strategy_key: String,
    /// 部分事件保存失败时是否仍然推进数据源的抓取时间
    pub advance_on_partial_save: bool,
}

impl SchedulerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// 浏览器自动化配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// 远程 Chrome 调试地址（为空时本地启动）
    pub remote_debugging_url: Option<String>,
    /// 同时打开的页面上限
    pub max_concurrent_pages: usize,
    /// 单次 CDP 请求 / 导航超时（秒）
    pub request_timeout_secs: u64,
    /// 浏览器 User-Agent
    pub user_agent: String,
    /// 导航结束后等待剩余网络响应的时间（毫秒）
    pub response_drain_ms: u64,
}

impl BrowserSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 发现策略配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    /// 目标站点主机名
    pub target_host: String,
    /// 种子URL未携带查询词时的默认查询
    pub default_query: String,
    /// 外部搜索引擎的查询入口
    pub search_base_url: String,
    /// 搜索结果列表的标记选择器
    pub result_marker_selector: String,
    /// 等待搜索结果的超时时间（秒）
    pub result_wait_timeout_secs: u64,
    /// 最多访问的详情页数量
    pub max_links: usize,
    /// 两次详情页访问之间的间隔（毫秒）
    pub settle_delay_ms: u64,
    /// 递归挖掘的最大深度
    pub max_mining_depth: usize,
    /// 递归挖掘访问节点上限
    pub max_mining_nodes: usize,
}

/// 规则生成服务配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RuleGeneratorSettings {
    /// LLM API 密钥
    pub api_key: Option<String>,
    /// 模型名称
    pub model: String,
    /// OpenAI 兼容接口的基础URL
    pub api_base_url: String,
    /// HTML 样本最大字符数
    pub sample_limit: usize,
}

/// 存储配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// 本地存储路径
    pub local_path: String,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启动 Prometheus 导出器
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 与
    /// `EVENTCRAWL__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("EVENTCRAWL").separator("__"));

        builder.build()?.try_deserialize()
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            // Default DB settings
            .set_default("database.url", "postgres://postgres@localhost:5432/echorank_crawler")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Scheduler
            .set_default("scheduler.poll_interval_secs", 10)?
            .set_default("scheduler.seed_url", "https://lu.ma/search?q=chiang+mai")?
            .set_default("scheduler.seed_frequency_hours", 4)?
            .set_default("scheduler.seed_strategy_key", "LUMA_SEARCH_V2")?
            .set_default("scheduler.advance_on_partial_save", true)?
            // Browser
            .set_default("browser.max_concurrent_pages", 2)?
            .set_default("browser.request_timeout_secs", 30)?
            .set_default(
                "browser.user_agent",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            )?
            .set_default("browser.response_drain_ms", 500)?
            // Discovery
            .set_default("discovery.target_host", "lu.ma")?
            .set_default("discovery.default_query", "Chiang Mai")?
            .set_default("discovery.search_base_url", "https://www.google.com/search")?
            .set_default("discovery.result_marker_selector", "div.g")?
            .set_default("discovery.result_wait_timeout_secs", 10)?
            .set_default("discovery.max_links", 10)?
            .set_default("discovery.settle_delay_ms", 2000)?
            .set_default("discovery.max_mining_depth", 64)?
            .set_default("discovery.max_mining_nodes", 100_000)?
            // Rule generator
            .set_default("rule_generator.model", "gpt-4o-mini")?
            .set_default("rule_generator.api_base_url", "https://api.openai.com/v1")?
            .set_default("rule_generator.sample_limit", 5000)?
            // Storage & metrics
            .set_default("storage.local_path", "./storage")?
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }

    /// 仅使用内置默认值构建配置（用于测试和本地调试）
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::with_defaults(Config::builder())?
            .build()?
            .try_deserialize()
    }
}
