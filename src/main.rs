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

use eventcrawl::config::settings::Settings;
use eventcrawl::domain::repositories::storage_repository::StorageRepository;
use eventcrawl::domain::services::rule_engine::AdaptiveRuleEngine;
use eventcrawl::domain::services::rule_generator::LlmRuleGenerator;
use eventcrawl::engines::chromium::ChromiumDriver;
use eventcrawl::infrastructure::database::connection;
use eventcrawl::infrastructure::repositories::event_repo_impl::EventRepositoryImpl;
use eventcrawl::infrastructure::repositories::rule_repo_impl::RuleRepositoryImpl;
use eventcrawl::infrastructure::repositories::source_repo_impl::SourceRepositoryImpl;
use eventcrawl::infrastructure::storage::LocalStorage;
use eventcrawl::strategies::discovery::DiscoveryStrategy;
use eventcrawl::strategies::generic::GenericStrategy;
use eventcrawl::strategies::registry::{StrategyRegistry, GENERIC_ADAPTIVE, LUMA_SEARCH_V2};
use eventcrawl::workers::scheduler::CrawlScheduler;
use std::sync::Arc;
use tracing::info;

use eventcrawl::utils::telemetry;

/// 主函数
///
/// 初始化所有组件并运行抓取调度循环，直到收到 Ctrl+C
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting eventcrawl...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    eventcrawl::infrastructure::metrics::init_metrics(&settings.metrics)?;

    // 3. Connect to database and apply migrations
    let db = Arc::new(connection::connect_and_migrate(&settings.database).await?);
    info!("Database connection established");

    let source_repo = Arc::new(SourceRepositoryImpl::new(db.clone()));
    let event_repo = Arc::new(EventRepositoryImpl::new(db.clone()));
    let rule_repo = Arc::new(RuleRepositoryImpl::new(db.clone()));
    let storage: Arc<dyn StorageRepository> =
        Arc::new(LocalStorage::from_settings(&settings.storage));

    // 4. Rule engine
    let generator = Arc::new(LlmRuleGenerator::new(&settings.rule_generator)?);
    if settings.rule_generator.api_key.is_none() {
        info!("No rule generator API key configured, generic strategy will use fallback selectors");
    }
    let rule_engine = Arc::new(AdaptiveRuleEngine::with_sample_limit(
        rule_repo,
        generator,
        settings.rule_generator.sample_limit,
    ));

    // 5. Strategies
    let mut registry = StrategyRegistry::new();
    registry.register(
        LUMA_SEARCH_V2,
        Arc::new(DiscoveryStrategy::new(settings.discovery.clone(), storage)),
    );
    registry.register(GENERIC_ADAPTIVE, Arc::new(GenericStrategy::new(rule_engine)));
    info!("Registered strategies: {:?}", registry.keys());

    // 6. Browser
    let driver = Arc::new(ChromiumDriver::new(settings.browser.clone()));

    // 7. Scheduler
    let scheduler = CrawlScheduler::new(
        source_repo,
        event_repo,
        Arc::new(registry),
        driver,
        settings.scheduler.clone(),
    );
    scheduler.seed_if_empty().await?;

    tokio::select! {
        _ = scheduler.run_forever() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping scheduler");
        }
    }

    Ok(())
}
