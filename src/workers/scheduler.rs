// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::settings::SchedulerSettings;
use crate::domain::models::event::CanonicalEvent;
use crate::domain::models::source::{Source, SourceSeed};
use crate::domain::repositories::event_repository::EventRepository;
use crate::domain::repositories::source_repository::SourceRepository;
use crate::domain::repositories::RepositoryError;
use crate::engines::traits::{BrowserDriver, DriverError};
use crate::strategies::registry::{DispatchError, StrategyRegistry};
use crate::strategies::traits::StrategyError;

/// 调度器错误类型
///
/// 在抓取周期边界被捕获，不会终止调度循环
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// 数据源仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    /// 策略键未注册
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
    /// 打开页面失败
    #[error("Browser driver error: {0}")]
    Driver(#[from] DriverError),
    /// 策略执行失败
    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),
}

/// 一批事件的保存结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub saved: usize,
    pub failed: usize,
    /// 标题或URL为空而被丢弃的事件
    pub skipped: usize,
}

/// 单个抓取周期的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// 没有到期的数据源
    Idle,
    /// 完成了一个数据源的抓取
    Crawled {
        source_id: i32,
        report: SaveReport,
        /// 是否推进了数据源的最近抓取时间
        advanced: bool,
    },
}

/// 抓取调度器
///
/// 单循环调度：每个周期挑选一个最久未抓取的到期数据源，分发给对应策略，
/// 保存事件后推进该数据源的抓取时间。周期内的任何错误都只记录日志并等待下一次轮询。
pub struct CrawlScheduler<S, E>
where
    S: SourceRepository + 'static,
    E: EventRepository + 'static,
{
    sources: Arc<S>,
    events: Arc<E>,
    registry: Arc<StrategyRegistry>,
    driver: Arc<dyn BrowserDriver>,
    settings: SchedulerSettings,
}

impl<S, E> CrawlScheduler<S, E>
where
    S: SourceRepository + 'static,
    E: EventRepository + 'static,
{
    pub fn new(
        sources: Arc<S>,
        events: Arc<E>,
        registry: Arc<StrategyRegistry>,
        driver: Arc<dyn BrowserDriver>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            sources,
            events,
            registry,
            driver,
            settings,
        }
    }

    /// 注册表为空时写入默认数据源
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(Source))` - 新写入的数据源
    /// * `Ok(None)` - 注册表已有数据，未写入
    pub async fn seed_if_empty(&self) -> Result<Option<Source>, SchedulerError> {
        if self.sources.count().await? > 0 {
            return Ok(None);
        }

        let seed = SourceSeed {
            url: self.settings.seed_url.clone(),
            frequency_hours: self.settings.seed_frequency_hours,
            strategy_key: self.settings.seed_strategy_key.clone(),
        };
        let source = self.sources.create(&seed).await?;
        info!(
            "Seeded source registry with {} ({})",
            source.url, source.strategy_key
        );
        Ok(Some(source))
    }

    /// 持续运行调度循环
    ///
    /// 正常情况下不会返回
    pub async fn run_forever(&self) {
        info!(
            "Crawl scheduler started (poll interval {:?})",
            self.settings.poll_interval()
        );

        loop {
            let started = Instant::now();
            match self.run_cycle().await {
                Ok(CycleOutcome::Idle) => {
                    metrics::counter!("crawl_cycles_total", "outcome" => "idle").increment(1);
                    debug!("No sources due, sleeping");
                    tokio::time::sleep(self.settings.poll_interval()).await;
                }
                Ok(CycleOutcome::Crawled {
                    source_id,
                    report,
                    advanced,
                }) => {
                    metrics::counter!("crawl_cycles_total", "outcome" => "success").increment(1);
                    metrics::histogram!("crawl_cycle_duration_seconds")
                        .record(started.elapsed().as_secs_f64());
                    info!(
                        "Source {} done: {} saved, {} failed",
                        source_id, report.saved, report.failed
                    );
                    // The source is still the most overdue one
                    if !advanced {
                        tokio::time::sleep(self.settings.poll_interval()).await;
                    }
                }
                Err(e) => {
                    metrics::counter!("crawl_cycles_total", "outcome" => "error").increment(1);
                    metrics::histogram!("crawl_cycle_duration_seconds")
                        .record(started.elapsed().as_secs_f64());
                    error!("Crawl cycle failed: {}", e);
                    tokio::time::sleep(self.settings.poll_interval()).await;
                }
            }
        }
    }

    /// 在后台任务中运行调度循环
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run_forever().await;
        })
    }

    /// 执行一个抓取周期
    ///
    /// 数据源的最近抓取时间只在策略成功返回后推进；
    /// 部分事件保存失败时是否推进由 `advance_on_partial_save` 决定
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> Result<CycleOutcome, SchedulerError> {
        let Some(source) = self.sources.find_next_due(Utc::now()).await? else {
            return Ok(CycleOutcome::Idle);
        };

        info!(
            "Crawling source {} ({}) with {}",
            source.id, source.url, source.strategy_key
        );

        let strategy = self.registry.resolve(&source.strategy_key)?;
        if !strategy.can_handle(&source.url) {
            warn!(
                "Strategy {} does not recognise {}, running it anyway",
                strategy.name(),
                source.url
            );
        }

        debug!("Opening page with {} driver", self.driver.name());
        let page = self.driver.open_page().await?;
        let scraped = strategy.scrape(page.as_ref(), &source.url).await;
        if let Err(e) = page.close().await {
            warn!("Failed to close page: {}", e);
        }
        let events = scraped?;

        let report = self.save_events(&events).await;
        let advanced = report.failed == 0 || self.settings.advance_on_partial_save;
        if advanced {
            self.sources.mark_crawled(source.id, Utc::now()).await?;
        } else {
            warn!(
                "{} events failed to save, source {} stays due",
                report.failed, source.id
            );
        }

        Ok(CycleOutcome::Crawled {
            source_id: source.id,
            report,
            advanced,
        })
    }

    async fn save_events(&self, events: &[CanonicalEvent]) -> SaveReport {
        let mut report = SaveReport::default();

        for event in events {
            if !event.is_persistable() {
                report.skipped += 1;
                continue;
            }

            match self.events.upsert(event).await {
                Ok(()) => {
                    report.saved += 1;
                    metrics::counter!("events_saved_total").increment(1);
                }
                Err(e) => {
                    report.failed += 1;
                    metrics::counter!("events_failed_total").increment(1);
                    warn!("Failed to save event {}: {}", event.url, e);
                }
            }
        }

        report
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
