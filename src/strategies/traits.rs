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

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::event::CanonicalEvent;
use crate::engines::traits::{DriverError, PageSession};

/// 抓取策略错误类型
#[derive(Error, Debug)]
pub enum StrategyError {
    /// 浏览器驱动错误
    #[error("Browser driver error: {0}")]
    Driver(#[from] DriverError),
    /// URL 无法解析
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
}

/// 抓取策略特质
///
/// 一个策略负责把某类数据源的URL变成一组规范事件
#[async_trait]
pub trait ScrapeStrategy: Send + Sync {
    /// 策略名称
    fn name(&self) -> &'static str;

    /// 策略是否适用于该URL
    fn can_handle(&self, url: &str) -> bool;

    /// 使用已打开的页面抓取事件
    ///
    /// # 参数
    ///
    /// * `page` - 由调用方打开并负责关闭的页面
    /// * `url` - 数据源URL
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<CanonicalEvent>)` - 抓取到的事件（可能为空）
    /// * `Err(StrategyError)` - 策略无法恢复的错误
    async fn scrape(
        &self,
        page: &dyn PageSession,
        url: &str,
    ) -> Result<Vec<CanonicalEvent>, StrategyError>;
}
