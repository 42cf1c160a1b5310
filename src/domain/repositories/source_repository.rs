// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::source::{Source, SourceSeed};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// 数据源仓库特质
///
/// 定义抓取注册表的数据访问接口。核心流程只推进 `last_crawled_at`。
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// 注册表中的数据源总数
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// 写入新的数据源
    async fn create(&self, seed: &SourceSeed) -> Result<Source, RepositoryError>;

    /// 查找下一个到期的数据源
    ///
    /// # 参数
    ///
    /// * `now` - 判断是否到期的参考时间
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(Source))` - 最久未抓取的到期数据源（未抓取过的优先）
    /// * `Ok(None)` - 当前没有到期的数据源
    /// * `Err(RepositoryError)` - 查询失败
    async fn find_next_due(&self, now: DateTime<Utc>) -> Result<Option<Source>, RepositoryError>;

    /// 记录一次成功抓取
    async fn mark_crawled(&self, id: i32, at: DateTime<Utc>) -> Result<(), RepositoryError>;
}
