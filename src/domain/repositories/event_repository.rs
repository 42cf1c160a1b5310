// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::event::CanonicalEvent;
use async_trait::async_trait;

/// 事件仓库特质
///
/// 写操作总是以 `url` 为键的 upsert：重复抓取同一事件只刷新可变字段与更新时间
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// 插入或更新单个事件
    async fn upsert(&self, event: &CanonicalEvent) -> Result<(), RepositoryError>;

    /// 根据URL查找事件
    async fn find_by_url(&self, url: &str) -> Result<Option<CanonicalEvent>, RepositoryError>;
}
