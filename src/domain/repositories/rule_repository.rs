// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::rule::RuleSet;
use async_trait::async_trait;

/// 规则仓库特质
///
/// 按域名持久化抓取规则，供进程重启后复用
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// 根据域名查找规则
    async fn find_by_domain(&self, domain: &str) -> Result<Option<RuleSet>, RepositoryError>;

    /// 保存规则（同一域名已存在时覆盖选择器并刷新更新时间）
    async fn save(&self, rules: &RuleSet) -> Result<(), RepositoryError>;
}
