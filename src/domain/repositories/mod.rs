// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 仓库接口定义了数据持久化的抽象契约，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 数据源仓库（source_repository）：抓取注册表的读取与状态推进
/// - 规则仓库（rule_repository）：按域名持久化抓取规则
/// - 事件仓库（event_repository）：以URL为键 upsert 规范事件
/// - 存储仓库（storage_repository）：保存诊断快照等二进制内容
pub mod event_repository;
pub mod rule_repository;
pub mod source_repository;
pub mod storage_repository;

use sea_orm::DbErr;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}
