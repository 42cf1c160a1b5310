// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 存储错误
    #[error("Storage error: {0}")]
    Other(String),
}

/// 存储仓库特质
///
/// 保存抓取过程中的诊断快照（例如搜索结果页超时时的 HTML）
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// 使用指定键保存数据
    async fn save(&self, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// 根据键读取数据
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// 列出指定前缀下的所有键
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}
