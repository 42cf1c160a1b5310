// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供领域仓库接口基于 SeaORM 的数据库实现
pub mod event_repo_impl;
pub mod rule_repo_impl;
pub mod source_repo_impl;
