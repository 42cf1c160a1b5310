// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库实体模块
///
/// 定义数据源、抓取规则和活动三张表对应的实体结构
pub mod activity;
pub mod data_source;
pub mod scraping_rule;
