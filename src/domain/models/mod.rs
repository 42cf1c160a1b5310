// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 数据源（source）：抓取注册表中的一个种子URL及其调度状态
/// - 抓取规则（rule）：按域名划分的五个CSS选择器
/// - 事件（event）：挖掘过程中的候选记录与最终的规范事件
pub mod event;
pub mod rule;
pub mod source;
