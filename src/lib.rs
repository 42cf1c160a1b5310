// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含数据源、规则、事件等核心实体，仓库接口与规则引擎
pub mod domain;

/// 引擎模块
///
/// 浏览器自动化驱动接口及其 Chromium 与内存实现
pub mod engines;

/// 基础设施模块
///
/// 提供数据库、存储和指标等外部服务集成
pub mod infrastructure;

/// 策略模块
///
/// 发现策略、通用自适应提取策略以及按键分发的注册表
pub mod strategies;

/// 工具模块
///
/// 提供日志初始化和URL处理等辅助功能
pub mod utils;

/// 工作器模块
///
/// 抓取调度循环
pub mod workers;
