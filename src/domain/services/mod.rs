// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 规则生成服务（rule_generator）：外部规则生成协作者的契约及其 LLM 实现
/// - 自适应规则引擎（rule_engine）：缓存 + 仓库 + 生成兜底，保证总能拿到可用规则
pub mod rule_engine;
pub mod rule_generator;
