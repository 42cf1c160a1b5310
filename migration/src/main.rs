// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 迁移命令行入口
///
/// 读取 `DATABASE_URL`，对 data_sources、scraping_rules 与 activities 三张表执行
/// `up` / `down` / `status` 等子命令
#[async_std::main]
async fn main() {
    cli::run_cli(migration::Migrator).await;
}
