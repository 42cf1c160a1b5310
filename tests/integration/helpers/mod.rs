// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use eventcrawl::domain::models::event::CanonicalEvent;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::json;
use std::sync::Arc;

/// 创建内存 SQLite 数据库并执行全部迁移
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory sqlite");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    Arc::new(db)
}

#[allow(dead_code)]
pub fn sample_event(url: &str, title: &str) -> CanonicalEvent {
    CanonicalEvent {
        title: title.to_string(),
        url: url.to_string(),
        start_time: None,
        end_time: None,
        location: Some("Nimman, Chiang Mai".to_string()),
        description: None,
        source_domain: "lu.ma".to_string(),
        raw_html: None,
        metadata: json!({ "provenance": "test" }),
    }
}
