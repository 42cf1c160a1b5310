// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::{sample_event, setup_db};
use chrono::{TimeZone, Utc};
use eventcrawl::domain::repositories::event_repository::EventRepository;
use eventcrawl::infrastructure::database::entities::activity;
use eventcrawl::infrastructure::repositories::event_repo_impl::EventRepositoryImpl;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use std::time::Duration;

/// 重复保存同一URL只更新已有行
#[tokio::test]
async fn test_upsert_is_idempotent_on_url() {
    let db = setup_db().await;
    let repo = EventRepositoryImpl::new(db.clone());

    let url = "https://lu.ma/cnx-night-market";
    let first = sample_event(url, "Night Market Meetup");
    repo.upsert(&first).await.unwrap();

    let before = activity::Entity::find().one(db.as_ref()).await.unwrap().unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;

    let mut second = sample_event(url, "Night Market Meetup (moved)");
    second.start_time = Some(Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap());
    second.location = Some("Old City".to_string());
    second.metadata = json!({ "provenance": "second-run" });
    repo.upsert(&second).await.unwrap();

    let rows = activity::Entity::find().count(db.as_ref()).await.unwrap();
    assert_eq!(rows, 1);

    let after = activity::Entity::find().one(db.as_ref()).await.unwrap().unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.title, "Night Market Meetup (moved)");
    assert_eq!(after.location.as_deref(), Some("Old City"));
    assert!(after.updated_at > before.updated_at);

    let stored = repo.find_by_url(url).await.unwrap().unwrap();
    assert_eq!(stored.start_time, second.start_time);
    assert_eq!(stored.metadata, json!({ "provenance": "second-run" }));
}

#[tokio::test]
async fn test_distinct_urls_create_distinct_rows() {
    let db = setup_db().await;
    let repo = EventRepositoryImpl::new(db.clone());

    repo.upsert(&sample_event("https://lu.ma/a", "A")).await.unwrap();
    repo.upsert(&sample_event("https://lu.ma/b", "B")).await.unwrap();

    let rows = activity::Entity::find().count(db.as_ref()).await.unwrap();
    assert_eq!(rows, 2);
    assert!(repo.find_by_url("https://lu.ma/c").await.unwrap().is_none());
}
