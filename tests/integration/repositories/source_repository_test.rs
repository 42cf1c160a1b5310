// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::setup_db;
use chrono::{Duration, Utc};
use eventcrawl::domain::models::source::SourceSeed;
use eventcrawl::domain::repositories::source_repository::SourceRepository;
use eventcrawl::domain::repositories::RepositoryError;
use eventcrawl::infrastructure::repositories::source_repo_impl::SourceRepositoryImpl;

fn seed(url: &str) -> SourceSeed {
    SourceSeed {
        url: url.to_string(),
        frequency_hours: 4,
        strategy_key: "GENERIC_ADAPTIVE".to_string(),
    }
}

/// 未抓取过的数据源优先于已过期的数据源
#[tokio::test]
async fn test_never_crawled_source_is_picked_first() {
    let db = setup_db().await;
    let repo = SourceRepositoryImpl::new(db);
    let now = Utc::now();

    let a = repo.create(&seed("https://example.com/a")).await.unwrap();
    let b = repo.create(&seed("https://example.com/b")).await.unwrap();
    repo.mark_crawled(a.id, now - Duration::hours(5)).await.unwrap();

    let next = repo.find_next_due(now).await.unwrap().unwrap();
    assert_eq!(next.id, b.id);
    assert!(next.last_crawled_at.is_none());

    repo.mark_crawled(b.id, now).await.unwrap();
    let next = repo.find_next_due(now).await.unwrap().unwrap();
    assert_eq!(next.id, a.id);

    repo.mark_crawled(a.id, now).await.unwrap();
    assert!(repo.find_next_due(now).await.unwrap().is_none());
}

#[tokio::test]
async fn test_count_and_create() {
    let db = setup_db().await;
    let repo = SourceRepositoryImpl::new(db);

    assert_eq!(repo.count().await.unwrap(), 0);
    let created = repo.create(&seed("https://lu.ma/search?q=chiang+mai")).await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 1);
    assert!(created.is_active);
    assert_eq!(created.frequency_hours, 4);
}

#[tokio::test]
async fn test_mark_crawled_unknown_source() {
    let db = setup_db().await;
    let repo = SourceRepositoryImpl::new(db);

    let result = repo.mark_crawled(42, Utc::now()).await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}
