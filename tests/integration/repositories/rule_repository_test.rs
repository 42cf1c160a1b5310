// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::setup_db;
use eventcrawl::domain::models::rule::RuleSet;
use eventcrawl::domain::repositories::rule_repository::RuleRepository;
use eventcrawl::infrastructure::database::entities::scraping_rule;
use eventcrawl::infrastructure::repositories::rule_repo_impl::RuleRepositoryImpl;
use sea_orm::{EntityTrait, PaginatorTrait};

#[tokio::test]
async fn test_save_overwrites_selectors_for_domain() {
    let db = setup_db().await;
    let repo = RuleRepositoryImpl::new(db.clone());

    assert!(repo.find_by_domain("events.example.org").await.unwrap().is_none());

    let fallback = RuleSet::fallback("events.example.org");
    repo.save(&fallback).await.unwrap();

    let mut generated = fallback.clone();
    generated.event_card_selector = "li.listing".to_string();
    generated.title_selector = "h2.name".to_string();
    repo.save(&generated).await.unwrap();

    let rows = scraping_rule::Entity::find().count(db.as_ref()).await.unwrap();
    assert_eq!(rows, 1);

    let stored = repo.find_by_domain("events.example.org").await.unwrap().unwrap();
    assert_eq!(stored, generated);
}
