// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::rule::RuleSet;
use crate::domain::repositories::rule_repository::RuleRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::scraping_rule;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{sea_query::OnConflict, *};
use std::sync::Arc;

/// 抓取规则仓库实现
pub struct RuleRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl RuleRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<scraping_rule::Model> for RuleSet {
    fn from(m: scraping_rule::Model) -> Self {
        RuleSet {
            domain: m.domain,
            event_card_selector: m.event_card_selector,
            title_selector: m.title_selector,
            date_selector: m.date_selector,
            location_selector: m.location_selector,
            link_selector: m.link_selector,
        }
    }
}

#[async_trait]
impl RuleRepository for RuleRepositoryImpl {
    async fn find_by_domain(&self, domain: &str) -> Result<Option<RuleSet>, RepositoryError> {
        let model = scraping_rule::Entity::find()
            .filter(scraping_rule::Column::Domain.eq(domain))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(RuleSet::from))
    }

    async fn save(&self, rules: &RuleSet) -> Result<(), RepositoryError> {
        let model = scraping_rule::ActiveModel {
            domain: Set(rules.domain.clone()),
            event_card_selector: Set(rules.event_card_selector.clone()),
            title_selector: Set(rules.title_selector.clone()),
            date_selector: Set(rules.date_selector.clone()),
            location_selector: Set(rules.location_selector.clone()),
            link_selector: Set(rules.link_selector.clone()),
            last_updated: Set(Utc::now().into()),
            ..Default::default()
        };

        scraping_rule::Entity::insert(model)
            .on_conflict(
                OnConflict::column(scraping_rule::Column::Domain)
                    .update_columns([
                        scraping_rule::Column::EventCardSelector,
                        scraping_rule::Column::TitleSelector,
                        scraping_rule::Column::DateSelector,
                        scraping_rule::Column::LocationSelector,
                        scraping_rule::Column::LinkSelector,
                        scraping_rule::Column::LastUpdated,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(())
    }
}
