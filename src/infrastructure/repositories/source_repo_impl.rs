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

use crate::domain::models::source::{select_due_source, Source, SourceSeed};
use crate::domain::repositories::source_repository::SourceRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::data_source;
use async_trait::async_trait;
use sea_orm::prelude::ChronoDateTimeWithTimeZone;
use chrono::{DateTime, Utc};
use sea_orm::{sea_query::Expr, *};
use std::sync::Arc;

/// 数据源仓库实现
pub struct SourceRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl SourceRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<data_source::Model> for Source {
    fn from(m: data_source::Model) -> Self {
        Source {
            id: m.id,
            url: m.url,
            frequency_hours: m.frequency_hours,
            strategy_key: m.strategy_key,
            last_crawled_at: m.last_crawled_at.map(Into::into),
            is_active: m.is_active,
        }
    }
}

#[async_trait]
impl SourceRepository for SourceRepositoryImpl {
    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(data_source::Entity::find().count(self.db.as_ref()).await?)
    }

    async fn create(&self, seed: &SourceSeed) -> Result<Source, RepositoryError> {
        let model = data_source::ActiveModel {
            url: Set(seed.url.clone()),
            frequency_hours: Set(seed.frequency_hours),
            strategy_key: Set(seed.strategy_key.clone()),
            last_crawled_at: Set(None),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let inserted = model.insert(self.db.as_ref()).await?;
        Ok(inserted.into())
    }

    async fn find_next_due(&self, now: DateTime<Utc>) -> Result<Option<Source>, RepositoryError> {
        // Due-ness is evaluated in Rust so sqlite and postgres share one code path
        let sources: Vec<Source> = data_source::Entity::find()
            .filter(data_source::Column::IsActive.eq(true))
            .order_by_asc(data_source::Column::Id)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Source::from)
            .collect();

        Ok(select_due_source(&sources, now).cloned())
    }

    async fn mark_crawled(&self, id: i32, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        let at: ChronoDateTimeWithTimeZone = at.into();
        let result = data_source::Entity::update_many()
            .col_expr(data_source::Column::LastCrawledAt, Expr::value(Some(at)))
            .filter(data_source::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
