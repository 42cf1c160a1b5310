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

use crate::domain::models::event::CanonicalEvent;
use crate::domain::repositories::event_repository::EventRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::activity;
use async_trait::async_trait;
use sea_orm::prelude::ChronoDateTimeWithTimeZone;
use chrono::Utc;
use sea_orm::{sea_query::OnConflict, *};
use serde_json::Value;
use std::sync::Arc;

/// 活动仓库实现
///
/// 以 `url` 为键写入，重复写入同一URL只刷新可变字段和 `updated_at`
pub struct EventRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl EventRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<activity::Model> for CanonicalEvent {
    fn from(m: activity::Model) -> Self {
        CanonicalEvent {
            title: m.title,
            url: m.url,
            start_time: m.start_time.map(Into::into),
            end_time: m.end_time.map(Into::into),
            location: m.location,
            description: m.description,
            source_domain: m.source_domain,
            raw_html: m.raw_html,
            metadata: m.metadata.unwrap_or(Value::Null),
        }
    }
}

#[async_trait]
impl EventRepository for EventRepositoryImpl {
    async fn upsert(&self, event: &CanonicalEvent) -> Result<(), RepositoryError> {
        let now: ChronoDateTimeWithTimeZone = Utc::now().into();
        let model = activity::ActiveModel {
            title: Set(event.title.clone()),
            start_time: Set(event.start_time.map(Into::into)),
            end_time: Set(event.end_time.map(Into::into)),
            location: Set(event.location.clone()),
            url: Set(event.url.clone()),
            description: Set(event.description.clone()),
            source_domain: Set(event.source_domain.clone()),
            raw_html: Set(event.raw_html.clone()),
            metadata: Set(Some(event.metadata.clone())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        activity::Entity::insert(model)
            .on_conflict(
                OnConflict::column(activity::Column::Url)
                    .update_columns([
                        activity::Column::Title,
                        activity::Column::StartTime,
                        activity::Column::EndTime,
                        activity::Column::Location,
                        activity::Column::Description,
                        activity::Column::SourceDomain,
                        activity::Column::RawHtml,
                        activity::Column::Metadata,
                        activity::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<CanonicalEvent>, RepositoryError> {
        let model = activity::Entity::find()
            .filter(activity::Column::Url.eq(url))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(CanonicalEvent::from))
    }
}
