// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 自适应抓取规则表迁移
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScrapingRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScrapingRules::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ScrapingRules::Domain)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ScrapingRules::EventCardSelector).text().not_null())
                    .col(ColumnDef::new(ScrapingRules::TitleSelector).text().not_null())
                    .col(ColumnDef::new(ScrapingRules::DateSelector).text().not_null())
                    .col(ColumnDef::new(ScrapingRules::LocationSelector).text().not_null())
                    .col(ColumnDef::new(ScrapingRules::LinkSelector).text().not_null())
                    .col(
                        ColumnDef::new(ScrapingRules::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScrapingRules::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScrapingRules {
    Table,
    Id,
    Domain,
    EventCardSelector,
    TitleSelector,
    DateSelector,
    LocationSelector,
    LinkSelector,
    LastUpdated,
}
