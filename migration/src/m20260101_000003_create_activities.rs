// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 活动（事件）表迁移
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Activities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Activities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Activities::Title).text().not_null())
                    .col(ColumnDef::new(Activities::StartTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(Activities::EndTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(Activities::Location).text())
                    .col(
                        ColumnDef::new(Activities::Url)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Activities::Description).text())
                    .col(ColumnDef::new(Activities::SourceDomain).string_len(255).not_null())
                    .col(ColumnDef::new(Activities::RawHtml).text())
                    .col(ColumnDef::new(Activities::Metadata).json())
                    .col(
                        ColumnDef::new(Activities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Activities::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activities_source_domain")
                    .table(Activities::Table)
                    .col(Activities::SourceDomain)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Activities::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Activities {
    Table,
    Id,
    Title,
    StartTime,
    EndTime,
    Location,
    Url,
    Description,
    SourceDomain,
    RawHtml,
    Metadata,
    CreatedAt,
    UpdatedAt,
}
