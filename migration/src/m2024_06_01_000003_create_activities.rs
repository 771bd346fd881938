//! Migration to create the activities table.
//!
//! Activities are observed events keyed by a deterministic slug so that
//! re-scraping the same source window upserts instead of duplicating.
//! `occured_at` (spelling preserved from the exported data format) is the
//! authoritative timestamp for time-window filtering.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

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
                        ColumnDef::new(Activities::Slug)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Activities::Contributor).text().not_null())
                    .col(
                        ColumnDef::new(Activities::ActivityDefinition)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Activities::Title).text().null())
                    .col(
                        ColumnDef::new(Activities::OccuredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Activities::Link).text().null())
                    .col(ColumnDef::new(Activities::Text).text().null())
                    .col(ColumnDef::new(Activities::Points).small_integer().null())
                    .col(ColumnDef::new(Activities::Meta).json().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activities_contributor")
                            .from(Activities::Table, Activities::Contributor)
                            .to(Contributors::Table, Contributors::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activities_activity_definition")
                            .from(Activities::Table, Activities::ActivityDefinition)
                            .to(ActivityDefinitions::Table, ActivityDefinitions::Slug)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Time-window queries scan occured_at DESC; raw SQL for the DESC index
        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                "CREATE INDEX IF NOT EXISTS idx_activities_occured_at ON activities (occured_at DESC)".to_string(),
            ))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activities_contributor")
                    .table(Activities::Table)
                    .col(Activities::Contributor)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activities_definition")
                    .table(Activities::Table)
                    .col(Activities::ActivityDefinition)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_activities_occured_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_activities_contributor").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_activities_definition").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Activities::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Activities {
    Table,
    Slug,
    Contributor,
    ActivityDefinition,
    Title,
    OccuredAt,
    Link,
    Text,
    Points,
    Meta,
}

#[derive(DeriveIden)]
enum Contributors {
    Table,
    Username,
}

#[derive(DeriveIden)]
enum ActivityDefinitions {
    Table,
    Slug,
}
