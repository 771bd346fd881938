//! Migration to create the activity_definitions table.
//!
//! Activity definitions are the catalog of trackable event kinds. Each
//! collector seeds its own entries during setup; `points` is the default
//! score applied when an activity row carries no explicit override.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityDefinitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityDefinitions::Slug)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActivityDefinitions::Name).text().not_null())
                    .col(
                        ColumnDef::new(ActivityDefinitions::Description)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ActivityDefinitions::Points)
                            .small_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(ActivityDefinitions::Icon).text().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityDefinitions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ActivityDefinitions {
    Table,
    Slug,
    Name,
    Description,
    Points,
    Icon,
}
