//! Migration to create the badge_definitions table.
//!
//! Variants is a JSON map of variant name (bronze/silver/gold) to its
//! display metadata and threshold.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BadgeDefinitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BadgeDefinitions::Slug)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BadgeDefinitions::Name).text().not_null())
                    .col(
                        ColumnDef::new(BadgeDefinitions::Description)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BadgeDefinitions::Variants).json().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BadgeDefinitions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BadgeDefinitions {
    Table,
    Slug,
    Name,
    Description,
    Variants,
}
