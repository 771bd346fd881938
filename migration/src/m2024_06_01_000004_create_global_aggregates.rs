//! Migration to create the global_aggregates table.
//!
//! Global aggregates are org-level derived metrics, recomputed on every run
//! and never hand-edited.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GlobalAggregates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GlobalAggregates::Slug)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GlobalAggregates::Name).text().not_null())
                    .col(ColumnDef::new(GlobalAggregates::Description).text().null())
                    .col(ColumnDef::new(GlobalAggregates::Value).json().not_null())
                    .col(
                        ColumnDef::new(GlobalAggregates::Hidden)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(GlobalAggregates::Meta).json().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GlobalAggregates::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GlobalAggregates {
    Table,
    Slug,
    Name,
    Description,
    Value,
    Hidden,
    Meta,
}
