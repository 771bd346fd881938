//! Migration to create the contributor_aggregate_definitions table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContributorAggregateDefinitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContributorAggregateDefinitions::Slug)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContributorAggregateDefinitions::Name)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContributorAggregateDefinitions::Description)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ContributorAggregateDefinitions::Hidden)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ContributorAggregateDefinitions::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum ContributorAggregateDefinitions {
    Table,
    Slug,
    Name,
    Description,
    Hidden,
}
