//! Migration to create the contributor_aggregates table.
//!
//! Per-contributor derived metrics keyed by (aggregate, contributor).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContributorAggregates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContributorAggregates::Aggregate)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContributorAggregates::Contributor)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContributorAggregates::Value)
                            .json()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContributorAggregates::Meta).json().null())
                    .primary_key(
                        Index::create()
                            .col(ContributorAggregates::Aggregate)
                            .col(ContributorAggregates::Contributor),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contributor_aggregates_aggregate")
                            .from(
                                ContributorAggregates::Table,
                                ContributorAggregates::Aggregate,
                            )
                            .to(
                                ContributorAggregateDefinitions::Table,
                                ContributorAggregateDefinitions::Slug,
                            )
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contributor_aggregates_contributor")
                            .from(
                                ContributorAggregates::Table,
                                ContributorAggregates::Contributor,
                            )
                            .to(Contributors::Table, Contributors::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contributor_aggregates_contributor")
                    .table(ContributorAggregates::Table)
                    .col(ContributorAggregates::Contributor)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contributor_aggregates_aggregate")
                    .table(ContributorAggregates::Table)
                    .col(ContributorAggregates::Aggregate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_contributor_aggregates_contributor")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_contributor_aggregates_aggregate")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ContributorAggregates::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ContributorAggregates {
    Table,
    Aggregate,
    Contributor,
    Value,
    Meta,
}

#[derive(DeriveIden)]
enum ContributorAggregateDefinitions {
    Table,
    Slug,
}

#[derive(DeriveIden)]
enum Contributors {
    Table,
    Username,
}
