//! Migration to create the contributor_badges table.
//!
//! A contributor holds at most one row per (badge, contributor, variant);
//! the unique index makes re-awarding the same variant a no-op upsert.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContributorBadges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContributorBadges::Slug)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContributorBadges::Badge).text().not_null())
                    .col(
                        ColumnDef::new(ContributorBadges::Contributor)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContributorBadges::Variant).text().not_null())
                    .col(
                        ColumnDef::new(ContributorBadges::AchievedOn)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContributorBadges::Meta).json().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contributor_badges_badge")
                            .from(ContributorBadges::Table, ContributorBadges::Badge)
                            .to(BadgeDefinitions::Table, BadgeDefinitions::Slug)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contributor_badges_contributor")
                            .from(ContributorBadges::Table, ContributorBadges::Contributor)
                            .to(Contributors::Table, Contributors::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contributor_badges_unique")
                    .table(ContributorBadges::Table)
                    .col(ContributorBadges::Badge)
                    .col(ContributorBadges::Contributor)
                    .col(ContributorBadges::Variant)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contributor_badges_contributor")
                    .table(ContributorBadges::Table)
                    .col(ContributorBadges::Contributor)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_contributor_badges_unique")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_contributor_badges_contributor")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ContributorBadges::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ContributorBadges {
    Table,
    Slug,
    Badge,
    Contributor,
    Variant,
    AchievedOn,
    Meta,
}

#[derive(DeriveIden)]
enum BadgeDefinitions {
    Table,
    Slug,
}

#[derive(DeriveIden)]
enum Contributors {
    Table,
    Username,
}
