//! Migration to create the contributors table.
//!
//! Contributors are keyed by their username; every other column is optional
//! profile data that collectors and flat-file imports overwrite on upsert.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contributors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contributors::Username)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contributors::Name).text().null())
                    .col(ColumnDef::new(Contributors::Role).text().null())
                    .col(ColumnDef::new(Contributors::Title).text().null())
                    .col(ColumnDef::new(Contributors::AvatarUrl).text().null())
                    .col(ColumnDef::new(Contributors::Bio).text().null())
                    .col(ColumnDef::new(Contributors::SocialProfiles).json().null())
                    .col(ColumnDef::new(Contributors::JoiningDate).date().null())
                    .col(ColumnDef::new(Contributors::Meta).json().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contributors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Contributors {
    Table,
    Username,
    Name,
    Role,
    Title,
    AvatarUrl,
    Bio,
    SocialProfiles,
    JoiningDate,
    Meta,
}
