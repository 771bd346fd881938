//! # Badge Repository
//!
//! Badge definitions and earned badges. A contributor holds at most one row
//! per (badge, contributor, variant); awarding an already-held variant is a
//! no-op so `achieved_on` keeps the original earn date.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
};

use crate::models::badge_definition::{
    Column as DefinitionColumn, Entity as BadgeDefinition, Model as DefinitionModel,
};
use crate::models::contributor_badge::{
    Column as BadgeColumn, Entity as ContributorBadge, Model as BadgeModel,
};

/// Repository for badge database operations
pub struct BadgeRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> BadgeRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn upsert_definition(&self, row: DefinitionModel) -> Result<(), DbErr> {
        BadgeDefinition::insert(row.into_active_model())
            .on_conflict(
                OnConflict::column(DefinitionColumn::Slug)
                    .update_columns([
                        DefinitionColumn::Name,
                        DefinitionColumn::Description,
                        DefinitionColumn::Variants,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;
        Ok(())
    }

    /// Award a badge variant. Re-earning the same variant is a no-op keyed
    /// by the (badge, contributor, variant) slug.
    pub async fn award(&self, row: BadgeModel) -> Result<(), DbErr> {
        ContributorBadge::insert(row.into_active_model())
            .on_conflict(OnConflict::column(BadgeColumn::Slug).do_nothing().to_owned())
            .exec_without_returning(self.db)
            .await?;
        Ok(())
    }

    pub async fn get_all_definitions(&self) -> Result<Vec<DefinitionModel>, DbErr> {
        BadgeDefinition::find()
            .order_by_asc(DefinitionColumn::Slug)
            .all(self.db)
            .await
    }

    pub async fn get_all(&self) -> Result<Vec<BadgeModel>, DbErr> {
        ContributorBadge::find()
            .order_by_asc(BadgeColumn::Slug)
            .all(self.db)
            .await
    }

    pub async fn get_for_contributor(&self, username: &str) -> Result<Vec<BadgeModel>, DbErr> {
        ContributorBadge::find()
            .filter(BadgeColumn::Contributor.eq(username))
            .order_by_asc(BadgeColumn::Slug)
            .all(self.db)
            .await
    }
}

/// Deterministic slug for a (badge, contributor, variant) award.
pub fn badge_slug(badge: &str, contributor: &str, variant: &str) -> String {
    format!("{badge}__{contributor}__{variant}")
}
