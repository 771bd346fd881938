//! # Aggregate Repository
//!
//! Writes for the derived-metric tables. Aggregates are materialized views
//! over activities: recomputed on every run, never hand-edited, so every
//! write is a plain last-write-wins upsert.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
};

use crate::models::contributor_aggregate::{
    Column as ContributorAggregateColumn, Entity as ContributorAggregate,
    Model as ContributorAggregateModel,
};
use crate::models::contributor_aggregate_definition::{
    Column as DefinitionColumn, Entity as ContributorAggregateDefinition,
    Model as DefinitionModel,
};
use crate::models::global_aggregate::{
    Column as GlobalAggregateColumn, Entity as GlobalAggregate, Model as GlobalAggregateModel,
};

/// Repository for aggregate database operations
pub struct AggregateRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AggregateRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn upsert_global(&self, row: GlobalAggregateModel) -> Result<(), DbErr> {
        GlobalAggregate::insert(row.into_active_model())
            .on_conflict(
                OnConflict::column(GlobalAggregateColumn::Slug)
                    .update_columns([
                        GlobalAggregateColumn::Name,
                        GlobalAggregateColumn::Description,
                        GlobalAggregateColumn::Value,
                        GlobalAggregateColumn::Hidden,
                        GlobalAggregateColumn::Meta,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;
        Ok(())
    }

    pub async fn upsert_definition(&self, row: DefinitionModel) -> Result<(), DbErr> {
        ContributorAggregateDefinition::insert(row.into_active_model())
            .on_conflict(
                OnConflict::column(DefinitionColumn::Slug)
                    .update_columns([
                        DefinitionColumn::Name,
                        DefinitionColumn::Description,
                        DefinitionColumn::Hidden,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;
        Ok(())
    }

    pub async fn upsert_contributor(
        &self,
        row: ContributorAggregateModel,
    ) -> Result<(), DbErr> {
        ContributorAggregate::insert(row.into_active_model())
            .on_conflict(
                OnConflict::columns([
                    ContributorAggregateColumn::Aggregate,
                    ContributorAggregateColumn::Contributor,
                ])
                .update_columns([
                    ContributorAggregateColumn::Value,
                    ContributorAggregateColumn::Meta,
                ])
                .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;
        Ok(())
    }

    pub async fn get_all_global(&self) -> Result<Vec<GlobalAggregateModel>, DbErr> {
        GlobalAggregate::find()
            .order_by_asc(GlobalAggregateColumn::Slug)
            .all(self.db)
            .await
    }

    pub async fn get_global(&self, slug: &str) -> Result<Option<GlobalAggregateModel>, DbErr> {
        GlobalAggregate::find_by_id(slug).one(self.db).await
    }

    pub async fn get_all_definitions(&self) -> Result<Vec<DefinitionModel>, DbErr> {
        ContributorAggregateDefinition::find()
            .order_by_asc(DefinitionColumn::Slug)
            .all(self.db)
            .await
    }

    pub async fn get_all_contributor(&self) -> Result<Vec<ContributorAggregateModel>, DbErr> {
        ContributorAggregate::find()
            .order_by_asc(ContributorAggregateColumn::Aggregate)
            .order_by_asc(ContributorAggregateColumn::Contributor)
            .all(self.db)
            .await
    }

    pub async fn get_for_contributor(
        &self,
        username: &str,
    ) -> Result<Vec<ContributorAggregateModel>, DbErr> {
        ContributorAggregate::find()
            .filter(ContributorAggregateColumn::Contributor.eq(username))
            .order_by_asc(ContributorAggregateColumn::Aggregate)
            .all(self.db)
            .await
    }
}
