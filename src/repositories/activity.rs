//! # Activity Repositories
//!
//! Batched activity upserts plus the activity-definition catalog. Activity
//! upserts are last-write-wins keyed by slug; re-scraping the same source
//! window never creates duplicate rows. Definitions are seeded
//! insert-or-ignore so operators can retune the scoring table without
//! scrapes resetting it.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder,
};

use crate::models::activity::{Column, Entity as Activity, Model};
use crate::models::activity_definition::{
    Column as DefinitionColumn, Entity as ActivityDefinition, Model as DefinitionModel,
};
use crate::repositories::BATCH_SIZE;

/// Repository for activity database operations
pub struct ActivityRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ActivityRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Upsert a batch of activities keyed by slug, chunked per statement.
    /// On conflict every mutable column takes the incoming value, so an
    /// event observed again (possibly updated upstream) converges on the
    /// newest observation.
    pub async fn upsert_many(&self, rows: Vec<Model>) -> Result<(), DbErr> {
        for chunk in rows.chunks(BATCH_SIZE) {
            Activity::insert_many(chunk.iter().cloned().map(IntoActiveModel::into_active_model))
                .on_conflict(
                    OnConflict::column(Column::Slug)
                        .update_columns([
                            Column::Contributor,
                            Column::ActivityDefinition,
                            Column::Title,
                            Column::OccuredAt,
                            Column::Link,
                            Column::Text,
                            Column::Points,
                            Column::Meta,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(self.db)
                .await?;
        }
        Ok(())
    }

    /// All activities, newest first.
    pub async fn get_all(&self) -> Result<Vec<Model>, DbErr> {
        Activity::find()
            .order_by_desc(Column::OccuredAt)
            .order_by_asc(Column::Slug)
            .all(self.db)
            .await
    }

    pub async fn get_by_contributor(&self, username: &str) -> Result<Vec<Model>, DbErr> {
        Activity::find()
            .filter(Column::Contributor.eq(username))
            .order_by_desc(Column::OccuredAt)
            .all(self.db)
            .await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Model>, DbErr> {
        Activity::find_by_id(slug).one(self.db).await
    }

    /// Activities inside the half-open window `[since, till)`. Either bound
    /// may be omitted. An activity landing exactly on `till` belongs to the
    /// next window, never this one.
    pub async fn get_in_window(
        &self,
        since: Option<DateTime<Utc>>,
        till: Option<DateTime<Utc>>,
    ) -> Result<Vec<Model>, DbErr> {
        let mut query = Activity::find();
        if let Some(since) = since {
            query = query.filter(Column::OccuredAt.gte(since));
        }
        if let Some(till) = till {
            query = query.filter(Column::OccuredAt.lt(till));
        }
        query.order_by_desc(Column::OccuredAt).all(self.db).await
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        Activity::find().count(self.db).await
    }
}

/// Repository for the activity-definition catalog
pub struct ActivityDefinitionRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ActivityDefinitionRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Seed catalog entries, ignoring slugs that already exist. Collectors
    /// call this from setup() on every run.
    pub async fn seed(&self, defs: Vec<DefinitionModel>) -> Result<(), DbErr> {
        if defs.is_empty() {
            return Ok(());
        }
        ActivityDefinition::insert_many(defs.into_iter().map(IntoActiveModel::into_active_model))
            .on_conflict(
                OnConflict::column(DefinitionColumn::Slug)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;
        Ok(())
    }

    pub async fn get_all(&self) -> Result<Vec<DefinitionModel>, DbErr> {
        ActivityDefinition::find()
            .order_by_asc(DefinitionColumn::Slug)
            .all(self.db)
            .await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<DefinitionModel>, DbErr> {
        ActivityDefinition::find_by_id(slug).one(self.db).await
    }
}
