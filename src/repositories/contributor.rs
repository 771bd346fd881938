//! # Contributor Repository
//!
//! Batched contributor upserts and read queries. Upserts are
//! last-write-wins: every mutable column is overwritten with the incoming
//! value on conflict, never merged. There is no delete path; contributor
//! lifecycle is entirely upsert-driven.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder,
};

use crate::models::contributor::{Column, Entity as Contributor, Model};
use crate::repositories::BATCH_SIZE;

/// Repository for contributor database operations
pub struct ContributorRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ContributorRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Upsert a batch of contributors keyed by username, chunked per
    /// statement. On conflict every mutable column takes the incoming value.
    pub async fn upsert_many(&self, rows: Vec<Model>) -> Result<(), DbErr> {
        for chunk in rows.chunks(BATCH_SIZE) {
            Contributor::insert_many(chunk.iter().cloned().map(IntoActiveModel::into_active_model))
                .on_conflict(
                    OnConflict::column(Column::Username)
                        .update_columns([
                            Column::Name,
                            Column::Role,
                            Column::Title,
                            Column::AvatarUrl,
                            Column::Bio,
                            Column::SocialProfiles,
                            Column::JoiningDate,
                            Column::Meta,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(self.db)
                .await?;
        }
        Ok(())
    }

    /// Insert contributors that do not exist yet, leaving existing rows
    /// untouched. Used when usernames are discovered as a side effect of
    /// activity ingestion and profile data should not be clobbered.
    pub async fn insert_missing(&self, rows: Vec<Model>) -> Result<(), DbErr> {
        for chunk in rows.chunks(BATCH_SIZE) {
            Contributor::insert_many(chunk.iter().cloned().map(IntoActiveModel::into_active_model))
                .on_conflict(
                    OnConflict::column(Column::Username)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(self.db)
                .await?;
        }
        Ok(())
    }

    /// All contributors ordered by username for stable output.
    pub async fn get_all(&self) -> Result<Vec<Model>, DbErr> {
        Contributor::find()
            .order_by_asc(Column::Username)
            .all(self.db)
            .await
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<Model>, DbErr> {
        Contributor::find_by_id(username).one(self.db).await
    }

    pub async fn get_by_role(&self, role: &str) -> Result<Vec<Model>, DbErr> {
        Contributor::find()
            .filter(Column::Role.eq(role))
            .order_by_asc(Column::Username)
            .all(self.db)
            .await
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        Contributor::find().count(self.db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_in_memory;
    use crate::models::contributor::Model;

    fn contributor(username: &str, name: Option<&str>, avatar: Option<&str>) -> Model {
        Model {
            username: username.to_string(),
            name: name.map(str::to_string),
            role: None,
            title: None,
            avatar_url: avatar.map(str::to_string),
            bio: None,
            social_profiles: None,
            joining_date: None,
            meta: None,
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let db = init_in_memory().await.unwrap();
        let repo = ContributorRepository::new(&db);

        let rows = vec![contributor("alice", Some("Alice"), None)];
        repo.upsert_many(rows.clone()).await.unwrap();
        repo.upsert_many(rows).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn upsert_is_last_write_wins_not_merge() {
        let db = init_in_memory().await.unwrap();
        let repo = ContributorRepository::new(&db);

        repo.upsert_many(vec![contributor(
            "alice",
            Some("Alice"),
            Some("https://old.example/a.png"),
        )])
        .await
        .unwrap();

        // Second write carries a new avatar but no name; the NULL name must
        // overwrite, not preserve, the old value
        repo.upsert_many(vec![contributor(
            "alice",
            None,
            Some("https://new.example/a.png"),
        )])
        .await
        .unwrap();

        let alice = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(alice.avatar_url.as_deref(), Some("https://new.example/a.png"));
        assert_eq!(alice.name, None);
    }

    #[tokio::test]
    async fn insert_missing_preserves_existing_profile() {
        let db = init_in_memory().await.unwrap();
        let repo = ContributorRepository::new(&db);

        repo.upsert_many(vec![contributor("alice", Some("Alice"), None)])
            .await
            .unwrap();

        repo.insert_missing(vec![Model::stub("alice"), Model::stub("bob")])
            .await
            .unwrap();

        let alice = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(alice.name.as_deref(), Some("Alice"));
        let bob = repo.get_by_username("bob").await.unwrap().unwrap();
        assert_eq!(bob.name, None);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn get_all_orders_by_username() {
        let db = init_in_memory().await.unwrap();
        let repo = ContributorRepository::new(&db);

        repo.upsert_many(vec![
            contributor("zoe", None, None),
            contributor("alice", None, None),
            contributor("mallory", None, None),
        ])
        .await
        .unwrap();

        let all = repo.get_all().await.unwrap();
        let usernames: Vec<&str> = all.iter().map(|c| c.username.as_str()).collect();
        assert_eq!(usernames, vec!["alice", "mallory", "zoe"]);
    }
}
