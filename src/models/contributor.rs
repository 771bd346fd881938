//! Contributor entity model
//!
//! A contributor is keyed by username; profile fields are optional and are
//! overwritten wholesale on upsert (last-write-wins, never merged).

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Contributor entity representing a person tracked by the leaderboard
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contributors")]
pub struct Model {
    /// Unique username (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,

    /// Display name
    pub name: Option<String>,

    /// Role, validated against the configured role set
    pub role: Option<String>,

    /// Free-form title (e.g. "Staff Engineer")
    pub title: Option<String>,

    /// Avatar image URL
    pub avatar_url: Option<String>,

    /// Free-text biography (markdown body in the flat-file format)
    pub bio: Option<String>,

    /// Map of platform name to profile URL
    pub social_profiles: Option<JsonValue>,

    /// Date the contributor joined the community
    pub joining_date: Option<Date>,

    /// Open-ended metadata bag
    pub meta: Option<JsonValue>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::activity::Entity")]
    Activity,
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Minimal row for a username discovered during activity ingestion.
    /// Unknown profile fields stay NULL until a richer source fills them in.
    pub fn stub(username: &str) -> Self {
        Self {
            username: username.to_string(),
            name: None,
            role: None,
            title: None,
            avatar_url: None,
            bio: None,
            social_profiles: None,
            joining_date: None,
            meta: None,
        }
    }
}
