//! Contributor badge entity model
//!
//! One row per (badge, contributor, variant); earning an already-held
//! variant is a no-op upsert, enforced by the unique index.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contributor_badges")]
pub struct Model {
    /// Deterministic slug `{badge}__{contributor}__{variant}` (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub slug: String,

    /// Slug of the badge definition (FK)
    pub badge: String,

    /// Username of the contributor (FK)
    pub contributor: String,

    /// Variant name (bronze/silver/gold)
    pub variant: String,

    /// Date the variant was earned
    pub achieved_on: Date,

    pub meta: Option<JsonValue>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::badge_definition::Entity",
        from = "Column::Badge",
        to = "super::badge_definition::Column::Slug"
    )]
    BadgeDefinition,
    #[sea_orm(
        belongs_to = "super::contributor::Entity",
        from = "Column::Contributor",
        to = "super::contributor::Column::Username"
    )]
    Contributor,
}

impl Related<super::badge_definition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BadgeDefinition.def()
    }
}

impl Related<super::contributor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
