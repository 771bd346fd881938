//! Badge definition entity model
//!
//! A badge names its variants (bronze/silver/gold) in a JSON map together
//! with the threshold each variant is earned at.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "badge_definitions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub slug: String,

    pub name: String,

    pub description: String,

    /// Map of variant name to variant metadata
    pub variants: JsonValue,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::contributor_badge::Entity")]
    ContributorBadge,
}

impl Related<super::contributor_badge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContributorBadge.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
