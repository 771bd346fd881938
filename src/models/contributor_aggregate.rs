//! Contributor aggregate entity model
//!
//! Per-contributor derived metric keyed by (aggregate, contributor).

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contributor_aggregates")]
pub struct Model {
    /// Slug of the aggregate definition (FK, composite primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub aggregate: String,

    /// Username of the contributor (FK, composite primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub contributor: String,

    /// Structured value payload
    pub value: JsonValue,

    pub meta: Option<JsonValue>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contributor_aggregate_definition::Entity",
        from = "Column::Aggregate",
        to = "super::contributor_aggregate_definition::Column::Slug"
    )]
    Definition,
    #[sea_orm(
        belongs_to = "super::contributor::Entity",
        from = "Column::Contributor",
        to = "super::contributor::Column::Username"
    )]
    Contributor,
}

impl Related<super::contributor_aggregate_definition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Definition.def()
    }
}

impl Related<super::contributor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
