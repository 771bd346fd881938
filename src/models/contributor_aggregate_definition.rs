//! Contributor aggregate definition entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contributor_aggregate_definitions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub slug: String,

    pub name: String,

    pub description: Option<String>,

    pub hidden: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::contributor_aggregate::Entity")]
    ContributorAggregate,
}

impl Related<super::contributor_aggregate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContributorAggregate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
