//! Activity definition entity model
//!
//! Catalog entry for a kind of trackable event. Seeded idempotently by each
//! collector's setup step; `points` is the default score for activities of
//! this kind that carry no explicit override.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_definitions")]
pub struct Model {
    /// Catalog slug (primary key), e.g. `pr_opened`
    #[sea_orm(primary_key, auto_increment = false)]
    pub slug: String,

    /// Human-readable name
    pub name: String,

    /// Description shown in the UI
    pub description: String,

    /// Default point value; NULL counts as zero at resolution time
    pub points: Option<i16>,

    /// Icon identifier
    pub icon: Option<String>,
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
