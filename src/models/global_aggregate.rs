//! Global aggregate entity model
//!
//! Derived org-level metric keyed by slug, recomputed on every run.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "global_aggregates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub slug: String,

    pub name: String,

    pub description: Option<String>,

    /// Structured value payload, e.g. `{"type": "number", "value": 42}`
    pub value: JsonValue,

    /// Hidden aggregates are computed but not displayed
    pub hidden: bool,

    pub meta: Option<JsonValue>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
