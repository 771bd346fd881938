//! Activity entity model
//!
//! A single observed event. The slug is deterministically derived from the
//! source, contributor, and natural event key (PR URL, message timestamp) so
//! re-ingestion of the same window upserts rather than duplicating.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    /// Globally unique deterministic slug (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub slug: String,

    /// Username of the contributor (FK)
    pub contributor: String,

    /// Slug of the activity definition (FK)
    pub activity_definition: String,

    /// Optional event title (PR title, discussion title)
    pub title: Option<String>,

    /// When the event occurred; authoritative for time-window filtering.
    /// Column name spelling is preserved from the exported data format.
    pub occured_at: DateTimeWithTimeZone,

    /// Link to the event in the source system
    pub link: Option<String>,

    /// Free-text body (e.g. EOD message text)
    pub text: Option<String>,

    /// Point override; NULL means "use the definition default at read time"
    pub points: Option<i16>,

    /// Open-ended metadata bag (e.g. turnaround duration for merged PRs)
    pub meta: Option<JsonValue>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contributor::Entity",
        from = "Column::Contributor",
        to = "super::contributor::Column::Username"
    )]
    Contributor,
    #[sea_orm(
        belongs_to = "super::activity_definition::Entity",
        from = "Column::ActivityDefinition",
        to = "super::activity_definition::Column::Slug"
    )]
    ActivityDefinition,
}

impl Related<super::contributor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributor.def()
    }
}

impl Related<super::activity_definition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActivityDefinition.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
