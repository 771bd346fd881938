//! # Data Models
//!
//! SeaORM entity models for every table in the leaderboard schema.

pub mod activity;
pub mod activity_definition;
pub mod badge_definition;
pub mod contributor;
pub mod contributor_aggregate;
pub mod contributor_aggregate_definition;
pub mod contributor_badge;
pub mod global_aggregate;

pub use activity::Entity as Activity;
pub use activity_definition::Entity as ActivityDefinition;
pub use badge_definition::Entity as BadgeDefinition;
pub use contributor::Entity as Contributor;
pub use contributor_aggregate::Entity as ContributorAggregate;
pub use contributor_aggregate_definition::Entity as ContributorAggregateDefinition;
pub use contributor_badge::Entity as ContributorBadge;
pub use global_aggregate::Entity as GlobalAggregate;
