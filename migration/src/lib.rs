//! Database migrations for the leaderboard pipeline.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2024_06_01_000001_create_contributors;
mod m2024_06_01_000002_create_activity_definitions;
mod m2024_06_01_000003_create_activities;
mod m2024_06_01_000004_create_global_aggregates;
mod m2024_06_01_000005_create_contributor_aggregate_definitions;
mod m2024_06_01_000006_create_contributor_aggregates;
mod m2024_06_01_000007_create_badge_definitions;
mod m2024_06_01_000008_create_contributor_badges;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_06_01_000001_create_contributors::Migration),
            Box::new(m2024_06_01_000002_create_activity_definitions::Migration),
            Box::new(m2024_06_01_000003_create_activities::Migration),
            Box::new(m2024_06_01_000004_create_global_aggregates::Migration),
            Box::new(m2024_06_01_000005_create_contributor_aggregate_definitions::Migration),
            Box::new(m2024_06_01_000006_create_contributor_aggregates::Migration),
            Box::new(m2024_06_01_000007_create_badge_definitions::Migration),
            Box::new(m2024_06_01_000008_create_contributor_badges::Migration),
        ]
    }
}
