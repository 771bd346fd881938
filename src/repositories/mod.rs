//! # Repositories
//!
//! Data-access layer over the embedded database. All writes are batched
//! upserts keyed by natural unique slugs: calling them repeatedly with
//! overlapping data is safe, and the unique constraint plus
//! `ON CONFLICT DO UPDATE` is the sole de-duplication mechanism.

pub mod activity;
pub mod aggregate;
pub mod badge;
pub mod contributor;

pub use activity::{ActivityDefinitionRepository, ActivityRepository};
pub use aggregate::AggregateRepository;
pub use badge::{BadgeRepository, badge_slug};
pub use contributor::ContributorRepository;

/// Rows per upsert statement. Batches above this are chunked.
pub(crate) const BATCH_SIZE: usize = 500;
