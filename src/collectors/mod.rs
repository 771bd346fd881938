//! # Collectors
//!
//! Collector trait definition and shared plumbing. A collector knows how to
//! seed its activity-type catalog entries and fetch + normalize events from
//! one external source into the common activity shape.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::OrgConfig;
use crate::models::activity::Model as ActivityModel;
use crate::models::contributor::Model as ContributorModel;
use crate::repositories::{ActivityRepository, ContributorRepository};

pub mod github;
pub mod github_discussions;
pub mod github_events;
pub mod registry;
pub mod slack_eod;

pub use registry::{CollectorRegistry, RegistryError};

/// Collector-specific error types for structured error handling.
///
/// These surface only when a collector's whole scrape fails; per-unit
/// failures (one repository, one page, one message) are logged and skipped
/// inside the collector.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The collector's config section is missing or malformed
    #[error("configuration error: {0}")]
    Config(String),

    /// Upstream returned a non-success status
    #[error("HTTP error {status} from {url}")]
    Http { status: u16, url: String },

    /// Network or connectivity error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Storage failure propagated out of a batch write
    #[error("storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),
}

/// Context passed to collector methods. Constructed per collector per run
/// and passed by reference; there is no shared global state.
pub struct CollectorContext<'a> {
    /// Shared embedded-database connection
    pub db: &'a DatabaseConnection,
    /// The collector's opaque config section from `config.yaml`; each
    /// collector validates its own expected subset
    pub config: &'a serde_json::Value,
    /// Organization configuration
    pub org: &'a OrgConfig,
    /// Incremental lower bound: events strictly older than this are skipped
    /// and pagination stops once a page falls entirely before it
    pub since: DateTime<Utc>,
}

#[async_trait]
pub trait Collector: Send + Sync {
    /// Unique collector name, referenced by `source` in `config.yaml`.
    fn name(&self) -> &str;

    /// Semantic version of the collector.
    fn version(&self) -> &str;

    /// Idempotently seed this collector's activity definitions.
    async fn setup(&self, ctx: &CollectorContext<'_>) -> Result<(), CollectorError>;

    /// Fetch from the external source and persist normalized activities.
    async fn scrape(&self, ctx: &CollectorContext<'_>) -> Result<(), CollectorError>;
}

/// Derive a deterministic activity slug from a natural external key,
/// e.g. `slug("github-events", &["pr_opened", pr_url])`.
pub fn slug(source: &str, parts: &[&str]) -> String {
    let mut out = String::from(source);
    for part in parts {
        out.push('/');
        out.push_str(&part.replace(['/', ' '], "-"));
    }
    out
}

/// Derive a slug for sources without a natural external ID by hashing the
/// semantically relevant fields. Dedup relies solely on the upsert conflict
/// handling, never on pre-querying existing rows.
pub fn hashed_slug(source: &str, contributor: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"\n");
    hasher.update(contributor.as_bytes());
    for part in parts {
        hasher.update(b"\n");
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();
    format!("{source}/{contributor}/{}", &hex::encode(digest)[..16])
}

/// True when an actor should be discarded before normalization.
pub fn is_filtered_actor(login: &str, blocklist: &[String]) -> bool {
    login.is_empty() || login.ends_with("[bot]") || blocklist.iter().any(|b| b == login)
}

/// Persist one collector batch: contributor stubs first (so activity FKs
/// resolve), then the activities. Unknown usernames are created with NULL
/// profile fields, never rejected; known profiles are left untouched.
pub async fn persist_batch(
    db: &DatabaseConnection,
    activities: Vec<ActivityModel>,
) -> Result<usize, CollectorError> {
    if activities.is_empty() {
        return Ok(0);
    }

    let mut usernames: Vec<&str> = activities.iter().map(|a| a.contributor.as_str()).collect();
    usernames.sort_unstable();
    usernames.dedup();
    let stubs: Vec<ContributorModel> = usernames.into_iter().map(ContributorModel::stub).collect();

    ContributorRepository::new(db).insert_missing(stubs).await?;

    let count = activities.len();
    ActivityRepository::new(db).upsert_many(activities).await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_deterministic_and_flattens_separators() {
        let a = slug(
            "github-events",
            &["pr_opened", "https://github.com/org/repo/pull/7"],
        );
        let b = slug(
            "github-events",
            &["pr_opened", "https://github.com/org/repo/pull/7"],
        );
        assert_eq!(a, b);
        assert!(a.starts_with("github-events/pr_opened/"));
    }

    #[test]
    fn hashed_slug_is_stable_and_distinguishes_fields() {
        let a = hashed_slug("slack-eod", "U123", &["C01", "1718000000.000100"]);
        let b = hashed_slug("slack-eod", "U123", &["C01", "1718000000.000100"]);
        let c = hashed_slug("slack-eod", "U123", &["C01", "1718000000.000200"]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("slack-eod/U123/"));
    }

    #[test]
    fn actor_filter_catches_bots_and_blocklist() {
        let blocklist = vec!["dependabot".to_string()];
        assert!(is_filtered_actor("github-actions[bot]", &blocklist));
        assert!(is_filtered_actor("dependabot", &blocklist));
        assert!(is_filtered_actor("", &blocklist));
        assert!(!is_filtered_actor("alice", &blocklist));
    }
}
