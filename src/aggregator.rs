//! # Aggregation engine
//!
//! Pull-based recomputation over the activities table. The leaderboard and
//! the materialized aggregates are always derived from scratch for the
//! requested window; nothing is maintained incrementally.
//!
//! Point resolution happens at read time: an activity's explicit `points`
//! override wins, otherwise the definition default applies, otherwise zero.
//! Retuning a definition therefore rescores history on the next run.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::error::PipelineError;
use crate::models::activity::Model as ActivityModel;
use crate::models::contributor_aggregate::Model as ContributorAggregateModel;
use crate::models::contributor_aggregate_definition::Model as AggregateDefinitionModel;
use crate::models::global_aggregate::Model as GlobalAggregateModel;
use crate::repositories::{
    ActivityDefinitionRepository, ActivityRepository, AggregateRepository, ContributorRepository,
};

/// Time window selector resolving to a half-open `[since, till)` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFilter {
    AllTime,
    /// The 7 days ending now
    Weekly,
    /// The 30 days ending now
    Monthly,
    /// The 365 days ending now
    Yearly,
    Custom {
        since: Option<DateTime<Utc>>,
        till: Option<DateTime<Utc>>,
    },
}

impl TimeFilter {
    /// Resolve to concrete bounds against a reference "now".
    pub fn bounds(&self, now: DateTime<Utc>) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        match self {
            TimeFilter::AllTime => (None, None),
            TimeFilter::Weekly => (Some(now - Duration::days(7)), None),
            TimeFilter::Monthly => (Some(now - Duration::days(30)), None),
            TimeFilter::Yearly => (Some(now - Duration::days(365)), None),
            TimeFilter::Custom { since, till } => (*since, *till),
        }
    }
}

/// Per-definition slice of one contributor's leaderboard entry.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DefinitionBreakdown {
    pub count: u64,
    pub points: i64,
}

/// One ranked leaderboard row.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    /// Position in the total order, 1-based; ties are resolved by username
    /// so no two rows share a rank
    pub rank: u32,
    pub username: String,
    pub points: i64,
    pub activity_count: u64,
    /// Breakdown keyed by activity-definition slug, sorted for stable output
    pub breakdown: BTreeMap<String, DefinitionBreakdown>,
}

/// Compute the ranked leaderboard for a window.
///
/// Equal point totals are broken by username ascending, giving a strict
/// total order: the lexicographically smaller username ranks higher and
/// every row gets its own sequential rank.
pub async fn leaderboard(
    db: &DatabaseConnection,
    filter: TimeFilter,
) -> Result<Vec<LeaderboardEntry>, PipelineError> {
    let (since, till) = filter.bounds(Utc::now());
    let activities = ActivityRepository::new(db).get_in_window(since, till).await?;
    let definitions = definition_points(db).await?;
    Ok(rank(&activities, &definitions))
}

async fn definition_points(
    db: &DatabaseConnection,
) -> Result<HashMap<String, i64>, PipelineError> {
    let defs = ActivityDefinitionRepository::new(db).get_all().await?;
    Ok(defs
        .into_iter()
        .map(|d| (d.slug, i64::from(d.points.unwrap_or(0))))
        .collect())
}

fn resolve_points(activity: &ActivityModel, definitions: &HashMap<String, i64>) -> i64 {
    activity
        .points
        .map(i64::from)
        .or_else(|| definitions.get(&activity.activity_definition).copied())
        .unwrap_or(0)
}

fn rank(
    activities: &[ActivityModel],
    definitions: &HashMap<String, i64>,
) -> Vec<LeaderboardEntry> {
    struct Tally {
        points: i64,
        count: u64,
        breakdown: BTreeMap<String, DefinitionBreakdown>,
    }

    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
    for activity in activities {
        let points = resolve_points(activity, definitions);
        let tally = tallies.entry(&activity.contributor).or_insert(Tally {
            points: 0,
            count: 0,
            breakdown: BTreeMap::new(),
        });
        tally.points += points;
        tally.count += 1;
        let slice = tally
            .breakdown
            .entry(activity.activity_definition.clone())
            .or_insert(DefinitionBreakdown { count: 0, points: 0 });
        slice.count += 1;
        slice.points += points;
    }

    let mut entries: Vec<LeaderboardEntry> = tallies
        .into_iter()
        .map(|(username, tally)| LeaderboardEntry {
            rank: 0,
            username: username.to_string(),
            points: tally.points,
            activity_count: tally.count,
            breakdown: tally.breakdown,
        })
        .collect();

    // BTreeMap already yields usernames ascending; a stable sort on points
    // keeps that as the tie-break
    entries.sort_by(|a, b| b.points.cmp(&a.points));

    for (position, entry) in entries.iter_mut().enumerate() {
        entry.rank = position as u32 + 1;
    }
    entries
}

/// Recompute and persist the standard global and per-contributor aggregates.
pub async fn write_standard_aggregates(db: &DatabaseConnection) -> Result<(), PipelineError> {
    let now = Utc::now();
    let activities = ActivityRepository::new(db).get_all().await?;
    let definitions = definition_points(db).await?;
    let contributor_count = ContributorRepository::new(db).count().await?;
    let repo = AggregateRepository::new(db);

    let thirty_days_ago = now - Duration::days(30);
    let active_recently: HashSet<&str> = activities
        .iter()
        .filter(|a| a.occured_at.with_timezone(&Utc) >= thirty_days_ago)
        .map(|a| a.contributor.as_str())
        .collect();

    for (slug, name, value) in [
        (
            "total_contributors",
            "Total Contributors",
            json!({"type": "number", "value": contributor_count}),
        ),
        (
            "total_activities",
            "Total Activities",
            json!({"type": "number", "value": activities.len()}),
        ),
        (
            "active_contributors_last_30d",
            "Active Contributors (30 days)",
            json!({"type": "number", "value": active_recently.len()}),
        ),
    ] {
        repo.upsert_global(GlobalAggregateModel {
            slug: slug.to_string(),
            name: name.to_string(),
            description: None,
            value,
            hidden: false,
            meta: None,
        })
        .await?;
    }

    for (slug, name, hidden) in [
        ("total_activity_points", "Total Activity Points", false),
        ("activity_count", "Activity Count", false),
        ("first_activity_date", "First Activity", true),
        ("last_activity_date", "Last Activity", true),
        ("active_days", "Active Days", false),
        ("avg_points_per_activity", "Average Points per Activity", true),
    ] {
        repo.upsert_definition(AggregateDefinitionModel {
            slug: slug.to_string(),
            name: name.to_string(),
            description: None,
            hidden,
        })
        .await?;
    }

    struct Stats {
        points: i64,
        count: u64,
        first: DateTime<Utc>,
        last: DateTime<Utc>,
        days: HashSet<NaiveDate>,
    }

    let mut stats: BTreeMap<&str, Stats> = BTreeMap::new();
    for activity in &activities {
        let at = activity.occured_at.with_timezone(&Utc);
        let points = resolve_points(activity, &definitions);
        let entry = stats.entry(&activity.contributor).or_insert(Stats {
            points: 0,
            count: 0,
            first: at,
            last: at,
            days: HashSet::new(),
        });
        entry.points += points;
        entry.count += 1;
        entry.first = entry.first.min(at);
        entry.last = entry.last.max(at);
        entry.days.insert(at.date_naive());
    }

    for (username, s) in &stats {
        let avg = if s.count == 0 {
            0.0
        } else {
            s.points as f64 / s.count as f64
        };
        for (slug, value) in [
            ("total_activity_points", json!({"type": "number", "value": s.points})),
            ("activity_count", json!({"type": "number", "value": s.count})),
            (
                "first_activity_date",
                json!({"type": "date", "value": s.first.to_rfc3339()}),
            ),
            (
                "last_activity_date",
                json!({"type": "date", "value": s.last.to_rfc3339()}),
            ),
            ("active_days", json!({"type": "number", "value": s.days.len()})),
            (
                "avg_points_per_activity",
                json!({"type": "number", "value": (avg * 100.0).round() / 100.0}),
            ),
        ] {
            repo.upsert_contributor(ContributorAggregateModel {
                aggregate: slug.to_string(),
                contributor: username.to_string(),
                value,
                meta: None,
            })
            .await?;
        }
    }

    info!(
        contributors = stats.len(),
        activities = activities.len(),
        "aggregates recomputed"
    );
    Ok(())
}

/// All-time resolved points per contributor, used by badge evaluation.
pub async fn all_time_points(
    db: &DatabaseConnection,
) -> Result<BTreeMap<String, i64>, PipelineError> {
    let activities = ActivityRepository::new(db).get_all().await?;
    let definitions = definition_points(db).await?;
    let mut totals = BTreeMap::new();
    for activity in &activities {
        *totals.entry(activity.contributor.clone()).or_insert(0) +=
            resolve_points(activity, &definitions);
    }
    Ok(totals)
}
