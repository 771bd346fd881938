//! # Badge evaluation
//!
//! Rule-driven badge awards recomputed after aggregation. The built-in rule
//! is a points-threshold badge with bronze/silver/gold variants over all-time
//! resolved points. Awards are insert-or-ignore, so the first earn date
//! sticks across reruns.

use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::json;
use tracing::info;

use crate::aggregator::all_time_points;
use crate::error::PipelineError;
use crate::models::badge_definition::Model as BadgeDefinitionModel;
use crate::models::contributor_badge::Model as ContributorBadgeModel;
use crate::repositories::{BadgeRepository, badge_slug};

const POINTS_BADGE: &str = "points_milestone";

/// Threshold per variant, ascending. A contributor earns every variant whose
/// threshold their total meets, not just the highest.
const VARIANTS: [(&str, i64); 3] = [("bronze", 50), ("silver", 250), ("gold", 1000)];

/// Evaluate badge rules against current totals and persist new awards.
pub async fn evaluate_badges(db: &DatabaseConnection) -> Result<(), PipelineError> {
    let repo = BadgeRepository::new(db);
    repo.upsert_definition(points_badge_definition()).await?;

    let totals = all_time_points(db).await?;
    let today = Utc::now().date_naive();

    let mut awarded = 0usize;
    for (username, points) in &totals {
        for (variant, threshold) in VARIANTS {
            if *points < threshold {
                break;
            }
            repo.award(ContributorBadgeModel {
                slug: badge_slug(POINTS_BADGE, username, variant),
                badge: POINTS_BADGE.to_string(),
                contributor: username.clone(),
                variant: variant.to_string(),
                achieved_on: today,
                meta: Some(json!({"points_at_award": points})),
            })
            .await?;
            awarded += 1;
        }
    }

    info!(contributors = totals.len(), evaluated = awarded, "badges evaluated");
    Ok(())
}

fn points_badge_definition() -> BadgeDefinitionModel {
    BadgeDefinitionModel {
        slug: POINTS_BADGE.to_string(),
        name: "Points Milestone".to_string(),
        description: "Lifetime contribution points milestones".to_string(),
        variants: json!({
            "bronze": {"threshold": 50},
            "silver": {"threshold": 250},
            "gold": {"threshold": 1000},
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_in_memory;
    use crate::models::activity::Model as ActivityModel;
    use crate::models::activity_definition::Model as DefinitionModel;
    use crate::models::contributor::Model as ContributorModel;
    use crate::repositories::{ActivityDefinitionRepository, ActivityRepository, ContributorRepository};
    use chrono::TimeZone;

    async fn seed_points(db: &DatabaseConnection, username: &str, activities: usize, each: i16) {
        ContributorRepository::new(db)
            .insert_missing(vec![ContributorModel::stub(username)])
            .await
            .unwrap();
        ActivityDefinitionRepository::new(db)
            .seed(vec![DefinitionModel {
                slug: "pr_merged".to_string(),
                name: "PR Merged".to_string(),
                description: String::new(),
                points: Some(10),
                icon: None,
            }])
            .await
            .unwrap();
        let rows = (0..activities)
            .map(|i| ActivityModel {
                slug: format!("{username}/pr/{i}"),
                contributor: username.to_string(),
                activity_definition: "pr_merged".to_string(),
                title: None,
                occured_at: Utc
                    .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
                    .unwrap()
                    .fixed_offset(),
                link: None,
                text: None,
                points: Some(each),
                meta: None,
            })
            .collect();
        ActivityRepository::new(db).upsert_many(rows).await.unwrap();
    }

    #[tokio::test]
    async fn thresholds_award_cumulative_variants() {
        let db = init_in_memory().await.unwrap();
        // 300 points: bronze and silver, not gold
        seed_points(&db, "alice", 6, 50).await;

        evaluate_badges(&db).await.unwrap();

        let badges = BadgeRepository::new(&db)
            .get_for_contributor("alice")
            .await
            .unwrap();
        let variants: Vec<&str> = badges.iter().map(|b| b.variant.as_str()).collect();
        assert_eq!(variants, vec!["bronze", "silver"]);
    }

    #[tokio::test]
    async fn below_threshold_earns_nothing() {
        let db = init_in_memory().await.unwrap();
        seed_points(&db, "bob", 1, 10).await;

        evaluate_badges(&db).await.unwrap();

        let badges = BadgeRepository::new(&db)
            .get_for_contributor("bob")
            .await
            .unwrap();
        assert!(badges.is_empty());
    }

    #[tokio::test]
    async fn reevaluation_is_idempotent() {
        let db = init_in_memory().await.unwrap();
        seed_points(&db, "alice", 1, 100).await;

        evaluate_badges(&db).await.unwrap();
        evaluate_badges(&db).await.unwrap();

        let badges = BadgeRepository::new(&db).get_all().await.unwrap();
        assert_eq!(badges.len(), 1);
    }
}
