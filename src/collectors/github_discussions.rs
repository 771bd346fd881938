//! GitHub discussions collector.
//!
//! Normalizes discussion threads of the configured organization into
//! `discussion_created` activities for the author and `discussion_answered`
//! activities for whoever provided the chosen answer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::github::{Discussion, GithubClient, GithubConfig, PER_PAGE, Repo};
use super::{Collector, CollectorContext, CollectorError, is_filtered_actor, persist_batch, slug};
use crate::models::activity::Model as ActivityModel;
use crate::models::activity_definition::Model as DefinitionModel;
use crate::repositories::ActivityDefinitionRepository;

const SOURCE: &str = "github-discussions";
const MAX_DISCUSSION_PAGES: u32 = 5;

pub struct GithubDiscussionsCollector;

impl GithubDiscussionsCollector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GithubDiscussionsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collector for GithubDiscussionsCollector {
    fn name(&self) -> &str {
        SOURCE
    }

    fn version(&self) -> &str {
        "0.1.0"
    }

    async fn setup(&self, ctx: &CollectorContext<'_>) -> Result<(), CollectorError> {
        ActivityDefinitionRepository::new(ctx.db)
            .seed(default_definitions())
            .await?;
        Ok(())
    }

    async fn scrape(&self, ctx: &CollectorContext<'_>) -> Result<(), CollectorError> {
        let config = GithubConfig::from_value(ctx.config)?;
        let client = GithubClient::new(&config)?;

        let repos = client.list_org_repos(&config.org).await?;
        let mut activities = Vec::new();
        for repo in &repos {
            match scrape_repo(&client, repo, ctx.since, &config.blocklist).await {
                Ok(batch) => activities.extend(batch),
                // Discussions may simply be disabled on a repository
                Err(CollectorError::Http { status: 404, .. }) => continue,
                Err(err) => warn!(repo = %repo.full_name, error = %err, "skipping repository"),
            }
        }

        let count = persist_batch(ctx.db, activities).await?;
        info!(activities = count, "github discussions persisted");
        Ok(())
    }
}

async fn scrape_repo(
    client: &GithubClient,
    repo: &Repo,
    since: DateTime<Utc>,
    blocklist: &[String],
) -> Result<Vec<ActivityModel>, CollectorError> {
    let mut activities = Vec::new();
    for page in 1..=MAX_DISCUSSION_PAGES {
        let discussions: Vec<Discussion> = client
            .get_json(
                &format!("/repos/{}/discussions", repo.full_name),
                &[
                    ("per_page", PER_PAGE.to_string()),
                    ("page", page.to_string()),
                    ("direction", "desc".to_string()),
                ],
            )
            .await?;
        if discussions.is_empty() {
            break;
        }
        let exhausted = discussions.iter().all(|d| d.created_at < since);
        for discussion in &discussions {
            activities.extend(normalize_discussion(discussion, since, blocklist));
        }
        if exhausted {
            break;
        }
    }
    Ok(activities)
}

fn normalize_discussion(
    discussion: &Discussion,
    since: DateTime<Utc>,
    blocklist: &[String],
) -> Vec<ActivityModel> {
    let mut activities = Vec::new();

    if discussion.created_at >= since && !is_filtered_actor(&discussion.user.login, blocklist) {
        activities.push(ActivityModel {
            slug: slug(SOURCE, &["discussion_created", &discussion.html_url]),
            contributor: discussion.user.login.clone(),
            activity_definition: "discussion_created".to_string(),
            title: Some(discussion.title.clone()),
            occured_at: discussion.created_at.fixed_offset(),
            link: Some(discussion.html_url.clone()),
            text: None,
            points: None,
            meta: None,
        });
    }

    // An accepted answer scores for the answerer, not the thread author
    if let (Some(answered_at), Some(answerer)) =
        (discussion.answer_chosen_at, &discussion.answer_chosen_by)
    {
        if answered_at >= since && !is_filtered_actor(&answerer.login, blocklist) {
            activities.push(ActivityModel {
                slug: slug(SOURCE, &["discussion_answered", &discussion.html_url]),
                contributor: answerer.login.clone(),
                activity_definition: "discussion_answered".to_string(),
                title: Some(discussion.title.clone()),
                occured_at: answered_at.fixed_offset(),
                link: Some(discussion.html_url.clone()),
                text: None,
                points: None,
                meta: None,
            });
        }
    }

    activities
}

fn default_definitions() -> Vec<DefinitionModel> {
    vec![
        DefinitionModel {
            slug: "discussion_created".to_string(),
            name: "Discussion Created".to_string(),
            description: "Started a discussion thread".to_string(),
            points: Some(2),
            icon: Some("comment-discussion".to_string()),
        },
        DefinitionModel {
            slug: "discussion_answered".to_string(),
            name: "Discussion Answered".to_string(),
            description: "Provided the accepted answer to a discussion".to_string(),
            points: Some(5),
            icon: Some("check-circle".to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn discussion(answered: bool) -> Discussion {
        serde_json::from_value(json!({
            "number": 3,
            "title": "How do I configure scrapers?",
            "html_url": "https://github.com/example/repo/discussions/3",
            "created_at": "2024-06-05T08:00:00Z",
            "user": {"login": "carol"},
            "answer_chosen_at": answered.then_some("2024-06-06T09:00:00Z"),
            "answer_chosen_by": answered.then_some(json!({"login": "dave"})),
        }))
        .unwrap()
    }

    #[test]
    fn answered_discussion_scores_both_sides() {
        let since = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let activities = normalize_discussion(&discussion(true), since, &[]);
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].activity_definition, "discussion_created");
        assert_eq!(activities[0].contributor, "carol");
        assert_eq!(activities[1].activity_definition, "discussion_answered");
        assert_eq!(activities[1].contributor, "dave");
    }

    #[test]
    fn unanswered_discussion_scores_author_only() {
        let since = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let activities = normalize_discussion(&discussion(false), since, &[]);
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].contributor, "carol");
    }

    #[test]
    fn old_thread_with_fresh_answer_scores_answer_only() {
        // Thread predates the window but the accepted answer is inside it
        let since = Utc.with_ymd_and_hms(2024, 6, 6, 0, 0, 0).unwrap();
        let activities = normalize_discussion(&discussion(true), since, &[]);
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].activity_definition, "discussion_answered");
    }
}
