//! GitHub events collector.
//!
//! Walks every repository of the configured organization through the
//! repository events feed and normalizes pull-request and issue events into
//! activities. Repositories are fetched with bounded concurrency; one failing
//! repository is logged and skipped without aborting the rest.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::github::{Event, GithubClient, GithubConfig, Issue, PullRequest, Repo, Review};
use super::{Collector, CollectorContext, CollectorError, is_filtered_actor, persist_batch, slug};
use crate::models::activity::Model as ActivityModel;
use crate::models::activity_definition::Model as DefinitionModel;
use crate::repositories::ActivityDefinitionRepository;

const SOURCE: &str = "github-events";
/// Repository events feed caps out at 300 entries
const MAX_EVENT_PAGES: u32 = 3;
const MAX_CONCURRENT_REPOS: usize = 4;

pub struct GithubEventsCollector;

impl GithubEventsCollector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GithubEventsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collector for GithubEventsCollector {
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
        let client = Arc::new(GithubClient::new(&config)?);

        let repos = client.list_org_repos(&config.org).await?;
        info!(
            org = %config.org,
            repos = repos.len(),
            "scanning repository event feeds"
        );

        let blocklist = Arc::new(config.blocklist.clone());
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_REPOS));
        let mut tasks = JoinSet::new();
        for repo in repos {
            let client = Arc::clone(&client);
            let blocklist = Arc::clone(&blocklist);
            let semaphore = Arc::clone(&semaphore);
            let since = ctx.since;
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = scrape_repo(&client, &repo, since, &blocklist).await;
                (repo.full_name, result)
            });
        }

        let mut activities = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let Ok((repo_name, result)) = joined else {
                continue;
            };
            match result {
                Ok(batch) => {
                    debug!(repo = %repo_name, events = batch.len(), "repository scanned");
                    activities.extend(batch);
                }
                // One bad repository never fails the whole collector
                Err(err) => warn!(repo = %repo_name, error = %err, "skipping repository"),
            }
        }

        let count = persist_batch(ctx.db, activities).await?;
        info!(activities = count, "github events persisted");
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
    for page in 1..=MAX_EVENT_PAGES {
        let events: Vec<Event> = client
            .get_json(
                &format!("/repos/{}/events", repo.full_name),
                &[
                    ("per_page", super::github::PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;
        if events.is_empty() {
            break;
        }
        // The feed is newest-first; a page ending before `since` means every
        // later page is older still
        let exhausted = events.iter().all(|e| e.created_at < since);
        for event in &events {
            if event.created_at < since {
                continue;
            }
            activities.extend(normalize_event(event, blocklist));
        }
        if exhausted {
            break;
        }
    }
    Ok(activities)
}

/// Map one raw feed event onto zero or more activities.
fn normalize_event(event: &Event, blocklist: &[String]) -> Vec<ActivityModel> {
    let action = event.payload["action"].as_str().unwrap_or_default();
    match event.event_type.as_str() {
        "PullRequestEvent" => {
            let Ok(pr) = serde_json::from_value::<PullRequest>(event.payload["pull_request"].clone())
            else {
                return Vec::new();
            };
            if is_filtered_actor(&pr.user.login, blocklist) {
                return Vec::new();
            }
            match (action, pr.merged_at) {
                ("opened", _) => vec![pr_activity("pr_opened", &pr, pr.created_at, None)],
                ("closed", Some(merged_at)) => {
                    let turnaround = (merged_at - pr.created_at).num_seconds().max(0);
                    vec![pr_activity(
                        "pr_merged",
                        &pr,
                        merged_at,
                        Some(json!({"turnaround_secs": turnaround})),
                    )]
                }
                // Closed without merge earns nothing
                _ => Vec::new(),
            }
        }
        "PullRequestReviewEvent" => {
            let Ok(review) = serde_json::from_value::<Review>(event.payload["review"].clone())
            else {
                return Vec::new();
            };
            let title = event.payload["pull_request"]["title"]
                .as_str()
                .map(str::to_string);
            if action != "created" || is_filtered_actor(&review.user.login, blocklist) {
                return Vec::new();
            }
            vec![ActivityModel {
                slug: slug(SOURCE, &["pr_reviewed", &review.html_url]),
                contributor: review.user.login.clone(),
                activity_definition: "pr_reviewed".to_string(),
                title,
                occured_at: review.submitted_at.fixed_offset(),
                link: Some(review.html_url.clone()),
                text: None,
                points: None,
                meta: None,
            }]
        }
        "IssuesEvent" => {
            let Ok(issue) = serde_json::from_value::<Issue>(event.payload["issue"].clone()) else {
                return Vec::new();
            };
            // The issues API mirrors pull requests; those are covered above
            if issue.pull_request.is_some() || is_filtered_actor(&issue.user.login, blocklist) {
                return Vec::new();
            }
            let definition = match action {
                "opened" => "issue_opened",
                "closed" => "issue_closed",
                _ => return Vec::new(),
            };
            vec![ActivityModel {
                slug: slug(SOURCE, &[definition, &issue.html_url]),
                contributor: issue.user.login.clone(),
                activity_definition: definition.to_string(),
                title: Some(issue.title.clone()),
                occured_at: event.created_at.fixed_offset(),
                link: Some(issue.html_url.clone()),
                text: None,
                points: None,
                meta: None,
            }]
        }
        _ => Vec::new(),
    }
}

fn pr_activity(
    definition: &str,
    pr: &PullRequest,
    at: DateTime<Utc>,
    meta: Option<serde_json::Value>,
) -> ActivityModel {
    ActivityModel {
        slug: slug(SOURCE, &[definition, &pr.html_url]),
        contributor: pr.user.login.clone(),
        activity_definition: definition.to_string(),
        title: Some(pr.title.clone()),
        occured_at: at.fixed_offset(),
        link: Some(pr.html_url.clone()),
        text: None,
        points: None,
        meta,
    }
}

fn default_definitions() -> Vec<DefinitionModel> {
    vec![
        DefinitionModel {
            slug: "pr_opened".to_string(),
            name: "Pull Request Opened".to_string(),
            description: "Opened a pull request".to_string(),
            points: Some(5),
            icon: Some("git-pull-request".to_string()),
        },
        DefinitionModel {
            slug: "pr_merged".to_string(),
            name: "Pull Request Merged".to_string(),
            description: "Got a pull request merged".to_string(),
            points: Some(10),
            icon: Some("git-merge".to_string()),
        },
        DefinitionModel {
            slug: "pr_reviewed".to_string(),
            name: "Pull Request Reviewed".to_string(),
            description: "Reviewed a pull request".to_string(),
            points: Some(3),
            icon: Some("eye".to_string()),
        },
        DefinitionModel {
            slug: "issue_opened".to_string(),
            name: "Issue Opened".to_string(),
            description: "Opened an issue".to_string(),
            points: Some(5),
            icon: Some("issue-opened".to_string()),
        },
        DefinitionModel {
            slug: "issue_closed".to_string(),
            name: "Issue Closed".to_string(),
            description: "Closed an issue".to_string(),
            points: Some(8),
            icon: Some("issue-closed".to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(event_type: &str, at: DateTime<Utc>, payload: serde_json::Value) -> Event {
        serde_json::from_value(json!({
            "type": event_type,
            "actor": {"login": "alice"},
            "created_at": at.to_rfc3339(),
            "payload": payload,
        }))
        .unwrap()
    }

    fn pr_payload(action: &str, merged_at: Option<DateTime<Utc>>) -> serde_json::Value {
        json!({
            "action": action,
            "pull_request": {
                "number": 7,
                "title": "Add feature",
                "html_url": "https://github.com/example/repo/pull/7",
                "created_at": "2024-06-01T10:00:00Z",
                "merged_at": merged_at.map(|t| t.to_rfc3339()),
                "user": {"login": "alice"}
            }
        })
    }

    #[test]
    fn merged_pr_carries_turnaround() {
        let merged = Utc.with_ymd_and_hms(2024, 6, 2, 10, 0, 0).unwrap();
        let activities = normalize_event(
            &event("PullRequestEvent", merged, pr_payload("closed", Some(merged))),
            &[],
        );
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].activity_definition, "pr_merged");
        assert_eq!(
            activities[0].meta.as_ref().unwrap()["turnaround_secs"],
            json!(86400)
        );
        assert_eq!(activities[0].occured_at, merged.fixed_offset());
    }

    #[test]
    fn closed_without_merge_earns_nothing() {
        let at = Utc.with_ymd_and_hms(2024, 6, 2, 10, 0, 0).unwrap();
        let activities = normalize_event(
            &event("PullRequestEvent", at, pr_payload("closed", None)),
            &[],
        );
        assert!(activities.is_empty());
    }

    #[test]
    fn bot_pull_requests_are_filtered() {
        let at = Utc.with_ymd_and_hms(2024, 6, 2, 10, 0, 0).unwrap();
        let mut payload = pr_payload("opened", None);
        payload["pull_request"]["user"]["login"] = json!("renovate[bot]");
        let activities = normalize_event(&event("PullRequestEvent", at, payload), &[]);
        assert!(activities.is_empty());
    }

    #[test]
    fn issue_events_map_to_open_and_close() {
        let at = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        let payload = |action: &str| {
            json!({
                "action": action,
                "issue": {
                    "number": 12,
                    "title": "Broken build",
                    "html_url": "https://github.com/example/repo/issues/12",
                    "user": {"login": "bob"}
                }
            })
        };

        let opened = normalize_event(&event("IssuesEvent", at, payload("opened")), &[]);
        assert_eq!(opened[0].activity_definition, "issue_opened");

        let closed = normalize_event(&event("IssuesEvent", at, payload("closed")), &[]);
        assert_eq!(closed[0].activity_definition, "issue_closed");

        let labeled = normalize_event(&event("IssuesEvent", at, payload("labeled")), &[]);
        assert!(labeled.is_empty());
    }

    #[test]
    fn same_event_normalizes_to_same_slug() {
        let at = Utc.with_ymd_and_hms(2024, 6, 2, 10, 0, 0).unwrap();
        let a = normalize_event(&event("PullRequestEvent", at, pr_payload("opened", None)), &[]);
        let b = normalize_event(&event("PullRequestEvent", at, pr_payload("opened", None)), &[]);
        assert_eq!(a[0].slug, b[0].slug);
    }
}
