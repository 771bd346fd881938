//! Shared GitHub API plumbing for the GitHub-backed collectors.
//!
//! Thin REST client plus the response shapes both collectors deserialize.
//! The base URL is overridable through config (`api_base`) so tests can point
//! the collectors at a local mock server.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use super::CollectorError;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const PER_PAGE: u32 = 100;

/// Shared config subset both GitHub collectors expect under their `config`
/// section in `config.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    /// GitHub organization to scan
    pub org: String,
    /// API token; unauthenticated requests work but rate-limit quickly
    #[serde(default)]
    pub token: Option<String>,
    /// API base override, used by tests
    #[serde(default)]
    pub api_base: Option<String>,
    /// Logins to discard in addition to `[bot]` accounts
    #[serde(default)]
    pub blocklist: Vec<String>,
}

impl GithubConfig {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, CollectorError> {
        let config: GithubConfig = serde_json::from_value(value.clone())
            .map_err(|err| CollectorError::Config(format!("invalid github config: {err}")))?;
        if config.org.trim().is_empty() {
            return Err(CollectorError::Config("org is required".to_string()));
        }
        Ok(config)
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }
}

/// Minimal GitHub REST client.
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self, CollectorError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base().trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// GET a JSON endpoint; non-2xx responses become structured errors.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CollectorError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|err| CollectorError::Config(format!("invalid API URL: {err}")))?;
        for (key, value) in query {
            url.query_pairs_mut().append_pair(key, value);
        }

        let mut request = self
            .http
            .get(url.clone())
            .header("User-Agent", "leaderboard-pipeline/0.1")
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CollectorError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| CollectorError::MalformedResponse(err.to_string()))
    }

    /// All non-archived repositories of an organization, following page
    /// numbers until a short page.
    pub async fn list_org_repos(&self, org: &str) -> Result<Vec<Repo>, CollectorError> {
        let mut repos = Vec::new();
        let mut page = 1u32;
        loop {
            let batch: Vec<Repo> = self
                .get_json(
                    &format!("/orgs/{org}/repos"),
                    &[
                        ("per_page", PER_PAGE.to_string()),
                        ("page", page.to_string()),
                        ("sort", "pushed".to_string()),
                    ],
                )
                .await?;
            let done = (batch.len() as u32) < PER_PAGE;
            repos.extend(batch.into_iter().filter(|r| !r.archived));
            if done {
                break;
            }
            page += 1;
        }
        Ok(repos)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Actor {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// One entry from a repository events feed. Payload stays raw JSON because
/// its shape varies per event type.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    pub actor: Actor,
    pub created_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    pub user: Actor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub user: Actor,
    /// Present when the "issue" is actually a pull request
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    pub html_url: String,
    pub user: Actor,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Discussion {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub user: Actor,
    #[serde(default)]
    pub answer_chosen_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub answer_chosen_by: Option<Actor>,
}
