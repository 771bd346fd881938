//! Slack end-of-day collector.
//!
//! Reads an EOD channel through `conversations.history` with cursor
//! pagination and turns each member message into an `eod_update` activity.
//! Slack messages carry no natural external slug, so the slug is hashed from
//! the channel and message timestamp.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use super::{
    Collector, CollectorContext, CollectorError, hashed_slug, is_filtered_actor, persist_batch,
};
use crate::models::activity::Model as ActivityModel;
use crate::models::activity_definition::Model as DefinitionModel;
use crate::repositories::ActivityDefinitionRepository;

const SOURCE: &str = "slack-eod";
const DEFAULT_API_BASE: &str = "https://slack.com/api";
const PAGE_LIMIT: u32 = 200;

#[derive(Debug, Clone, Deserialize)]
pub struct SlackConfig {
    /// Channel ID to read, e.g. `C0123456789`
    pub channel: String,
    pub token: String,
    /// Slack user ID to leaderboard username; unmapped authors are skipped
    #[serde(default)]
    pub user_map: BTreeMap<String, String>,
    /// API base override, used by tests
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub blocklist: Vec<String>,
}

impl SlackConfig {
    fn from_value(value: &serde_json::Value) -> Result<Self, CollectorError> {
        let config: SlackConfig = serde_json::from_value(value.clone())
            .map_err(|err| CollectorError::Config(format!("invalid slack config: {err}")))?;
        if config.channel.trim().is_empty() {
            return Err(CollectorError::Config("channel is required".to_string()));
        }
        if config.token.trim().is_empty() {
            return Err(CollectorError::Config("token is required".to_string()));
        }
        Ok(config)
    }

    fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
    }
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Vec<SlackMessage>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Debug, Deserialize)]
struct SlackMessage {
    #[serde(rename = "type")]
    message_type: String,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    bot_id: Option<String>,
    #[serde(default)]
    text: String,
    ts: String,
}

pub struct SlackEodCollector;

impl SlackEodCollector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SlackEodCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collector for SlackEodCollector {
    fn name(&self) -> &str {
        SOURCE
    }

    fn version(&self) -> &str {
        "0.1.0"
    }

    async fn setup(&self, ctx: &CollectorContext<'_>) -> Result<(), CollectorError> {
        ActivityDefinitionRepository::new(ctx.db)
            .seed(vec![DefinitionModel {
                slug: "eod_update".to_string(),
                name: "EOD Update".to_string(),
                description: "Posted an end-of-day update".to_string(),
                points: Some(2),
                icon: Some("megaphone".to_string()),
            }])
            .await?;
        Ok(())
    }

    async fn scrape(&self, ctx: &CollectorContext<'_>) -> Result<(), CollectorError> {
        let config = SlackConfig::from_value(ctx.config)?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let oldest = format!("{}.000000", ctx.since.timestamp());
        let mut activities = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let url = format!("{}/conversations.history", config.api_base());
            let mut query = vec![
                ("channel", config.channel.clone()),
                ("oldest", oldest.clone()),
                ("limit", PAGE_LIMIT.to_string()),
            ];
            if let Some(cursor) = &cursor {
                query.push(("cursor", cursor.clone()));
            }

            let response = http
                .get(&url)
                .query(&query)
                .header("Authorization", format!("Bearer {}", config.token))
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(CollectorError::Http {
                    status: status.as_u16(),
                    url,
                });
            }
            let body: HistoryResponse = response
                .json()
                .await
                .map_err(|err| CollectorError::MalformedResponse(err.to_string()))?;
            if !body.ok {
                return Err(CollectorError::MalformedResponse(format!(
                    "slack API error: {}",
                    body.error.unwrap_or_else(|| "unknown".to_string())
                )));
            }

            for message in &body.messages {
                if let Some(activity) = normalize_message(message, &config) {
                    activities.push(activity);
                }
            }

            cursor = body
                .response_metadata
                .and_then(|m| (!m.next_cursor.is_empty()).then_some(m.next_cursor));
            if cursor.is_none() {
                break;
            }
        }

        let count = persist_batch(ctx.db, activities).await?;
        info!(channel = %config.channel, activities = count, "slack EOD updates persisted");
        Ok(())
    }
}

fn normalize_message(message: &SlackMessage, config: &SlackConfig) -> Option<ActivityModel> {
    if message.message_type != "message"
        || message.subtype.is_some()
        || message.bot_id.is_some()
        || message.text.trim().is_empty()
    {
        return None;
    }
    let slack_user = message.user.as_deref()?;
    let Some(username) = config.user_map.get(slack_user) else {
        debug!(user = %slack_user, "no username mapping, skipping message");
        return None;
    };
    if is_filtered_actor(username, &config.blocklist) {
        return None;
    }

    let occured_at = parse_slack_ts(&message.ts)?;
    Some(ActivityModel {
        slug: hashed_slug(SOURCE, username, &[&config.channel, &message.ts]),
        contributor: username.clone(),
        activity_definition: "eod_update".to_string(),
        title: None,
        occured_at: occured_at.fixed_offset(),
        link: None,
        text: Some(message.text.clone()),
        points: None,
        meta: None,
    })
}

/// Slack timestamps are epoch seconds with a microsecond suffix,
/// e.g. `1718000000.000100`.
fn parse_slack_ts(ts: &str) -> Option<DateTime<Utc>> {
    let (secs, micros) = ts.split_once('.')?;
    let secs: i64 = secs.parse().ok()?;
    let micros: u32 = micros.parse().ok()?;
    Utc.timestamp_opt(secs, micros * 1000).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> SlackConfig {
        SlackConfig::from_value(&json!({
            "channel": "C0123",
            "token": "xoxb-test",
            "user_map": {"U111": "alice"}
        }))
        .unwrap()
    }

    fn message(user: &str, subtype: Option<&str>) -> SlackMessage {
        SlackMessage {
            message_type: "message".to_string(),
            subtype: subtype.map(str::to_string),
            user: Some(user.to_string()),
            bot_id: None,
            text: "Shipped the importer today".to_string(),
            ts: "1718000000.000100".to_string(),
        }
    }

    #[test]
    fn member_message_becomes_activity() {
        let activity = normalize_message(&message("U111", None), &config()).unwrap();
        assert_eq!(activity.contributor, "alice");
        assert_eq!(activity.activity_definition, "eod_update");
        assert_eq!(activity.text.as_deref(), Some("Shipped the importer today"));
        assert_eq!(
            activity.occured_at,
            Utc.timestamp_opt(1_718_000_000, 100_000).unwrap().fixed_offset()
        );
    }

    #[test]
    fn same_message_twice_yields_same_slug() {
        let a = normalize_message(&message("U111", None), &config()).unwrap();
        let b = normalize_message(&message("U111", None), &config()).unwrap();
        assert_eq!(a.slug, b.slug);
    }

    #[test]
    fn joins_bots_and_unmapped_users_are_skipped() {
        assert!(normalize_message(&message("U111", Some("channel_join")), &config()).is_none());
        assert!(normalize_message(&message("U999", None), &config()).is_none());

        let mut bot = message("U111", None);
        bot.bot_id = Some("B42".to_string());
        assert!(normalize_message(&bot, &config()).is_none());
    }

    #[test]
    fn config_requires_channel_and_token() {
        let err = SlackConfig::from_value(&json!({"channel": "C1", "token": ""})).unwrap_err();
        assert!(matches!(err, CollectorError::Config(_)));
    }
}
