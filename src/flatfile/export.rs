//! Flat-file export: database state to the data directory.

use std::path::Path;

use sea_orm::DatabaseConnection;
use serde_json::json;
use tracing::info;

use super::{
    ACTIVITIES_FILE, AGGREGATES_FILE, BADGES_FILE, CONTRIBUTORS_DIR, FRONTMATTER_DELIMITER,
};
use crate::error::PipelineError;
use crate::models::contributor::Model as ContributorModel;
use crate::repositories::{
    ActivityRepository, AggregateRepository, BadgeRepository, ContributorRepository,
};

/// Write contributor markdown files and the JSON dumps into `data_dir`.
pub async fn export_all(db: &DatabaseConnection, data_dir: &Path) -> Result<(), PipelineError> {
    let contributors = ContributorRepository::new(db).get_all().await?;
    let contributors_dir = data_dir.join(CONTRIBUTORS_DIR);
    std::fs::create_dir_all(&contributors_dir)?;
    for contributor in &contributors {
        let path = contributors_dir.join(format!("{}.md", contributor.username));
        std::fs::write(&path, render_contributor(contributor)?)?;
    }

    let activities = ActivityRepository::new(db).get_all().await?;
    write_json(&data_dir.join(ACTIVITIES_FILE), &activities)?;

    let aggregates = AggregateRepository::new(db);
    let dump = json!({
        "global": aggregates.get_all_global().await?,
        "definitions": aggregates.get_all_definitions().await?,
        "contributors": aggregates.get_all_contributor().await?,
    });
    write_json(&data_dir.join(AGGREGATES_FILE), &dump)?;

    let badges = BadgeRepository::new(db);
    let dump = json!({
        "definitions": badges.get_all_definitions().await?,
        "earned": badges.get_all().await?,
    });
    write_json(&data_dir.join(BADGES_FILE), &dump)?;

    info!(
        contributors = contributors.len(),
        activities = activities.len(),
        "flat files exported"
    );
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    let mut body = serde_json::to_string_pretty(value)
        .map_err(|err| PipelineError::Other(err.into()))?;
    body.push('\n');
    std::fs::write(path, body)?;
    Ok(())
}

/// Render one contributor as YAML frontmatter plus the bio as body. NULL
/// fields are omitted; `username` always leads for stable diffs.
pub(crate) fn render_contributor(contributor: &ContributorModel) -> Result<String, PipelineError> {
    use serde_yaml::{Mapping, Value};

    let mut mapping = Mapping::new();
    let mut put = |key: &str, value: Option<Value>| {
        if let Some(value) = value {
            mapping.insert(Value::String(key.to_string()), value);
        }
    };

    put(
        "username",
        Some(Value::String(contributor.username.clone())),
    );
    put("name", contributor.name.clone().map(Value::String));
    put("role", contributor.role.clone().map(Value::String));
    put("title", contributor.title.clone().map(Value::String));
    put(
        "avatar_url",
        contributor.avatar_url.clone().map(Value::String),
    );
    put(
        "social_profiles",
        contributor
            .social_profiles
            .as_ref()
            .map(|v| serde_yaml::to_value(v))
            .transpose()
            .map_err(|err| PipelineError::Other(err.into()))?,
    );
    put(
        "joining_date",
        contributor
            .joining_date
            .map(|d| Value::String(d.to_string())),
    );
    put(
        "meta",
        contributor
            .meta
            .as_ref()
            .map(|v| serde_yaml::to_value(v))
            .transpose()
            .map_err(|err| PipelineError::Other(err.into()))?,
    );

    let frontmatter = serde_yaml::to_string(&Value::Mapping(mapping))
        .map_err(|err| PipelineError::Other(err.into()))?;
    let bio = contributor.bio.as_deref().unwrap_or_default();
    Ok(format!(
        "{FRONTMATTER_DELIMITER}\n{frontmatter}{FRONTMATTER_DELIMITER}\n{bio}\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn frontmatter_leads_with_username_and_skips_nulls() {
        let contributor = ContributorModel {
            username: "alice".to_string(),
            name: Some("Alice".to_string()),
            role: Some("core".to_string()),
            title: None,
            avatar_url: None,
            bio: Some("Builds importers.".to_string()),
            social_profiles: Some(json!({"github": "https://github.com/alice"})),
            joining_date: NaiveDate::from_ymd_opt(2023, 1, 15),
            meta: None,
        };

        let rendered = render_contributor(&contributor).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "---");
        assert_eq!(lines[1], "username: alice");
        assert!(rendered.contains("joining_date: 2023-01-15"));
        assert!(!rendered.contains("title:"));
        assert!(rendered.ends_with("---\nBuilds importers.\n"));
    }

    #[test]
    fn stub_contributor_renders_empty_body() {
        let rendered = render_contributor(&ContributorModel::stub("bob")).unwrap();
        assert!(rendered.ends_with("---\n\n"));
        assert!(rendered.contains("username: bob"));
    }
}
