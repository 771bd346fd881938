//! Flat-file import: data directory back into the database.
//!
//! The inverse of export. Contributor markdown is authoritative for profile
//! fields and may be hand-edited between runs; malformed frontmatter is a
//! data-shape error and fails the run rather than silently dropping a
//! record. A missing `contributors/` directory just means a first run.

use std::path::{Path, PathBuf};

use sea_orm::DatabaseConnection;
use serde::Deserialize;
use tracing::{info, warn};

use super::{ACTIVITIES_FILE, CONTRIBUTORS_DIR, FRONTMATTER_DELIMITER};
use crate::error::PipelineError;
use crate::models::activity::Model as ActivityModel;
use crate::models::contributor::Model as ContributorModel;
use crate::repositories::{ActivityRepository, ContributorRepository};

#[derive(Debug, Deserialize)]
struct Frontmatter {
    username: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    social_profiles: Option<serde_json::Value>,
    #[serde(default)]
    joining_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    meta: Option<serde_json::Value>,
}

/// Import contributor profiles and the activity dump from `data_dir`.
pub async fn import_all(
    db: &DatabaseConnection,
    data_dir: &Path,
    roles: &[String],
) -> Result<(), PipelineError> {
    let contributors = read_contributors(data_dir, roles)?;
    let imported = contributors.len();
    ContributorRepository::new(db).upsert_many(contributors).await?;

    let activities = read_activities(data_dir)?;
    let activity_count = activities.len();
    ActivityRepository::new(db).upsert_many(activities).await?;

    info!(
        contributors = imported,
        activities = activity_count,
        "flat files imported"
    );
    Ok(())
}

fn read_contributors(
    data_dir: &Path,
    roles: &[String],
) -> Result<Vec<ContributorModel>, PipelineError> {
    let dir = data_dir.join(CONTRIBUTORS_DIR);
    if !dir.is_dir() {
        warn!(path = %dir.display(), "no contributors directory, skipping profile import");
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    paths.sort();

    let mut contributors = Vec::with_capacity(paths.len());
    for path in paths {
        let contents = std::fs::read_to_string(&path)?;
        contributors.push(parse_contributor(&path, &contents, roles)?);
    }
    Ok(contributors)
}

pub(crate) fn parse_contributor(
    path: &Path,
    contents: &str,
    roles: &[String],
) -> Result<ContributorModel, PipelineError> {
    let (frontmatter, body) = split_frontmatter(contents).ok_or_else(|| data_shape(
        path,
        "missing frontmatter block (expected '---' delimiters)",
    ))?;

    let parsed: Frontmatter = serde_yaml::from_str(frontmatter)
        .map_err(|err| data_shape(path, &format!("invalid frontmatter: {err}")))?;

    let Some(username) = parsed.username.filter(|u| !u.trim().is_empty()) else {
        return Err(data_shape(path, "frontmatter is missing 'username'"));
    };

    if let Some(role) = &parsed.role {
        if !roles.is_empty() && !roles.iter().any(|r| r == role) {
            return Err(data_shape(
                path,
                &format!("role '{role}' is not in the configured role set"),
            ));
        }
    }

    let bio = body.trim();
    Ok(ContributorModel {
        username,
        name: parsed.name,
        role: parsed.role,
        title: parsed.title,
        avatar_url: parsed.avatar_url,
        bio: (!bio.is_empty()).then(|| bio.to_string()),
        social_profiles: parsed.social_profiles,
        joining_date: parsed.joining_date,
        meta: parsed.meta,
    })
}

fn read_activities(data_dir: &Path) -> Result<Vec<ActivityModel>, PipelineError> {
    let path = data_dir.join(ACTIVITIES_FILE);
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_json::from_str(&contents)
        .map_err(|err| data_shape(&path, &format!("invalid activity dump: {err}")))
}

fn data_shape(path: &Path, message: &str) -> PipelineError {
    PipelineError::DataShape {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Split `--- ... ---` frontmatter from the markdown body.
fn split_frontmatter(contents: &str) -> Option<(&str, &str)> {
    let rest = contents.strip_prefix(FRONTMATTER_DELIMITER)?;
    let rest = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n"))?;
    let end = rest.find(&format!("\n{FRONTMATTER_DELIMITER}"))?;
    let frontmatter = &rest[..end + 1];
    let body = rest[end + 1 + FRONTMATTER_DELIMITER.len()..]
        .strip_prefix('\n')
        .unwrap_or("");
    Some((frontmatter, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatfile::export::render_contributor;
    use chrono::NaiveDate;
    use serde_json::json;

    fn roles() -> Vec<String> {
        vec!["core".to_string(), "contributor".to_string()]
    }

    #[test]
    fn round_trip_is_identity_on_contributor_rows() {
        let original = ContributorModel {
            username: "alice".to_string(),
            name: Some("Alice".to_string()),
            role: Some("core".to_string()),
            title: Some("Maintainer".to_string()),
            avatar_url: Some("https://example.org/a.png".to_string()),
            bio: Some("Builds importers.".to_string()),
            social_profiles: Some(json!({"github": "https://github.com/alice"})),
            joining_date: NaiveDate::from_ymd_opt(2023, 1, 15),
            meta: Some(json!({"slack_id": "U111"})),
        };

        let rendered = render_contributor(&original).unwrap();
        let parsed =
            parse_contributor(Path::new("alice.md"), &rendered, &roles()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn missing_username_is_a_data_shape_error() {
        let err = parse_contributor(
            Path::new("broken.md"),
            "---\nname: Nobody\n---\n",
            &roles(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::DataShape { .. }));
    }

    #[test]
    fn malformed_yaml_is_a_data_shape_error() {
        let err = parse_contributor(
            Path::new("broken.md"),
            "---\nusername: [unclosed\n---\n",
            &roles(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::DataShape { .. }));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = parse_contributor(
            Path::new("alice.md"),
            "---\nusername: alice\nrole: admin\n---\n",
            &roles(),
        )
        .unwrap_err();
        let PipelineError::DataShape { message, .. } = err else {
            panic!("expected data-shape error");
        };
        assert!(message.contains("admin"));
    }

    #[test]
    fn empty_role_set_accepts_any_role() {
        let parsed = parse_contributor(
            Path::new("alice.md"),
            "---\nusername: alice\nrole: admin\n---\n",
            &[],
        )
        .unwrap();
        assert_eq!(parsed.role.as_deref(), Some("admin"));
    }
}
