//! # Pipeline runner
//!
//! Drives one end-to-end run as a strictly sequential stage machine:
//!
//! ```text
//! load-config -> init-schema -> [import] -> [scrape] -> aggregate -> [export]
//! ```
//!
//! Bracketed stages are skippable from the CLI. Aggregation always runs so
//! derived tables reflect whatever the earlier stages left in the database.
//! The data-directory lock is held for the whole run.

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::aggregator::write_standard_aggregates;
use crate::badges::evaluate_badges;
use crate::collectors::{CollectorContext, CollectorRegistry};
use crate::config::load_config;
use crate::db::init_db;
use crate::error::PipelineError;
use crate::flatfile::{export_all, import_all};
use crate::lock::RunLock;
use crate::repositories::ActivityRepository;

/// When the database holds no activities yet, scrape this far back.
const DEFAULT_LOOKBACK_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub data_dir: PathBuf,
    pub skip_import: bool,
    pub skip_scrape: bool,
    pub skip_export: bool,
}

/// Execute one pipeline run. Any returned error is fatal; partial progress
/// (already-committed collector batches) stays committed.
pub async fn run(options: &RunOptions, registry: &CollectorRegistry) -> Result<(), PipelineError> {
    let _lock = RunLock::acquire(&options.data_dir)?;

    let config = load_config(&options.data_dir)?;
    info!(org = %config.org.name, scrapers = config.scrapers.len(), "configuration loaded");

    // Unknown sources fail before any work happens, not mid-run
    for scraper in &config.scrapers {
        registry
            .get(&scraper.source)
            .map_err(|err| PipelineError::Config(crate::config::ConfigError::Validation {
                issues: vec![format!("leaderboard.scrapers.{}: {err}", scraper.name)],
            }))?;
    }

    let db = init_db(&options.data_dir).await?;

    if options.skip_import {
        info!("import stage skipped");
    } else {
        import_all(&db, &options.data_dir, &config.roles).await?;
    }

    if options.skip_scrape {
        info!("scrape stage skipped");
    } else {
        let since = incremental_since(&db).await?;
        info!(since = %since, "scraping activity since");
        for scraper in &config.scrapers {
            let collector = registry
                .get(&scraper.source)
                .map_err(|err| PipelineError::Config(crate::config::ConfigError::Validation {
                    issues: vec![err.to_string()],
                }))?;
            let ctx = CollectorContext {
                db: &db,
                config: &scraper.config,
                org: &config.org,
                since,
            };
            info!(scraper = %scraper.name, source = %scraper.source, "running collector");
            collector
                .setup(&ctx)
                .await
                .map_err(|source| PipelineError::Collector {
                    name: scraper.name.clone(),
                    source,
                })?;
            collector
                .scrape(&ctx)
                .await
                .map_err(|source| PipelineError::Collector {
                    name: scraper.name.clone(),
                    source,
                })?;
        }
    }

    write_standard_aggregates(&db).await?;
    evaluate_badges(&db).await?;

    if options.skip_export {
        info!("export stage skipped");
    } else {
        export_all(&db, &options.data_dir).await?;
    }

    info!("run complete");
    Ok(())
}

/// Lower bound for incremental scraping: the newest stored activity, or a
/// fixed lookback when the database is empty.
async fn incremental_since(
    db: &sea_orm::DatabaseConnection,
) -> Result<chrono::DateTime<Utc>, PipelineError> {
    let newest = ActivityRepository::new(db)
        .get_in_window(None, None)
        .await?
        .into_iter()
        .next();
    Ok(match newest {
        Some(activity) => activity.occured_at.with_timezone(&Utc),
        None => {
            let since = Utc::now() - Duration::days(DEFAULT_LOOKBACK_DAYS);
            warn!(days = DEFAULT_LOOKBACK_DAYS, "empty database, using default lookback");
            since
        }
    })
}

/// Seed a minimal data directory layout if it does not exist yet.
pub fn ensure_data_dir(data_dir: &Path) -> Result<(), PipelineError> {
    std::fs::create_dir_all(data_dir)?;
    Ok(())
}
