//! # Leaderboard
//!
//! Community leaderboard pipeline: collectors scrape contribution activity
//! from external sources (GitHub, Slack) into an embedded SQLite database,
//! an aggregation engine derives ranked leaderboards and materialized
//! aggregates, and a flat-file boundary round-trips the data through a
//! human-editable directory of markdown and JSON.

pub mod aggregator;
pub mod badges;
pub mod cli;
pub mod collectors;
pub mod config;
pub mod db;
pub mod error;
pub mod flatfile;
pub mod lock;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod runner;

pub use error::PipelineError;
