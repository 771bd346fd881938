//! Collector registry mapping `source` names from `config.yaml` to
//! collector implementations. Built explicitly at startup; there is no
//! global state and no dynamic loading.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::Collector;
use super::github_discussions::GithubDiscussionsCollector;
use super::github_events::GithubEventsCollector;
use super::slack_eod::SlackEodCollector;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown collector source '{0}'")]
    UnknownCollector(String),
}

/// Registry of available collectors, keyed by collector name.
pub struct CollectorRegistry {
    collectors: HashMap<String, Arc<dyn Collector>>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self {
            collectors: HashMap::new(),
        }
    }

    /// Registry with all built-in collectors registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GithubEventsCollector::new()));
        registry.register(Arc::new(GithubDiscussionsCollector::new()));
        registry.register(Arc::new(SlackEodCollector::new()));
        registry
    }

    pub fn register(&mut self, collector: Arc<dyn Collector>) {
        self.collectors
            .insert(collector.name().to_string(), collector);
    }

    pub fn get(&self, source: &str) -> Result<Arc<dyn Collector>, RegistryError> {
        self.collectors
            .get(source)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownCollector(source.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.collectors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for CollectorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_register_builtin_collectors() {
        let registry = CollectorRegistry::with_defaults();
        assert_eq!(
            registry.names(),
            vec!["github-discussions", "github-events", "slack-eod"]
        );
        assert!(registry.get("github-events").is_ok());
    }

    #[test]
    fn unknown_source_is_an_error() {
        let registry = CollectorRegistry::with_defaults();
        assert!(matches!(
            registry.get("gitlab-events"),
            Err(RegistryError::UnknownCollector(_))
        ));
    }
}
