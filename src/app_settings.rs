use kinship_recommender::ScoreWeights;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub recommendation: RecommendationConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for a single request; recommendations past it are abandoned.
    pub request_timeout_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON snapshot backing the graph store. In-memory only when unset.
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RecommendationConfig {
    pub mutual_friend_weight: u64,
    pub shared_interest_weight: u64,
    pub max_results: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Config {
    /// Values that parse but cannot be served.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.server.request_timeout_ms == 0 {
            problems.push("server.request_timeout_ms must be positive".to_string());
        }
        if self.search.max_limit == 0 {
            problems.push("search.max_limit must be positive".to_string());
        }
        if self.search.default_limit > self.search.max_limit {
            problems.push(format!(
                "search.default_limit ({}) exceeds search.max_limit ({})",
                self.search.default_limit, self.search.max_limit
            ));
        }
        if self.recommendation.max_results == Some(0) {
            problems.push("recommendation.max_results must be positive when set".to_string());
        }
        problems
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            request_timeout_ms: 5_000,
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        let weights = ScoreWeights::default();
        Self {
            mutual_friend_weight: weights.mutual_friend,
            shared_interest_weight: weights.shared_interest,
            max_results: None,
        }
    }
}

impl RecommendationConfig {
    pub fn weights(&self) -> ScoreWeights {
        ScoreWeights {
            mutual_friend: self.mutual_friend_weight,
            shared_interest: self.shared_interest_weight,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl SearchConfig {
    pub fn clamp(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .min(self.max_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let raw = "recommendation:\n  shared_interest_weight: 5\nserver:\n  port: 8080\n";
        let config: Config = serde_yaml::from_str(raw).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.recommendation.mutual_friend_weight, 3);
        assert_eq!(config.recommendation.weights().shared_interest, 5);
        assert!(config.storage.data_file.is_none());
    }

    #[test]
    fn defaults_have_no_problems() {
        assert!(Config::default().problems().is_empty());
    }

    #[test]
    fn inconsistent_limits_are_reported() {
        let mut config = Config::default();
        config.search.default_limit = 500;
        config.server.request_timeout_ms = 0;

        let problems = config.problems();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("request_timeout_ms"));
    }

    #[test]
    fn search_limit_is_clamped() {
        let search = SearchConfig::default();
        assert_eq!(search.clamp(None), 20);
        assert_eq!(search.clamp(Some(5)), 5);
        assert_eq!(search.clamp(Some(10_000)), 100);
    }
}
