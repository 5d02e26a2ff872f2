//! MCTS configuration parameters.

use crate::arena::DEFAULT_CHUNK_SIZE;
use crate::error::SearchError;
use std::time::Duration;

/// Iterations run between two checks of the stopping rule.
pub const ITERATION_BATCH: u64 = 100;

/// When a search stops.
///
/// The rule is only consulted between batches of [`ITERATION_BATCH`]
/// iterations, and one batch always runs, so every search performs a
/// positive multiple of the batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBudget {
    /// Wall-clock thinking time per decision.
    Time(Duration),
    /// Fixed iteration count, rounded up to whole batches.
    Iterations(u64),
}

impl SearchBudget {
    /// Whether a search that has run `iterations` in `elapsed` should stop.
    pub fn is_exhausted(&self, elapsed: Duration, iterations: u64) -> bool {
        match *self {
            SearchBudget::Time(limit) => elapsed >= limit,
            SearchBudget::Iterations(limit) => iterations >= limit,
        }
    }
}

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Exploration weight `c` of the UCB1 formula.
    pub exploration_bias: f64,

    /// Thinking budget per decision.
    pub budget: SearchBudget,

    /// Seed for the engine's generator. `None` seeds from system entropy.
    pub seed: Option<u64>,

    /// Ceiling on nodes per decision. `None` lets the tree grow freely.
    pub max_nodes: Option<usize>,

    /// Nodes per arena chunk.
    pub chunk_size: usize,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration_bias: 1.4,
            budget: SearchBudget::Time(Duration::from_secs(1)),
            seed: None,
            max_nodes: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl MctsConfig {
    /// Create a fast, reproducible config for testing.
    pub fn for_testing() -> Self {
        Self {
            budget: SearchBudget::Iterations(ITERATION_BATCH),
            seed: Some(42),
            ..Self::default()
        }
    }

    pub fn with_exploration_bias(mut self, bias: f64) -> Self {
        self.exploration_bias = bias;
        self
    }

    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_iterations(self, iterations: u64) -> Self {
        self.with_budget(SearchBudget::Iterations(iterations))
    }

    pub fn with_thinking_time(self, time: Duration) -> Self {
        self.with_budget(SearchBudget::Time(time))
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Reject configurations the search cannot run with.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !self.exploration_bias.is_finite() || self.exploration_bias <= 0.0 {
            return Err(SearchError::InvalidConfig(format!(
                "exploration bias must be a positive number, got {}",
                self.exploration_bias
            )));
        }
        if self.chunk_size == 0 {
            return Err(SearchError::InvalidConfig("chunk size must be positive".into()));
        }
        if self.max_nodes == Some(0) {
            return Err(SearchError::InvalidConfig("node ceiling must allow the root".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert!((config.exploration_bias - 1.4).abs() < 1e-12);
        assert_eq!(config.chunk_size, 10_000);
        assert!(config.max_nodes.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = MctsConfig::default()
            .with_iterations(500)
            .with_exploration_bias(0.4)
            .with_seed(7);

        assert_eq!(config.budget, SearchBudget::Iterations(500));
        assert!((config.exploration_bias - 0.4).abs() < 1e-12);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_validate_rejects_bad_bias() {
        for bias in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = MctsConfig::default().with_exploration_bias(bias);
            assert_matches!(config.validate(), Err(SearchError::InvalidConfig(_)));
        }
    }

    #[test]
    fn test_budget_exhaustion() {
        let time = SearchBudget::Time(Duration::from_millis(10));
        assert!(!time.is_exhausted(Duration::from_millis(9), 1_000_000));
        assert!(time.is_exhausted(Duration::from_millis(10), 0));

        let iterations = SearchBudget::Iterations(250);
        assert!(!iterations.is_exhausted(Duration::from_secs(100), 200));
        assert!(iterations.is_exhausted(Duration::ZERO, 300));
    }
}
