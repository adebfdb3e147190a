//! Solver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the first complete assignment is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstSolutionStrategy {
    /// Grow each vehicle's path along its cheapest feasible arc, then place
    /// leftovers by cheapest insertion.
    #[default]
    PathCheapestArc,
    /// Repeatedly insert the globally cheapest shipment/position pair.
    CheapestInsertion,
}

/// How the first assignment is improved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metaheuristic {
    /// Local search on a penalty-augmented cost, escaping local optima.
    #[default]
    GuidedLocalSearch,
    /// Plain best-improvement descent; stops at the first local optimum.
    GreedyDescent,
}

/// Configuration for the dispatch solver.
///
/// Partial JSON configs fill the remaining fields from [`Default`].
///
/// # Examples
///
/// ```
/// use u_dispatch::config::SolverConfig;
///
/// let config: SolverConfig = serde_json::from_str(r#"{"max_time_seconds": 5}"#).unwrap();
/// assert_eq!(config.max_time_seconds, 5);
/// assert_eq!(config.patience, SolverConfig::default().patience);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum solving time in seconds
    pub max_time_seconds: u32,
    pub first_solution: FirstSolutionStrategy,
    pub metaheuristic: Metaheuristic,
    /// Iterations without a new best before stopping
    pub patience: usize,
    /// Hard cap on improvement iterations
    pub max_iterations: Option<usize>,
    /// Penalty weight as a fraction of the mean arc duration
    pub gls_lambda_coefficient: f64,
    /// Nearest shipments considered for pair exchange
    pub neighborhood_size: usize,
    /// Assigned shipments to move, and unassigned ones to insert, sampled
    /// per iteration once either set is larger
    pub sample_size: usize,
    /// Seed for neighborhood sampling
    pub seed: u64,
    /// Evaluate neighborhoods on the rayon thread pool
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_time_seconds: 30,
            first_solution: FirstSolutionStrategy::PathCheapestArc,
            metaheuristic: Metaheuristic::GuidedLocalSearch,
            patience: 200,
            max_iterations: None,
            gls_lambda_coefficient: 0.1,
            neighborhood_size: 16,
            sample_size: 256,
            seed: 0,
            parallel: true,
        }
    }
}

impl SolverConfig {
    /// Fast configuration for interactive use
    /// - Quick response time (~5 seconds)
    /// - Good enough for most cases
    pub fn fast() -> Self {
        Self {
            max_time_seconds: 5,
            patience: 50,
            ..Self::default()
        }
    }

    /// Quality configuration for background processing
    /// - Longer solve time (~60 seconds)
    /// - Wider neighborhoods and more patience
    pub fn quality() -> Self {
        Self {
            max_time_seconds: 60,
            patience: 1000,
            neighborhood_size: 32,
            sample_size: 1024,
            ..Self::default()
        }
    }

    /// Instant configuration for very fast response
    /// - Construction plus a single descent
    pub fn instant() -> Self {
        Self {
            max_time_seconds: 2,
            metaheuristic: Metaheuristic::GreedyDescent,
            patience: 1,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Wall-clock budget for the whole solve.
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(u64::from(self.max_time_seconds))
    }
}
