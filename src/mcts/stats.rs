//! IS-MCTS search statistics for diagnostics and tuning.

use serde::{Deserialize, Serialize};

/// Statistics collected during one `run_search` call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Simulations attempted.
    pub iterations: u32,

    /// Simulations skipped after a recoverable error.
    pub failed_simulations: u32,

    /// Information-set nodes created.
    pub nodes_created: u32,

    /// Actions added to a node by expansion.
    pub expansions: u32,

    /// Evaluator value calls (first visits and expansions).
    pub evaluations: u32,

    /// Chance outcomes sampled.
    pub chance_samples: u32,

    /// Deepest decision level reached in one simulation.
    pub max_depth: u16,

    /// Total time spent searching (microseconds).
    pub time_us: u64,
}

impl SearchStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all statistics to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Simulations that ran to completion.
    #[must_use]
    pub fn completed_simulations(&self) -> u32 {
        self.iterations.saturating_sub(self.failed_simulations)
    }

    /// Calculate iterations per second.
    #[must_use]
    pub fn iterations_per_second(&self) -> f64 {
        per_second(self.iterations, self.time_us)
    }

    /// Calculate evaluator calls per second.
    #[must_use]
    pub fn evaluations_per_second(&self) -> f64 {
        per_second(self.evaluations, self.time_us)
    }

    /// Share of iterations that failed.
    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.failed_simulations as f64 / self.iterations as f64
        }
    }
}

fn per_second(count: u32, time_us: u64) -> f64 {
    if time_us == 0 {
        0.0
    } else {
        count as f64 / (time_us as f64 / 1_000_000.0)
    }
}
