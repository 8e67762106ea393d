//! Leaf evaluators for IS-MCTS.
//!
//! ## Overview
//!
//! - **Trait**: `Evaluator` supplies priors and leaf values
//! - **Baselines**: `UniformEvaluator` (uniform prior, zero value) and
//!   `RandomRolloutEvaluator` (uniform prior, random playouts)
//!
//! Learned models plug in by implementing `Evaluator` for their game.

pub mod rollout;
pub mod traits;

pub use rollout::RandomRolloutEvaluator;
pub use traits::{uniform_prior, EvalError, Evaluator, UniformEvaluator};
