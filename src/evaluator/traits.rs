//! Evaluator trait for prior and value estimation.
//!
//! The search asks an evaluator for two things:
//! - `prior`: initial action probabilities when a node is created
//! - `evaluate`: a per-player value estimate for a freshly reached leaf

use thiserror::Error;

use crate::core::SearchRng;
use crate::error::ISMCTSError;
use crate::game::GameState;

/// Failure reported by an evaluator.
///
/// A failed `prior` falls back to a uniform prior. A failed `evaluate`
/// aborts the current simulation only.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("evaluator failed: {0}")]
pub struct EvalError(pub String);

impl EvalError {
    /// Create from a message.
    pub fn msg(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<EvalError> for ISMCTSError {
    fn from(e: EvalError) -> Self {
        ISMCTSError::Simulation(e.to_string())
    }
}

/// Prior-probability model plus value estimator.
pub trait Evaluator<S: GameState> {
    /// Prior probabilities covering the legal actions of `state`.
    fn prior(&self, state: &S) -> Result<Vec<(S::Action, f64)>, EvalError>;

    /// Per-player value estimate for a non-terminal `state`.
    fn evaluate(&self, state: &S, rng: &mut SearchRng) -> Result<Vec<f64>, EvalError>;
}

/// Uniform prior over the given actions.
pub fn uniform_prior<A: Clone>(actions: &[A]) -> Vec<(A, f64)> {
    if actions.is_empty() {
        return vec![];
    }
    let prob = 1.0 / actions.len() as f64;
    actions.iter().map(|a| (a.clone(), prob)).collect()
}

/// Uniform prior and zero value (baseline for testing).
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformEvaluator;

impl<S: GameState> Evaluator<S> for UniformEvaluator {
    fn prior(&self, state: &S) -> Result<Vec<(S::Action, f64)>, EvalError> {
        Ok(uniform_prior(&state.legal_actions()))
    }

    fn evaluate(&self, state: &S, _rng: &mut SearchRng) -> Result<Vec<f64>, EvalError> {
        Ok(vec![0.0; state.num_players()])
    }
}
