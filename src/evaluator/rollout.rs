//! Random rollout evaluator.
//!
//! Uniform prior over legal actions; values are the mean returns of
//! `n_rollouts` uniformly random playouts, with chance outcomes drawn by
//! their probabilities.

use crate::core::SearchRng;
use crate::game::{GameState, Turn};

use super::traits::{uniform_prior, EvalError, Evaluator};

/// Baseline evaluator: uniform prior + random playouts.
#[derive(Clone, Debug)]
pub struct RandomRolloutEvaluator {
    /// Playouts averaged per evaluation.
    pub n_rollouts: usize,

    /// Ply cap per playout (`None` = play to the end).
    /// A playout cut off by the cap scores zero for every player.
    pub max_plies: Option<u32>,
}

impl Default for RandomRolloutEvaluator {
    fn default() -> Self {
        Self {
            n_rollouts: 1,
            max_plies: None,
        }
    }
}

impl RandomRolloutEvaluator {
    /// Create an evaluator averaging `n_rollouts` playouts.
    pub fn new(n_rollouts: usize) -> Self {
        Self {
            n_rollouts: n_rollouts.max(1),
            ..Self::default()
        }
    }

    /// Cap the length of each playout.
    pub fn with_max_plies(mut self, plies: u32) -> Self {
        self.max_plies = Some(plies);
        self
    }

    fn rollout<S: GameState>(
        &self,
        state: &S,
        rng: &mut SearchRng,
    ) -> Result<Vec<f64>, EvalError> {
        let mut state = state.clone();
        let mut plies = 0;

        loop {
            if state.is_terminal() {
                return Ok(state.returns());
            }
            if self.max_plies.is_some_and(|cap| plies >= cap) {
                return Ok(vec![0.0; state.num_players()]);
            }

            let action = match state.current_player() {
                Turn::Terminal => return Ok(state.returns()),
                Turn::Chance => {
                    let outcomes = state.chance_outcomes();
                    let weights: Vec<f64> = outcomes.iter().map(|(_, p)| *p).collect();
                    let idx = rng
                        .choose_weighted(&weights)
                        .ok_or_else(|| EvalError::msg("chance node without outcome mass"))?;
                    outcomes[idx].0.clone()
                }
                Turn::Player(player) => {
                    let actions = state.legal_actions();
                    rng.choose(&actions)
                        .cloned()
                        .ok_or_else(|| EvalError::msg(format!("{player} has no legal actions")))?
                }
            };

            state.apply_action(&action);
            plies += 1;
        }
    }
}

impl<S: GameState> Evaluator<S> for RandomRolloutEvaluator {
    fn prior(&self, state: &S) -> Result<Vec<(S::Action, f64)>, EvalError> {
        Ok(uniform_prior(&state.legal_actions()))
    }

    fn evaluate(&self, state: &S, rng: &mut SearchRng) -> Result<Vec<f64>, EvalError> {
        let mut rollout_rng = rng.fork();
        let mut totals = vec![0.0; state.num_players()];

        for _ in 0..self.n_rollouts {
            let returns = self.rollout(state, &mut rollout_rng)?;
            for (total, value) in totals.iter_mut().zip(returns) {
                *total += value;
            }
        }

        let n = self.n_rollouts.max(1) as f64;
        Ok(totals.into_iter().map(|t| t / n).collect())
    }
}
