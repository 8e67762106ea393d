//! Root determinization.
//!
//! Each simulation starts from a full world state sampled from the
//! searching player's information set. With a bounded world-sample budget
//! the first K samples are cached and then reused uniformly at random.

use crate::core::{PlayerId, SearchRng};
use crate::error::{ISMCTSError, Result};
use crate::game::{GameState, Resampler, Turn};

use super::config::WorldSamples;

/// Sample a state consistent with the acting player's information set.
///
/// An injected `resampler` takes precedence over the game's own
/// `resample_from_infostate`. Having neither is a protocol error.
pub fn resample_from_infostate<S: GameState>(
    state: &S,
    resampler: Option<&dyn Resampler<S>>,
    rng: &mut SearchRng,
) -> Result<S> {
    let player = acting_player(state)?;

    if let Some(resampler) = resampler {
        return Ok(resampler.resample(state, player, rng));
    }

    state.resample_from_infostate(player, rng).ok_or_else(|| {
        ISMCTSError::StateProtocol(
            "state cannot resample from its information state and no resampler was provided"
                .into(),
        )
    })
}

fn acting_player<S: GameState>(state: &S) -> Result<PlayerId> {
    match state.current_player() {
        Turn::Player(p) => Ok(p),
        turn => Err(ISMCTSError::StateProtocol(format!(
            "determinization requires a decision node, got {turn:?}"
        ))),
    }
}

/// Cache of root determinizations for one search.
#[derive(Clone, Debug)]
pub struct RootSampleCache<S> {
    samples: Vec<S>,
    budget: WorldSamples,
}

impl<S: GameState> RootSampleCache<S> {
    /// Create an empty cache for the given budget.
    pub fn new(budget: WorldSamples) -> Self {
        let capacity = match budget {
            WorldSamples::Bounded(k) => k.min(1024),
            WorldSamples::Unlimited => 0,
        };
        Self {
            samples: Vec::with_capacity(capacity),
            budget,
        }
    }

    /// Number of cached samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no sample is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop all cached samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Produce the root state for the next simulation.
    ///
    /// Always returns a fresh clone; cached samples are never handed out.
    pub fn sample_root(
        &mut self,
        state: &S,
        resampler: Option<&dyn Resampler<S>>,
        rng: &mut SearchRng,
    ) -> Result<S> {
        match self.budget {
            WorldSamples::Unlimited => resample_from_infostate(state, resampler, rng),
            WorldSamples::Bounded(0) => Err(ISMCTSError::Configuration(
                "bounded world samples must be at least 1".into(),
            )),
            WorldSamples::Bounded(k) if self.samples.len() < k => {
                let sample = resample_from_infostate(state, resampler, rng)?;
                self.samples.push(sample.clone());
                Ok(sample)
            }
            WorldSamples::Bounded(_) => {
                let idx = rng.gen_range_usize(0..self.samples.len());
                Ok(self.samples[idx].clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::kuhn::{KuhnAction, KuhnState};

    #[derive(Clone, Debug)]
    struct NoResample(KuhnState);

    impl GameState for NoResample {
        type Action = KuhnAction;

        fn num_players(&self) -> usize {
            self.0.num_players()
        }

        fn current_player(&self) -> Turn {
            self.0.current_player()
        }

        fn legal_actions(&self) -> Vec<KuhnAction> {
            self.0.legal_actions()
        }

        fn chance_outcomes(&self) -> Vec<(KuhnAction, f64)> {
            self.0.chance_outcomes()
        }

        fn apply_action(&mut self, action: &KuhnAction) {
            self.0.apply_action(action);
        }

        fn returns(&self) -> Vec<f64> {
            self.0.returns()
        }

        fn information_state_string(&self, player: PlayerId) -> String {
            self.0.information_state_string(player)
        }
    }

    #[test]
    fn test_unlimited_always_resamples() {
        let state = KuhnState::with_cards(1, 0);
        let mut cache = RootSampleCache::new(WorldSamples::Unlimited);
        let mut rng = SearchRng::new(3);

        for _ in 0..20 {
            let sample = cache.sample_root(&state, None, &mut rng).unwrap();
            assert_eq!(sample.card(PlayerId::new(0)), Some(1));
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn test_bounded_fills_then_reuses() {
        let state = KuhnState::with_cards(1, 0);
        let mut cache = RootSampleCache::new(WorldSamples::Bounded(2));
        let mut rng = SearchRng::new(3);

        let first = cache.sample_root(&state, None, &mut rng).unwrap();
        let second = cache.sample_root(&state, None, &mut rng).unwrap();
        assert_eq!(cache.len(), 2);

        for _ in 0..20 {
            let sample = cache.sample_root(&state, None, &mut rng).unwrap();
            assert!(sample == first || sample == second);
        }
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_injected_resampler_takes_precedence() {
        let state = KuhnState::with_cards(1, 0);
        let fixed = |s: &KuhnState, _p: PlayerId, _rng: &mut SearchRng| {
            let mut out = KuhnState::with_cards(1, 2);
            for a in s.history() {
                out.apply_action(a);
            }
            out
        };
        let mut rng = SearchRng::new(0);

        for _ in 0..10 {
            let sample = resample_from_infostate(&state, Some(&fixed), &mut rng).unwrap();
            assert_eq!(sample, KuhnState::with_cards(1, 2));
        }
    }

    #[test]
    fn test_missing_resampler_is_protocol_error() {
        let state = NoResample(KuhnState::with_cards(1, 0));
        let mut cache = RootSampleCache::new(WorldSamples::Unlimited);
        let result = cache.sample_root(&state, None, &mut SearchRng::new(0));
        assert!(matches!(result, Err(ISMCTSError::StateProtocol(_))));
    }

    #[test]
    fn test_chance_root_is_protocol_error() {
        let result = resample_from_infostate(&KuhnState::new(), None, &mut SearchRng::new(0));
        assert!(matches!(result, Err(ISMCTSError::StateProtocol(_))));
    }

    #[test]
    fn test_zero_budget_is_configuration_error() {
        let state = KuhnState::with_cards(1, 0);
        let mut cache = RootSampleCache::new(WorldSamples::Bounded(0));
        let result = cache.sample_root(&state, None, &mut SearchRng::new(0));
        assert!(matches!(result, Err(ISMCTSError::Configuration(_))));
    }
}
