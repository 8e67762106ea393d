//! Core IS-MCTS search algorithm.
//!
//! Every simulation starts from a fresh determinization of the root
//! information set and walks down the game, looking nodes up by
//! information-set key. Each decision level expands at most one action and
//! credits at most one action on the way back up.

use std::time::Instant;

use log::{debug, warn};

use crate::core::{PlayerId, SearchRng};
use crate::error::{ISMCTSError, Result};
use crate::evaluator::Evaluator;
use crate::game::{GameState, Resampler, Turn};

use super::config::{ActionSetMode, ISMCTSConfig, InfoKeySource};
use super::node::{ISMCTSNode, InfoSetKey, NodeId};
use super::policy::{extract_policy, ActionPolicy};
use super::sampler::RootSampleCache;
use super::select::{check_expand, select_action_tree_policy};
use super::stats::SearchStats;
use super::store::{InfoSetStore, PRIOR_TOLERANCE};

/// Information-Set MCTS engine.
///
/// Generic over the game state and the evaluator. Owns the configuration,
/// the random source and the information-set store of the last search.
pub struct ISMCTSSearch<S: GameState, E: Evaluator<S>> {
    /// Prior and value estimator.
    evaluator: E,

    /// Search configuration.
    config: ISMCTSConfig,

    /// RNG for determinization, expansion and tie-breaking.
    rng: SearchRng,

    /// Overrides `GameState::resample_from_infostate` when set.
    resampler: Option<Box<dyn Resampler<S>>>,

    /// Nodes of the last search.
    store: InfoSetStore<S::Action>,

    /// Root key of the last search.
    root_key: Option<InfoSetKey>,

    /// Search statistics.
    stats: SearchStats,
}

impl<S: GameState, E: Evaluator<S>> ISMCTSSearch<S, E> {
    /// Create a new engine seeded from `config.seed`.
    pub fn new(evaluator: E, config: ISMCTSConfig) -> Self {
        let rng = SearchRng::new(config.seed);

        Self {
            evaluator,
            config,
            rng,
            resampler: None,
            store: InfoSetStore::new(),
            root_key: None,
            stats: SearchStats::default(),
        }
    }

    /// Use an existing random source instead of one seeded from the config.
    pub fn with_rng(mut self, rng: SearchRng) -> Self {
        self.rng = rng;
        self
    }

    /// Determinize with `resampler` instead of the game's own resampling.
    pub fn with_resampler<R: Resampler<S> + 'static>(mut self, resampler: R) -> Self {
        self.resampler = Some(Box::new(resampler));
        self
    }

    /// Replace (or remove) the injected resampler.
    pub fn set_resampler(&mut self, resampler: Option<Box<dyn Resampler<S>>>) {
        self.resampler = resampler;
    }

    /// Run a search from `state` and return the resulting policy.
    ///
    /// Terminal states and states without legal actions yield an empty
    /// policy; a single legal action is returned with probability 1
    /// without searching.
    pub fn run_search(&mut self, state: &S) -> Result<ActionPolicy<S::Action>> {
        self.config.validate()?;

        let start = Instant::now();
        self.stats.reset();
        self.store.clear();
        self.root_key = None;

        if state.has_perfect_information() {
            warn!("running IS-MCTS on a perfect-information game");
        }

        let player = match state.current_player() {
            Turn::Terminal => return Ok(ActionPolicy::empty()),
            Turn::Player(p) => p,
            Turn::Chance => {
                return Err(ISMCTSError::StateProtocol(
                    "search root must be a decision node, got a chance node".into(),
                ))
            }
        };

        let legal = state.legal_actions();
        match legal.as_slice() {
            [] => return Ok(ActionPolicy::empty()),
            [only] => return Ok(ActionPolicy::certain(only.clone())),
            _ => {}
        }

        let root_key = info_key(state, player, self.config.info_key_source);
        debug!(
            "search start: {root_key}, {} legal actions, {} simulations",
            legal.len(),
            self.config.max_simulations
        );

        let root_id = {
            let mut ctx = SearchContext {
                config: &self.config,
                evaluator: &self.evaluator,
                resampler: self.resampler.as_deref(),
                rng: &mut self.rng,
                stats: &mut self.stats,
                store: &mut self.store,
                samples: RootSampleCache::new(self.config.max_world_samples),
            };

            let root_id = ctx.lookup_or_create(root_key.clone(), state)?;

            for sim in 0..ctx.config.max_simulations {
                ctx.stats.iterations += 1;

                let sampled = ctx.samples.sample_root(state, ctx.resampler, ctx.rng)?;
                if ctx.config.check_determinizations {
                    ctx.check_determinization(&sampled, player, &root_key);
                }

                match ctx.simulate(sampled, 0) {
                    Ok(_) => {}
                    Err(e) if e.is_recoverable() => {
                        warn!("simulation {} skipped: {e}", sim + 1);
                        ctx.stats.failed_simulations += 1;
                    }
                    Err(e) => return Err(e),
                }
            }

            root_id
        };

        self.stats.time_us = start.elapsed().as_micros() as u64;

        let root = self.store.get(root_id);
        let policy = match self.config.action_set_mode {
            ActionSetMode::Strict => extract_policy(root, &legal, self.config.final_policy),
            ActionSetMode::Tolerant => {
                extract_policy(&root.filter_legal(&legal), &legal, self.config.final_policy)
            }
        };

        debug!(
            "search done: {} iterations ({} failed), {} nodes, root visits {}, {}us",
            self.stats.iterations,
            self.stats.failed_simulations,
            self.store.len(),
            root.visits(),
            self.stats.time_us
        );

        self.root_key = Some(root_key);
        Ok(policy)
    }

    /// Search, then sample an action from the resulting policy.
    ///
    /// Returns `None` when the policy is empty.
    pub fn step(&mut self, state: &S) -> Result<Option<S::Action>> {
        self.step_with_policy(state).map(|(_, action)| action)
    }

    /// Search and return both the policy and an action sampled from it.
    pub fn step_with_policy(
        &mut self,
        state: &S,
    ) -> Result<(ActionPolicy<S::Action>, Option<S::Action>)> {
        let policy = self.run_search(state)?;
        let action = policy.sample(&mut self.rng).cloned();
        Ok((policy, action))
    }

    /// Get search statistics of the last search.
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Get the information-set store of the last search.
    #[must_use]
    pub fn store(&self) -> &InfoSetStore<S::Action> {
        &self.store
    }

    /// Root node of the last search, if it ran any simulations.
    #[must_use]
    pub fn root_node(&self) -> Option<&ISMCTSNode<S::Action>> {
        let key = self.root_key.as_ref()?;
        self.store.lookup(key).map(|id| self.store.get(id))
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &ISMCTSConfig {
        &self.config
    }

    /// Get the evaluator.
    #[must_use]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }
}

/// Information-set key of `state` for `player`.
pub fn info_key<S: GameState>(state: &S, player: PlayerId, source: InfoKeySource) -> InfoSetKey {
    let info = match source {
        InfoKeySource::InformationState => state.information_state_string(player),
        InfoKeySource::Observation => state.observation_string(player),
    };
    InfoSetKey::new(player, info)
}

/// Borrowed view of the engine for the duration of one `run_search`.
struct SearchContext<'a, S: GameState, E> {
    config: &'a ISMCTSConfig,
    evaluator: &'a E,
    resampler: Option<&'a dyn Resampler<S>>,
    rng: &'a mut SearchRng,
    stats: &'a mut SearchStats,
    store: &'a mut InfoSetStore<S::Action>,
    samples: RootSampleCache<S>,
}

impl<S: GameState, E: Evaluator<S>> SearchContext<'_, S, E> {
    fn lookup_or_create(&mut self, key: InfoSetKey, state: &S) -> Result<NodeId> {
        let before = self.store.len();
        let id = self.store.lookup_or_create(key, state, self.evaluator)?;
        if self.store.len() > before {
            self.stats.nodes_created += 1;
        }
        Ok(id)
    }

    fn check_determinization(&self, sampled: &S, player: PlayerId, root_key: &InfoSetKey) {
        let key = info_key(sampled, player, self.config.info_key_source);
        if &key != root_key {
            warn!("determinization changed the root key: {root_key} became {key}");
        }
    }

    /// One simulation step from `state`, returning per-player returns.
    fn simulate(&mut self, mut state: S, depth: u16) -> Result<Vec<f64>> {
        match state.current_player() {
            Turn::Terminal => checked_returns(state.returns(), state.num_players()),
            Turn::Chance => {
                let outcomes = state.chance_outcomes();
                if outcomes.is_empty() {
                    warn!("chance node without outcomes, treating as a zero-return leaf");
                    return Ok(vec![0.0; state.num_players()]);
                }

                let weights = chance_weights(&outcomes)?;
                let idx = self.rng.choose_weighted(&weights).ok_or_else(|| {
                    ISMCTSError::Simulation("chance outcomes carry no probability mass".into())
                })?;
                self.stats.chance_samples += 1;

                state.apply_action(&outcomes[idx].0);
                self.simulate(state, depth)
            }
            Turn::Player(player) => self.simulate_decision(state, player, depth),
        }
    }

    fn simulate_decision(
        &mut self,
        mut state: S,
        player: PlayerId,
        depth: u16,
    ) -> Result<Vec<f64>> {
        let depth = depth.saturating_add(1);
        self.stats.max_depth = self.stats.max_depth.max(depth);

        let legal = state.legal_actions();
        if legal.is_empty() {
            warn!("{player} has no legal actions at a non-terminal state");
            return Ok(vec![0.0; state.num_players()]);
        }

        let key = info_key(&state, player, self.config.info_key_source);
        let id = self.lookup_or_create(key, &state)?;

        // First visit: estimate this node and stop here
        if self.store.get(id).is_unexpanded() {
            self.store.get_mut(id).total_visits = Some(0);
            let returns = self.leaf_value(&state)?;
            self.store.get_mut(id).backpropagate(None, 0.0);
            return Ok(returns);
        }

        let mode = self.config.action_set_mode;
        let (action, returns) = match check_expand(self.store.get(id), &legal, mode, self.rng) {
            Some(action) => {
                self.store.get_mut(id).expand(&action);
                self.stats.expansions += 1;
                state.apply_action(&action);
                let returns = self.leaf_value(&state)?;
                (action, returns)
            }
            None => {
                let node = self.store.get_mut(id);
                let action = select_action_tree_policy(node, &legal, self.config, self.rng)?;
                state.apply_action(&action);
                let returns = self.simulate(state, depth)?;
                (action, returns)
            }
        };

        let value = player.value_in(&returns).ok_or_else(|| {
            ISMCTSError::StateProtocol(format!(
                "returns vector of length {} has no entry for {player}",
                returns.len()
            ))
        })?;
        self.store.get_mut(id).backpropagate(Some(&action), value);

        Ok(returns)
    }

    /// Value of a freshly reached state: terminal returns or an evaluation.
    fn leaf_value(&mut self, state: &S) -> Result<Vec<f64>> {
        let num_players = state.num_players();
        if state.is_terminal() {
            return checked_returns(state.returns(), num_players);
        }

        self.stats.evaluations += 1;
        let values = self.evaluator.evaluate(state, self.rng)?;
        if values.len() < num_players {
            return Err(ISMCTSError::Simulation(format!(
                "evaluator returned {} values for {num_players} players",
                values.len()
            )));
        }
        Ok(values)
    }
}

fn checked_returns(returns: Vec<f64>, num_players: usize) -> Result<Vec<f64>> {
    if returns.len() < num_players {
        return Err(ISMCTSError::StateProtocol(format!(
            "returns vector has {} entries for {num_players} players",
            returns.len()
        )));
    }
    Ok(returns)
}

/// Validated chance weights; off-by-tolerance sums are renormalized.
fn chance_weights<A>(outcomes: &[(A, f64)]) -> Result<Vec<f64>> {
    if let Some((_, bad)) = outcomes.iter().find(|(_, p)| !p.is_finite() || *p < 0.0) {
        return Err(ISMCTSError::Simulation(format!(
            "chance probability {bad} is not a finite non-negative number"
        )));
    }

    let sum: f64 = outcomes.iter().map(|(_, p)| p).sum();
    if sum <= 0.0 {
        return Err(ISMCTSError::Simulation(
            "chance outcome probabilities sum to zero".into(),
        ));
    }

    let mut weights: Vec<f64> = outcomes.iter().map(|(_, p)| *p).collect();
    if (sum - 1.0).abs() > PRIOR_TOLERANCE {
        warn!("chance outcome probabilities sum to {sum}, renormalizing");
        for w in weights.iter_mut() {
            *w /= sum;
        }
    }
    Ok(weights)
}
