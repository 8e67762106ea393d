//! Arena-backed information-set store.
//!
//! Nodes live in a flat `Vec` addressed by `NodeId`; a hash index maps each
//! `InfoSetKey` to its node. The store is scoped to one `run_search` call.

use log::warn;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{ISMCTSError, Result};
use crate::evaluator::{uniform_prior, Evaluator};
use crate::game::GameState;

use super::node::{ISMCTSNode, InfoSetKey, NodeId};

/// Priors within this distance of 1 are left as they are.
pub const PRIOR_TOLERANCE: f64 = 1e-5;

/// Map from information-set key to node.
#[derive(Clone, Debug)]
pub struct InfoSetStore<A> {
    /// All nodes, in creation order.
    nodes: Vec<ISMCTSNode<A>>,

    /// Key to arena index.
    index: FxHashMap<InfoSetKey, NodeId>,
}

impl<A> Default for InfoSetStore<A> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<A: Clone + PartialEq> InfoSetStore<A> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the node for a key.
    #[must_use]
    pub fn lookup(&self, key: &InfoSetKey) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    /// Get a node by ID.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &ISMCTSNode<A> {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut ISMCTSNode<A> {
        &mut self.nodes[id.0 as usize]
    }

    /// Insert a node under `key`, replacing any existing mapping.
    pub fn insert(&mut self, key: InfoSetKey, node: ISMCTSNode<A>) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        self.index.insert(key, id);
        id
    }

    /// Return the node for `key`, creating it from `state` if absent.
    ///
    /// A new node gets its priors from `evaluator` (none for terminal
    /// states) and starts unexpanded.
    pub fn lookup_or_create<S, E>(
        &mut self,
        key: InfoSetKey,
        state: &S,
        evaluator: &E,
    ) -> Result<NodeId>
    where
        S: GameState<Action = A>,
        E: Evaluator<S>,
    {
        if let Some(id) = self.lookup(&key) {
            return Ok(id);
        }
        let priors = initial_priors(state, evaluator)?;
        Ok(self.insert(key, ISMCTSNode::new(priors)))
    }

    /// Number of nodes in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }

    /// Iterate over `(key, node)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&InfoSetKey, &ISMCTSNode<A>)> {
        self.index.iter().map(|(k, id)| (k, self.get(*id)))
    }

    /// Get statistics about the store.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            node_count: self.nodes.len(),
            expanded_count: self.nodes.iter().filter(|n| !n.is_unexpanded()).count(),
            child_count: self.nodes.iter().map(|n| n.children.len()).sum(),
            max_children: self.nodes.iter().map(|n| n.children.len()).max().unwrap_or(0),
        }
    }
}

/// Priors for a freshly created node.
///
/// Evaluator failures and malformed priors fall back to uniform over the
/// legal actions. Priors that cannot be normalized are a protocol error.
pub fn initial_priors<S, E>(state: &S, evaluator: &E) -> Result<SmallVec<[(S::Action, f64); 8]>>
where
    S: GameState,
    E: Evaluator<S>,
{
    if state.is_terminal() {
        return Ok(SmallVec::new());
    }

    let legal = state.legal_actions();
    let priors = match evaluator.prior(state) {
        Ok(priors) if is_well_formed(&priors, &legal) => priors,
        Ok(priors) => {
            warn!(
                "evaluator prior covers {} actions, not the {} legal ones; using uniform prior",
                priors.len(),
                legal.len()
            );
            uniform_prior(&legal)
        }
        Err(e) => {
            warn!("{e}; using uniform prior");
            uniform_prior(&legal)
        }
    };

    normalize_priors(priors.into_iter().collect())
}

fn is_well_formed<A: PartialEq>(priors: &[(A, f64)], legal: &[A]) -> bool {
    if priors.is_empty() {
        return legal.is_empty();
    }
    priors.iter().all(|(a, _)| legal.contains(a))
}

/// Rescale priors to sum to 1.
pub fn normalize_priors<A>(mut priors: SmallVec<[(A, f64); 8]>) -> Result<SmallVec<[(A, f64); 8]>> {
    if priors.is_empty() {
        return Ok(priors);
    }

    if let Some((_, bad)) = priors.iter().find(|(_, p)| !p.is_finite() || *p < 0.0) {
        return Err(ISMCTSError::StateProtocol(format!(
            "prior probability {bad} is not a finite non-negative number"
        )));
    }

    let sum: f64 = priors.iter().map(|(_, p)| p).sum();
    if sum <= 0.0 {
        return Err(ISMCTSError::StateProtocol(
            "prior probabilities sum to zero".into(),
        ));
    }

    if (sum - 1.0).abs() > PRIOR_TOLERANCE {
        warn!("priors sum to {sum}, renormalizing");
        for (_, p) in priors.iter_mut() {
            *p /= sum;
        }
    }

    Ok(priors)
}

/// Statistics about an information-set store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Total number of nodes.
    pub node_count: usize,

    /// Nodes visited at least once.
    pub expanded_count: usize,

    /// Total number of expanded actions.
    pub child_count: usize,

    /// Largest number of expanded actions at one node.
    pub max_children: usize,
}

impl StoreStats {
    /// Average expanded actions per node.
    #[must_use]
    pub fn branching_factor(&self) -> f64 {
        if self.node_count == 0 {
            0.0
        } else {
            self.child_count as f64 / self.node_count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PlayerId, SearchRng};
    use crate::evaluator::{EvalError, UniformEvaluator};
    use crate::games::kuhn::{KuhnAction, KuhnState};

    struct FixedPrior(std::result::Result<Vec<(KuhnAction, f64)>, EvalError>);

    impl Evaluator<KuhnState> for FixedPrior {
        fn prior(
            &self,
            _state: &KuhnState,
        ) -> std::result::Result<Vec<(KuhnAction, f64)>, EvalError> {
            self.0.clone()
        }

        fn evaluate(
            &self,
            _state: &KuhnState,
            _rng: &mut SearchRng,
        ) -> std::result::Result<Vec<f64>, EvalError> {
            Ok(vec![0.0, 0.0])
        }
    }

    fn key(info: &str) -> InfoSetKey {
        InfoSetKey::new(PlayerId::new(0), info)
    }

    #[test]
    fn test_lookup_or_create_reuses_node() {
        let mut store = InfoSetStore::new();
        let state = KuhnState::with_cards(0, 1);

        let a = store.lookup_or_create(key("J:"), &state, &UniformEvaluator).unwrap();
        let b = store.lookup_or_create(key("J:"), &state, &UniformEvaluator).unwrap();
        let c = store.lookup_or_create(key("Q:"), &state, &UniformEvaluator).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(store.len(), 2);
        assert!(store.get(a).is_unexpanded());
        assert_eq!(store.get(a).priors.len(), 2);
    }

    #[test]
    fn test_terminal_node_has_no_priors() {
        let mut state = KuhnState::with_cards(0, 1);
        state.apply_action(&KuhnAction::Pass);
        state.apply_action(&KuhnAction::Pass);

        let priors = initial_priors(&state, &UniformEvaluator).unwrap();
        assert!(priors.is_empty());
    }

    #[test]
    fn test_failed_prior_falls_back_to_uniform() {
        let state = KuhnState::with_cards(0, 1);
        let eval = FixedPrior(Err(EvalError::msg("boom")));

        let priors = initial_priors(&state, &eval).unwrap();
        assert_eq!(priors.len(), 2);
        assert!(priors.iter().all(|(_, p)| (*p - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_malformed_prior_falls_back_to_uniform() {
        let state = KuhnState::with_cards(0, 1);

        let illegal = FixedPrior(Ok(vec![(KuhnAction::Deal(2), 1.0)]));
        let priors = initial_priors(&state, &illegal).unwrap();
        assert_eq!(priors.len(), 2);
        assert!(priors.iter().all(|(a, _)| *a != KuhnAction::Deal(2)));

        let empty = FixedPrior(Ok(vec![]));
        assert_eq!(initial_priors(&state, &empty).unwrap().len(), 2);
    }

    #[test]
    fn test_prior_renormalized() {
        let state = KuhnState::with_cards(0, 1);
        let eval = FixedPrior(Ok(vec![(KuhnAction::Pass, 1.0), (KuhnAction::Bet, 3.0)]));

        let priors = initial_priors(&state, &eval).unwrap();
        assert!((priors[0].1 - 0.25).abs() < 1e-12);
        assert!((priors[1].1 - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_unnormalizable_prior_is_protocol_error() {
        let state = KuhnState::with_cards(0, 1);

        let zero = FixedPrior(Ok(vec![(KuhnAction::Pass, 0.0), (KuhnAction::Bet, 0.0)]));
        assert!(matches!(initial_priors(&state, &zero), Err(ISMCTSError::StateProtocol(_))));

        let negative = FixedPrior(Ok(vec![(KuhnAction::Pass, -0.5), (KuhnAction::Bet, 1.5)]));
        assert!(matches!(initial_priors(&state, &negative), Err(ISMCTSError::StateProtocol(_))));

        let nan = FixedPrior(Ok(vec![(KuhnAction::Pass, f64::NAN)]));
        assert!(initial_priors(&state, &nan).is_err());
    }

    #[test]
    fn test_clear_and_stats() {
        let mut store = InfoSetStore::new();
        let state = KuhnState::with_cards(0, 1);
        let id = store.lookup_or_create(key("J:"), &state, &UniformEvaluator).unwrap();
        store.lookup_or_create(key("J:p"), &state, &UniformEvaluator).unwrap();

        store.get_mut(id).total_visits = Some(0);
        store.get_mut(id).backpropagate(Some(&KuhnAction::Bet), 1.0);

        let stats = store.stats();
        assert_eq!(stats.node_count, 2);
        assert_eq!(stats.expanded_count, 1);
        assert_eq!(stats.child_count, 1);
        assert_eq!(stats.max_children, 1);
        assert_eq!(stats.branching_factor(), 0.5);
        assert_eq!(store.iter().count(), 2);

        store.clear();
        assert!(store.is_empty());
        assert!(store.lookup(&key("J:")).is_none());
    }
}
