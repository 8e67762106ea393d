//! Final policy extraction from root statistics.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::core::SearchRng;

use super::config::FinalPolicyType;
use super::node::ISMCTSNode;
use super::select::TIE_TOLERANCE;

/// Action distribution returned by a search.
///
/// Entries follow the order of the legal actions they were built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionPolicy<A> {
    entries: Vec<(A, f64)>,
}

impl<A> Default for ActionPolicy<A> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<A> ActionPolicy<A> {
    /// Empty policy (terminal states, no legal actions).
    pub fn empty() -> Self {
        Self::default()
    }

    /// All probability on one action.
    pub fn certain(action: A) -> Self {
        Self {
            entries: vec![(action, 1.0)],
        }
    }

    /// Number of actions listed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no action is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(action, probability)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&A, f64)> {
        self.entries.iter().map(|(a, p)| (a, *p))
    }

    /// Sum of all probabilities.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, p)| p).sum()
    }

    /// Consume into the underlying pairs.
    pub fn into_vec(self) -> Vec<(A, f64)> {
        self.entries
    }

    /// Draw an action in proportion to its probability.
    pub fn sample(&self, rng: &mut SearchRng) -> Option<&A> {
        let weights: Vec<f64> = self.entries.iter().map(|(_, p)| *p).collect();
        rng.choose_weighted(&weights).map(|idx| &self.entries[idx].0)
    }
}

impl<A: PartialEq> ActionPolicy<A> {
    /// Probability of `action` (0 if absent).
    #[must_use]
    pub fn probability(&self, action: &A) -> f64 {
        self.entries
            .iter()
            .find(|(a, _)| a == action)
            .map_or(0.0, |(_, p)| *p)
    }
}

impl<A: Clone> ActionPolicy<A> {
    /// Uniform distribution over `actions`.
    pub fn uniform(actions: &[A]) -> Self {
        if actions.is_empty() {
            return Self::empty();
        }
        let p = 1.0 / actions.len() as f64;
        Self {
            entries: actions.iter().map(|a| (a.clone(), p)).collect(),
        }
    }
}

impl<A> From<ActionPolicy<A>> for Vec<(A, f64)> {
    fn from(policy: ActionPolicy<A>) -> Self {
        policy.into_vec()
    }
}

/// Turn root statistics into a distribution over `legal`.
///
/// A root with no visits yields a uniform policy.
pub fn extract_policy<A: Clone + PartialEq>(
    node: &ISMCTSNode<A>,
    legal: &[A],
    kind: FinalPolicyType,
) -> ActionPolicy<A> {
    if node.visits() == 0 {
        warn!("root has no visits after search, returning uniform policy");
        return ActionPolicy::uniform(legal);
    }

    let raw = match kind {
        FinalPolicyType::NormalizedVisitCount => normalized_visits(node),
        FinalPolicyType::MaxVisitCount => max_visits(node),
        FinalPolicyType::MaxValue => max_value(node),
    };

    finalize(raw, legal)
}

fn normalized_visits<A: Clone>(node: &ISMCTSNode<A>) -> Vec<(A, f64)> {
    let total = node.visits() as f64;
    node.children
        .iter()
        .filter(|c| c.visits > 0)
        .map(|c| (c.action.clone(), c.visits as f64 / total))
        .collect()
}

fn max_visits<A: Clone>(node: &ISMCTSNode<A>) -> Vec<(A, f64)> {
    let Some(best) = node.children.iter().map(|c| c.visits).max() else {
        return Vec::new();
    };
    let winners: Vec<A> = node
        .children
        .iter()
        .filter(|c| c.visits == best)
        .map(|c| c.action.clone())
        .collect();
    split_evenly(winners)
}

fn max_value<A: Clone>(node: &ISMCTSNode<A>) -> Vec<(A, f64)> {
    let best = node
        .children
        .iter()
        .filter(|c| c.visits > 0)
        .map(|c| c.mean_return())
        .fold(f64::NEG_INFINITY, f64::max);

    let winners: Vec<A> = node
        .children
        .iter()
        .filter(|c| c.visits > 0 && c.mean_return() >= best - TIE_TOLERANCE)
        .map(|c| c.action.clone())
        .collect();
    split_evenly(winners)
}

fn split_evenly<A>(actions: Vec<A>) -> Vec<(A, f64)> {
    let p = 1.0 / actions.len().max(1) as f64;
    actions.into_iter().map(|a| (a, p)).collect()
}

/// List every legal action exactly once and make the mass sum to 1.
///
/// Legal actions absent from `raw` get probability 0 and entries for
/// actions outside `legal` are dropped. Zero total mass becomes uniform.
pub fn finalize<A: Clone + PartialEq>(raw: Vec<(A, f64)>, legal: &[A]) -> ActionPolicy<A> {
    let mut entries: Vec<(A, f64)> = legal
        .iter()
        .map(|a| {
            let p = raw
                .iter()
                .find(|(r, _)| r == a)
                .map_or(0.0, |(_, p)| *p);
            (a.clone(), p)
        })
        .collect();

    let total: f64 = entries.iter().map(|(_, p)| p).sum();
    if !(total > 0.0) {
        return ActionPolicy::uniform(legal);
    }

    for (_, p) in entries.iter_mut() {
        *p /= total;
    }
    ActionPolicy { entries }
}
