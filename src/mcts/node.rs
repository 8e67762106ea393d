//! Information-set node and per-action statistics.
//!
//! Nodes are stored in the `InfoSetStore` arena and addressed by `NodeId`.
//! They hold no parent or child links: the search rediscovers the tree from
//! the root every simulation by looking up information-set keys.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::PlayerId;

/// Index into the `InfoSetStore` node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new node ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Identity of an information set: acting player plus its canonical string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InfoSetKey {
    /// Player to act.
    pub player: PlayerId,

    /// Information state (or observation) string for `player`.
    pub info: String,
}

impl InfoSetKey {
    /// Create a key.
    pub fn new(player: PlayerId, info: impl Into<String>) -> Self {
        Self {
            player,
            info: info.into(),
        }
    }
}

impl std::fmt::Display for InfoSetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {:?}", self.player, self.info)
    }
}

/// Statistics for one action taken from a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChildStat<A> {
    /// The action.
    pub action: A,

    /// Times this action was chosen from the node.
    pub visits: u32,

    /// Sum of the acting player's returns through this action.
    pub return_sum: f64,

    /// Prior probability from the evaluator.
    pub prior: f64,
}

impl<A> ChildStat<A> {
    /// Create an unvisited child.
    pub fn new(action: A, prior: f64) -> Self {
        Self {
            action,
            visits: 0,
            return_sum: 0.0,
            prior,
        }
    }

    /// Mean return (0 when unvisited).
    #[must_use]
    pub fn mean_return(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.return_sum / self.visits as f64
        }
    }
}

/// A decision point in the search tree, shared by every world state in one
/// information set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ISMCTSNode<A> {
    /// Total visits; `None` until the first visit evaluates the node.
    pub total_visits: Option<u32>,

    /// Expanded actions in expansion order.
    pub children: SmallVec<[ChildStat<A>; 8]>,

    /// Evaluator priors, fixed at creation. Empty for terminal states.
    pub priors: SmallVec<[(A, f64); 8]>,
}

impl<A> ISMCTSNode<A> {
    /// Create an unexpanded node with the given priors.
    pub fn new(priors: SmallVec<[(A, f64); 8]>) -> Self {
        Self {
            total_visits: None,
            children: SmallVec::new(),
            priors,
        }
    }

    /// Check if the node has never been visited.
    #[must_use]
    pub fn is_unexpanded(&self) -> bool {
        self.total_visits.is_none()
    }

    /// Total visits, counting the unexpanded sentinel as zero.
    #[must_use]
    pub fn visits(&self) -> u32 {
        self.total_visits.unwrap_or(0)
    }

    /// Sum of child visit counts.
    #[must_use]
    pub fn child_visits(&self) -> u32 {
        self.children.iter().map(|c| c.visits).sum()
    }
}

impl<A: Clone + PartialEq> ISMCTSNode<A> {
    /// Prior for an action (0 if the evaluator did not cover it).
    #[must_use]
    pub fn prior(&self, action: &A) -> f64 {
        self.priors
            .iter()
            .find(|(a, _)| a == action)
            .map_or(0.0, |(_, p)| *p)
    }

    /// Statistics for an expanded action.
    #[must_use]
    pub fn child(&self, action: &A) -> Option<&ChildStat<A>> {
        self.children.iter().find(|c| &c.action == action)
    }

    /// Add a child for `action` if missing, taking its prior from `priors`.
    ///
    /// Returns the child's index.
    pub fn expand(&mut self, action: &A) -> usize {
        if let Some(idx) = self.children.iter().position(|c| &c.action == action) {
            return idx;
        }
        let prior = self.prior(action);
        self.children.push(ChildStat::new(action.clone(), prior));
        self.children.len() - 1
    }

    /// Record one pass through this node.
    ///
    /// The node's visit count always grows; the chosen action (if any) is
    /// credited with `value`, the acting player's return.
    pub fn backpropagate(&mut self, chosen: Option<&A>, value: f64) {
        self.total_visits = Some(self.visits() + 1);

        if let Some(action) = chosen {
            let idx = self.expand(action);
            let child = &mut self.children[idx];
            child.visits += 1;
            child.return_sum += value;
        }
    }

    /// Copy of this node restricted to `legal` actions.
    ///
    /// Visits of removed children are subtracted from the copy's total.
    #[must_use]
    pub fn filter_legal(&self, legal: &[A]) -> Self {
        let mut filtered = self.clone();
        let mut removed = 0u32;

        filtered.children.retain(|c| {
            let keep = legal.contains(&c.action);
            if !keep {
                removed += c.visits;
            }
            keep
        });
        filtered.priors.retain(|(a, _)| legal.contains(a));
        filtered.total_visits = self.total_visits.map(|v| v.saturating_sub(removed));

        filtered
    }
}
