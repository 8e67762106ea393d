//! Child scoring, expansion and tree-policy selection.
//!
//! - `SelectionPolicy`: how a child is scored (`Uct`, `Puct`)
//! - `check_expand`: which unexpanded legal action to grow next, if any
//! - `select_action`: best-scoring child with random tie-breaking

use log::debug;

use crate::core::SearchRng;
use crate::error::{ISMCTSError, Result};

use super::config::{ActionSetMode, ChildSelectionPolicy, ISMCTSConfig};
use super::node::{ChildStat, ISMCTSNode};

/// Scores within this distance of the best are treated as tied.
pub const TIE_TOLERANCE: f64 = 1e-5;

// =============================================================================
// Selection Policy
// =============================================================================

/// Scores a child of a node with `parent_visits` total visits.
pub trait SelectionPolicy {
    /// Selection score; higher is better.
    fn value<A>(&self, parent_visits: u32, child: &ChildStat<A>, c: f64) -> f64;
}

/// UCT (Upper Confidence Bound applied to Trees).
///
/// Formula: Q(a) + c * sqrt(ln(N) / n(a)). Unvisited children score 0, so
/// they never win against a visited sibling with a positive score.
#[derive(Clone, Copy, Debug, Default)]
pub struct Uct;

impl SelectionPolicy for Uct {
    fn value<A>(&self, parent_visits: u32, child: &ChildStat<A>, c: f64) -> f64 {
        if child.visits == 0 {
            return 0.0;
        }
        let ln_parent = (parent_visits as f64).ln();
        child.mean_return() + c * (ln_parent / child.visits as f64).sqrt()
    }
}

/// PUCT (Predictor + UCT).
///
/// Formula: Q(a) + c * P(a) * sqrt(N) / (1 + n(a)). Unvisited children get
/// the pure exploration term c * P(a) * sqrt(max(1, N)).
#[derive(Clone, Copy, Debug, Default)]
pub struct Puct;

impl SelectionPolicy for Puct {
    fn value<A>(&self, parent_visits: u32, child: &ChildStat<A>, c: f64) -> f64 {
        if child.visits == 0 {
            return c * child.prior * (parent_visits.max(1) as f64).sqrt();
        }
        child.mean_return()
            + c * child.prior * (parent_visits as f64).sqrt() / (1.0 + child.visits as f64)
    }
}

impl SelectionPolicy for ChildSelectionPolicy {
    fn value<A>(&self, parent_visits: u32, child: &ChildStat<A>, c: f64) -> f64 {
        match self {
            ChildSelectionPolicy::Uct => Uct.value(parent_visits, child, c),
            ChildSelectionPolicy::Puct => Puct.value(parent_visits, child, c),
        }
    }
}

// =============================================================================
// Expansion
// =============================================================================

/// Pick a legal action that has no statistics yet.
///
/// Returns `None` when the node is fully expanded. In strict mode a node
/// with as many children as legal actions is fully expanded without
/// checking which actions they are.
pub fn check_expand<A: Clone + PartialEq>(
    node: &ISMCTSNode<A>,
    legal: &[A],
    mode: ActionSetMode,
    rng: &mut SearchRng,
) -> Option<A> {
    if mode == ActionSetMode::Strict && node.children.len() == legal.len() {
        return None;
    }

    let missing: Vec<&A> = legal.iter().filter(|a| node.child(a).is_none()).collect();
    rng.choose(&missing).map(|a| (*a).clone())
}

// =============================================================================
// Selection
// =============================================================================

/// Choose the best-scoring child, breaking ties uniformly at random.
pub fn select_action<A: Clone, P: SelectionPolicy>(
    node: &ISMCTSNode<A>,
    policy: &P,
    c: f64,
    rng: &mut SearchRng,
) -> Result<A> {
    let parent_visits = node.total_visits.unwrap_or(0);
    let scores: Vec<f64> = node
        .children
        .iter()
        .map(|child| policy.value(parent_visits, child, c))
        .collect();

    let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let candidates: Vec<&ChildStat<A>> = node
        .children
        .iter()
        .zip(&scores)
        .filter(|(_, score)| **score >= best - TIE_TOLERANCE)
        .map(|(child, _)| child)
        .collect();

    rng.choose(&candidates)
        .map(|child| child.action.clone())
        .ok_or_else(|| {
            ISMCTSError::StateProtocol("select_action called on a node with no children".into())
        })
}

/// Tree-policy selection honouring the configured action-set mode.
///
/// In tolerant mode the node is first restricted to `legal`; if no legal
/// action has been visited, one is chosen uniformly at random and given
/// statistics in the real node.
pub fn select_action_tree_policy<A: Clone + PartialEq>(
    node: &mut ISMCTSNode<A>,
    legal: &[A],
    config: &ISMCTSConfig,
    rng: &mut SearchRng,
) -> Result<A> {
    let c = config.exploration_constant;

    match config.action_set_mode {
        ActionSetMode::Strict => select_action(node, &config.child_selection, c, rng),
        ActionSetMode::Tolerant => {
            let filtered = node.filter_legal(legal);
            if filtered.visits() > 0 && !filtered.children.is_empty() {
                return select_action(&filtered, &config.child_selection, c, rng);
            }

            let action = rng.choose(legal).cloned().ok_or_else(|| {
                ISMCTSError::StateProtocol("tree policy called without legal actions".into())
            })?;
            debug!("no visited legal action among {}, choosing at random", legal.len());
            node.expand(&action);
            Ok(action)
        }
    }
}
