//! Information-Set Monte Carlo Tree Search.
//!
//! ## Overview
//!
//! This module implements IS-MCTS for sequential imperfect-information
//! games. Key features:
//!
//! - **Information-Set Nodes**: Statistics are shared by every world state
//!   the acting player cannot tell apart
//! - **Determinization**: Each simulation starts from a resampled world,
//!   optionally drawn from a bounded cache
//! - **N-Player Support**: Each level credits the player who acted there
//! - **Configurable Policies**: Selection (UCT/PUCT), final policy
//!   (visit share, max visits, max value), strict or tolerant action sets
//! - **Serializable**: Config, nodes and stats can be saved/loaded
//!
//! ## Usage
//!
//! ```rust
//! use ismcts::evaluator::RandomRolloutEvaluator;
//! use ismcts::games::kuhn::KuhnState;
//! use ismcts::mcts::{ISMCTSConfig, ISMCTSSearch};
//!
//! let config = ISMCTSConfig::default().with_simulations(500).with_seed(7);
//! let mut search = ISMCTSSearch::new(RandomRolloutEvaluator::new(1), config);
//!
//! // Player 0 holds the king
//! let state = KuhnState::with_cards(2, 0);
//! let policy = search.run_search(&state).unwrap();
//! for (action, prob) in policy.iter() {
//!     println!("{:?}: {:.2}%", action, prob * 100.0);
//! }
//! ```

pub mod config;
pub mod node;
pub mod policy;
pub mod sampler;
pub mod search;
pub mod select;
pub mod stats;
pub mod store;

// Re-export main types
pub use config::{
    ActionSetMode, ChildSelectionPolicy, FinalPolicyType, ISMCTSConfig, InfoKeySource,
    WorldSamples,
};
pub use node::{ChildStat, ISMCTSNode, InfoSetKey, NodeId};
pub use policy::{extract_policy, ActionPolicy};
pub use sampler::{resample_from_infostate, RootSampleCache};
pub use search::{info_key, ISMCTSSearch};
pub use select::{check_expand, select_action, Puct, SelectionPolicy, Uct, TIE_TOLERANCE};
pub use stats::SearchStats;
pub use store::{InfoSetStore, StoreStats};
