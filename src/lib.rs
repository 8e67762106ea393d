//! # ismcts
//!
//! Information-Set Monte Carlo Tree Search for sequential,
//! imperfect-information, possibly stochastic games.
//!
//! ## Design Principles
//!
//! 1. **Game-Agnostic**: The search sees games only through `GameState`.
//!    Rules, scoring and hidden-information sampling belong to the game.
//!
//! 2. **N-Player First**: Returns are per-player vectors. Each decision
//!    level is credited with its own acting player's return.
//!
//! 3. **Reproducible**: All randomness flows through one seeded
//!    `SearchRng`, so a fixed seed gives identical searches.
//!
//! ## Architecture
//!
//! - **Information-Set Store**: Nodes live in an arena keyed by
//!   (player, information-set string). There are no parent/child pointers;
//!   every simulation rediscovers the tree from the root.
//!
//! - **Determinization**: Each simulation starts from a world state
//!   resampled from the searcher's information set.
//!
//! ## Modules
//!
//! - `core`: Players and the deterministic RNG
//! - `game`: `GameState` and `Resampler` collaborator traits
//! - `evaluator`: Prior/value estimators
//! - `mcts`: The search engine
//! - `games`: Reference games (Kuhn poker)

pub mod core;
pub mod error;
pub mod evaluator;
pub mod game;
pub mod games;
pub mod mcts;

// Re-export commonly used types
pub use crate::core::{PlayerId, SearchRng, SearchRngState};

pub use crate::error::{ISMCTSError, Result};

pub use crate::game::{GameState, Resampler, Turn};

pub use crate::evaluator::{EvalError, Evaluator, RandomRolloutEvaluator, UniformEvaluator};

pub use crate::mcts::{
    ActionPolicy, ActionSetMode, ChildSelectionPolicy, FinalPolicyType, ISMCTSConfig,
    ISMCTSSearch, InfoKeySource, SearchStats, WorldSamples,
};
