//! Game state trait consumed by the search.
//!
//! Games implement `GameState` to expose:
//! - Whose turn it is (a player, chance, or nobody at terminal)
//! - Legal actions and chance outcomes
//! - How actions modify state
//! - Terminal returns and information-set identity
//!
//! The search calls into `GameState` but never interprets game-specific
//! concepts directly.

use std::fmt::Debug;
use std::hash::Hash;

use crate::core::{PlayerId, SearchRng};

/// Who acts at a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Turn {
    /// A player must choose an action.
    Player(PlayerId),
    /// Nature samples an outcome from `chance_outcomes`.
    Chance,
    /// The game is over.
    Terminal,
}

impl Turn {
    /// The acting player, if this is a decision point.
    #[must_use]
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Turn::Player(p) => Some(p),
            Turn::Chance | Turn::Terminal => None,
        }
    }
}

/// A sequential, possibly stochastic, imperfect-information game state.
///
/// ## Implementation Notes
///
/// - `Clone` must be a full structural copy: root samples are cloned out of
///   the sample cache and mutated in place from there.
/// - `legal_actions`: actions of the player returned by `current_player`;
///   empty at chance and terminal states.
/// - `returns`: one value per player, only meaningful at terminal states.
/// - `information_state_string(p)`: two states that share this string for
///   `p` must be strategically indistinguishable to `p`. States with
///   different legal continuations or different private knowledge must
///   never collide.
/// - `resample_from_infostate`: return `None` if the game cannot resample.
///   The search then requires an injected [`Resampler`](super::Resampler).
pub trait GameState: Clone {
    /// Action type. Chance outcomes use the same type.
    type Action: Clone + Eq + Hash + Debug;

    /// Number of players in the game.
    fn num_players(&self) -> usize;

    /// Who acts at this state.
    fn current_player(&self) -> Turn;

    /// Legal actions for the current player.
    fn legal_actions(&self) -> Vec<Self::Action>;

    /// Chance outcomes with their probabilities (should sum to 1).
    fn chance_outcomes(&self) -> Vec<(Self::Action, f64)>;

    /// Apply an action (or chance outcome) in place.
    fn apply_action(&mut self, action: &Self::Action);

    /// Per-player returns at a terminal state.
    fn returns(&self) -> Vec<f64>;

    /// Canonical string for `player`'s information set.
    fn information_state_string(&self, player: PlayerId) -> String;

    // === Provided Methods ===

    /// Check if the game is over.
    fn is_terminal(&self) -> bool {
        matches!(self.current_player(), Turn::Terminal)
    }

    /// Check if nature acts next.
    fn is_chance_node(&self) -> bool {
        matches!(self.current_player(), Turn::Chance)
    }

    /// Observation string for `player`.
    ///
    /// Defaults to the information state string for games with perfect
    /// recall of their own observations.
    fn observation_string(&self, player: PlayerId) -> String {
        self.information_state_string(player)
    }

    /// Sample a full state consistent with `player`'s information set.
    ///
    /// The returned state must have the same `information_state_string`
    /// for `player`, with hidden information redrawn.
    fn resample_from_infostate(&self, _player: PlayerId, _rng: &mut SearchRng) -> Option<Self> {
        None
    }

    /// Whether the game has perfect information.
    ///
    /// IS-MCTS still works on such games, but plain MCTS is the better tool.
    fn has_perfect_information(&self) -> bool {
        false
    }
}
