//! Caller-supplied determinization.
//!
//! A `Resampler` overrides `GameState::resample_from_infostate`. Any closure
//! with the matching signature is a `Resampler`:
//!
//! ```
//! use ismcts::core::{PlayerId, SearchRng};
//! use ismcts::game::Resampler;
//! use ismcts::games::kuhn::KuhnState;
//!
//! let keep_as_is = |state: &KuhnState, _player: PlayerId, _rng: &mut SearchRng| state.clone();
//! let _boxed: Box<dyn Resampler<KuhnState>> = Box::new(keep_as_is);
//! ```

use crate::core::{PlayerId, SearchRng};

use super::state::GameState;

/// Produces a full state consistent with `player`'s information set.
pub trait Resampler<S: GameState> {
    /// Redraw the hidden information of `state` from `player`'s viewpoint.
    fn resample(&self, state: &S, player: PlayerId, rng: &mut SearchRng) -> S;
}

impl<S, F> Resampler<S> for F
where
    S: GameState,
    F: Fn(&S, PlayerId, &mut SearchRng) -> S,
{
    fn resample(&self, state: &S, player: PlayerId, rng: &mut SearchRng) -> S {
        self(state, player, rng)
    }
}
