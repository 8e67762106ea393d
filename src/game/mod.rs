//! Game collaborator interface.
//!
//! The search is game-agnostic: it only sees states through the
//! `GameState` trait, and determinizes them either through the game's own
//! resampler or an injected `Resampler`.

pub mod resampler;
pub mod state;

pub use resampler::Resampler;
pub use state::{GameState, Turn};
