//! Core types shared by every layer: player identity and the random source.

pub mod player;
pub mod rng;

pub use player::PlayerId;
pub use rng::{SearchRng, SearchRngState};
