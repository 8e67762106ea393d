//! Kuhn poker for exercising the search.
//!
//! The smallest interesting imperfect-information card game:
//! - Three cards (J, Q, K), two players, one private card each
//! - Dealing happens at chance nodes
//! - One betting round with pass/bet actions
//!
//! Implements `resample_from_infostate`, so it needs no injected resampler.

mod game;

pub use game::{KuhnAction, KuhnState, DECK_SIZE};
