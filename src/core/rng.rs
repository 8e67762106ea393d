//! Injectable deterministic random source for the search.
//!
//! Every random decision the engine makes (root determinization, chance
//! outcomes, expansion order, tie-breaking, policy sampling) draws from one
//! `SearchRng`. Seeding it identically reproduces a search exactly.
//!
//! ```
//! use ismcts::core::SearchRng;
//!
//! let mut a = SearchRng::new(7);
//! let mut b = SearchRng::new(7);
//! assert_eq!(a.gen_range_usize(0..100), b.gen_range_usize(0..100));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG used throughout the search.
///
/// ChaCha8 keeps the stream reproducible across platforms and cheap to
/// checkpoint via its word position.
#[derive(Clone, Debug)]
pub struct SearchRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl SearchRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// The seed this stream was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fork an independent, deterministic child stream.
    ///
    /// Evaluators use forks for rollouts so that their consumption does not
    /// depend on how many draws the parent made.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self.seed.wrapping_add(self.fork_counter.wrapping_mul(0x9E3779B97F4A7C15));
        Self {
            inner: ChaCha8Rng::seed_from_u64(fork_seed),
            seed: fork_seed,
            fork_counter: 0,
        }
    }

    /// Uniform `usize` in the given half-open range.
    ///
    /// The range must be non-empty.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Uniform `f64` in `[0, 1)`.
    pub fn gen_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Choose a uniformly random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Choose an index with probability proportional to its weight.
    ///
    /// Weights do not need to sum to 1.0. Returns `None` if weights are
    /// empty or carry no positive mass.
    pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if !(total > 0.0) {
            return None;
        }

        let mut threshold = self.gen_f64() * total;
        let mut last_positive = None;

        for (i, &weight) in weights.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            last_positive = Some(i);
            threshold -= weight;
            if threshold < 0.0 {
                return Some(i);
            }
        }

        // Floating point edge case
        last_positive
    }

    /// Capture the stream position for checkpointing.
    #[must_use]
    pub fn state(&self) -> SearchRngState {
        SearchRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
            fork_counter: self.fork_counter,
        }
    }

    /// Restore a stream captured with [`SearchRng::state`].
    #[must_use]
    pub fn from_state(state: &SearchRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
            fork_counter: state.fork_counter,
        }
    }
}

/// Serializable RNG position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position
    pub word_pos: u128,
    /// Fork counter for deterministic branching
    pub fork_counter: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = SearchRng::new(42);
        let mut rng2 = SearchRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.gen_range_usize(0..1000), rng2.gen_range_usize(0..1000));
        }
    }

    #[test]
    fn test_fork_is_deterministic_and_distinct() {
        let mut rng1 = SearchRng::new(42);
        let mut rng2 = SearchRng::new(42);

        let mut f1 = rng1.fork();
        let mut f2 = rng2.fork();
        assert_eq!(f1.seed(), f2.seed());

        let parent: Vec<_> = (0..10).map(|_| rng1.gen_range_usize(0..1000)).collect();
        let child: Vec<_> = (0..10).map(|_| f1.gen_range_usize(0..1000)).collect();
        let child2: Vec<_> = (0..10).map(|_| f2.gen_range_usize(0..1000)).collect();
        assert_ne!(parent, child);
        assert_eq!(child, child2);
    }

    #[test]
    fn test_gen_f64_range() {
        let mut rng = SearchRng::new(1);
        for _ in 0..1000 {
            let x = rng.gen_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_choose() {
        let mut rng = SearchRng::new(42);
        let items = [1, 2, 3];
        assert!(items.contains(rng.choose(&items).unwrap()));

        let empty: [i32; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }

    #[test]
    fn test_choose_weighted() {
        let mut rng = SearchRng::new(42);

        for _ in 0..20 {
            assert_eq!(rng.choose_weighted(&[0.0, 3.0, 0.0]), Some(1));
        }

        assert_eq!(rng.choose_weighted(&[]), None);
        assert_eq!(rng.choose_weighted(&[0.0, 0.0]), None);
        assert_eq!(rng.choose_weighted(&[f64::NAN]), None);
    }

    #[test]
    fn test_choose_weighted_frequencies() {
        let mut rng = SearchRng::new(3);
        let mut counts = [0usize; 2];
        for _ in 0..10_000 {
            counts[rng.choose_weighted(&[0.25, 0.75]).unwrap()] += 1;
        }
        let share = counts[1] as f64 / 10_000.0;
        assert!((share - 0.75).abs() < 0.03, "share was {share}");
    }

    #[test]
    fn test_state_roundtrip() {
        let mut rng = SearchRng::new(42);
        for _ in 0..100 {
            rng.gen_f64();
        }

        let state = rng.state();
        let expected: Vec<_> = (0..10).map(|_| rng.gen_range_usize(0..1000)).collect();

        let mut restored = SearchRng::from_state(&state);
        let actual: Vec<_> = (0..10).map(|_| restored.gen_range_usize(0..1000)).collect();

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_state_serde() {
        let state = SearchRngState {
            seed: 42,
            word_pos: 12345,
            fork_counter: 5,
        };

        let json = serde_json::to_string(&state).unwrap();
        let deserialized: SearchRngState = serde_json::from_str(&json).unwrap();

        assert_eq!(state, deserialized);
    }
}
