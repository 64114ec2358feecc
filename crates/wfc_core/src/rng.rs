//! Random number generator abstraction for the tile solver.
//!
//! Every random decision the solver makes (seed cell, seed tile, tie-break
//! among lowest-entropy cells, collapsed value) goes through the `TileRng`
//! trait so runs can be reproduced from a seed.
//!
//! # Example
//!
//! ```ignore
//! use wfc_core::rng::{StdRandom, TileRng};
//!
//! let mut rng = StdRandom::from_u64_seed(42);
//! let index = rng.next_usize_max(10); // 0..10
//! let pick = rng.choose(&[3, 5, 8]);  // Some(&3 | &5 | &8)
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Trait for random number generators used by the solver.
///
/// Only `next_double` is required; the index helpers are derived from it so
/// alternative sources (scripted sequences, other PRNGs) stay small.
pub trait TileRng {
    /// Returns a random double in [0.0, 1.0).
    fn next_double(&mut self) -> f64;

    /// Returns a random usize in [0, max).
    /// Returns 0 when `max` is 0.
    fn next_usize_max(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        let index = (self.next_double() * max as f64) as usize;
        index.min(max - 1)
    }

    /// Pick one element uniformly, `None` for an empty slice.
    fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        if items.is_empty() {
            return None;
        }
        let index = self.next_usize_max(items.len());
        items.get(index)
    }
}

/// Pick one element uniformly through a trait object.
///
/// Generic methods aren't dyn-compatible, so callers holding a
/// `&mut dyn TileRng` use this instead of [`TileRng::choose`].
pub fn choose_with_rng<'a, T>(items: &'a [T], rng: &mut dyn TileRng) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.next_usize_max(items.len()))
}

/// Standard RNG wrapper around `rand::rngs::StdRng`.
#[derive(Clone, Debug)]
pub struct StdRandom {
    rng: StdRng,
    seed: u64,
}

impl StdRandom {
    /// Create from a u64 seed.
    pub fn from_u64_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create from a fresh seed drawn from the OS.
    ///
    /// The drawn seed is kept so an unseeded run can still be replayed.
    pub fn from_entropy() -> Self {
        let seed = StdRng::from_entropy().gen::<u64>();
        Self::from_u64_seed(seed)
    }

    /// The seed this generator was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl TileRng for StdRandom {
    fn next_double(&mut self) -> f64 {
        self.rng.gen()
    }

    fn next_usize_max(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        self.rng.gen_range(0..max)
    }
}
