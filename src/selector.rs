//! Uniform random choice of one reminder.

use crate::error::{BtwError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Pick one element of `reminders` with uniform probability.
///
/// # Errors
///
/// Returns [`BtwError::EmptySelection`] when `reminders` is empty.
pub fn pick<'a, R: Rng + ?Sized>(reminders: &'a [String], rng: &mut R) -> Result<&'a str> {
    reminders
        .choose(rng)
        .map(String::as_str)
        .ok_or(BtwError::EmptySelection)
}

/// Process-wide reminder picker owning its random generator.
#[derive(Debug)]
pub struct Selector {
    rng: StdRng,
}

impl Selector {
    /// Selector seeded from system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic selector, for tests and reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// See [`pick`].
    ///
    /// # Errors
    ///
    /// Returns [`BtwError::EmptySelection`] when `reminders` is empty.
    pub fn pick<'a>(&mut self, reminders: &'a [String]) -> Result<&'a str> {
        pick(reminders, &mut self.rng)
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::from_entropy()
    }
}
