//! Seedable random source
//!
//! Every randomized decision in the simulation draws from one `SimRng` that is
//! passed down explicitly, so a seed plus an input script reproduces a run.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub type SimRng = ChaCha8Rng;

pub fn seeded(seed: u64) -> SimRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Uniform draw in `[0, 1)`
pub fn roll(rng: &mut SimRng) -> f64 {
    rng.gen::<f64>()
}

/// `floor(roll * n)`, or 0 when `n` is not positive
pub fn below(rng: &mut SimRng, n: i32) -> i32 {
    if n <= 0 {
        return 0;
    }
    (roll(rng) * f64::from(n)).floor() as i32
}

/// Fair coin flip
pub fn coin(rng: &mut SimRng) -> bool {
    roll(rng) < 0.5
}
