use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::HashSet;

/// Mix a master seed into a well-spread 64-bit value (SplitMix64 finaliser).
pub fn mix(master: u64) -> u64 {
    let mut x = master.wrapping_add(0x9E3779B97F4A7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

/// Per-sweep source of simulation seeds.
///
/// Draws 63-bit values from ChaCha20 (the simulator reads its seed into a
/// signed `long`) and never hands out the same value twice, so no two jobs
/// of one sweep share a pseudo-random stream.
pub struct SeedStream {
    rng:    ChaCha20Rng,
    issued: HashSet<u64>,
}

impl SeedStream {
    /// Fresh, OS-seeded stream (the default for real sweeps).
    pub fn from_entropy() -> Self {
        Self { rng: ChaCha20Rng::from_entropy(), issued: HashSet::new() }
    }

    /// Reproducible stream derived from a master seed.
    pub fn from_master(master: u64) -> Self {
        Self { rng: ChaCha20Rng::seed_from_u64(mix(master)), issued: HashSet::new() }
    }

    /// Next unused seed in `0..=i64::MAX`.
    pub fn next_seed(&mut self) -> u64 {
        loop {
            let s = self.rng.next_u64() >> 1;
            if self.issued.insert(s) {
                return s;
            }
        }
    }
}

impl Iterator for SeedStream {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        Some(self.next_seed())
    }
}
