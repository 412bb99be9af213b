//! Seeded polynomial string hash.
//!
//! `h = seed; for c in key { h = h * 17 + c }` over Unicode scalar values,
//! computed with wrapping `u64` arithmetic. Wraparound is intentional: long
//! keys fold modulo 2^64 and may collide, which the table tolerates by
//! comparing keys after a hash match.

use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

const MULTIPLIER: u64 = 17;
const CLOCK_SCALE: f64 = 101.0;

static PROCESS_SEED: OnceLock<u64> = OnceLock::new();

/// Starting value of the hash accumulator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct HashSeed(u64);

impl HashSeed {
    pub const fn new(seed: u64) -> Self {
        HashSeed(seed)
    }

    /// Process-wide seed derived from wall-clock time on first use.
    ///
    /// Every call within one run returns the same seed; separate runs
    /// almost always differ.
    pub fn from_clock() -> Self {
        HashSeed(*PROCESS_SEED.get_or_init(clock_seed))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Default for HashSeed {
    fn default() -> Self {
        Self::from_clock()
    }
}

fn clock_seed() -> u64 {
    // A clock before the epoch only loses run-to-run variation.
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    (secs * CLOCK_SCALE) as u64
}

/// Immutable string hasher owned by a table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StrHasher {
    seed: HashSeed,
}

impl StrHasher {
    pub const fn new(seed: HashSeed) -> Self {
        Self { seed }
    }

    pub const fn seed(&self) -> HashSeed {
        self.seed
    }

    #[inline]
    pub fn hash_str(&self, key: &str) -> u64 {
        key.chars().fold(self.seed.0, |h, c| {
            h.wrapping_mul(MULTIPLIER).wrapping_add(u64::from(c))
        })
    }
}

impl Default for StrHasher {
    fn default() -> Self {
        Self::new(HashSeed::from_clock())
    }
}
