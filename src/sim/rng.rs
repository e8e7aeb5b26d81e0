//! Random streams for target placement
//!
//! Two sources share one interface:
//! - `Entropy`: a PCG stream seeded from the platform RNG
//! - `Daily`: Mulberry32 seeded from the UTC calendar date, so every player
//!   sees the same targets on the same day

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Seed integer for a UTC calendar date: `year*10000 + month*100 + day`
pub fn daily_seed(year: i32, month: u32, day: u32) -> u32 {
    (year * 10_000 + month as i32 * 100 + day as i32) as u32
}

/// Counter-based 32-bit generator (Mulberry32).
///
/// The output is a pure function of the counter, which advances by a fixed
/// odd constant per draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    const INCREMENT: u32 = 0x6D2B_79F5;

    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(Self::INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Uniform float in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }
}

/// The stream target placement draws from
#[derive(Debug, Clone)]
pub enum RngSource {
    /// Unseeded play
    Entropy(Pcg32),
    /// Daily challenge
    Daily { seed: u32, generator: Mulberry32 },
}

impl RngSource {
    /// Fresh stream seeded from the platform RNG
    pub fn entropy() -> Self {
        Self::Entropy(Pcg32::from_rng(&mut rand::rng()))
    }

    /// Entropy-style stream with a fixed seed (tests, headless runs)
    pub fn seeded(seed: u64) -> Self {
        Self::Entropy(Pcg32::seed_from_u64(seed))
    }

    /// Daily challenge stream, restarted from the beginning of the day's sequence
    pub fn daily(seed: u32) -> Self {
        Self::Daily {
            seed,
            generator: Mulberry32::new(seed),
        }
    }

    /// Next uniform float in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        match self {
            Self::Entropy(rng) => rng.random::<f64>(),
            Self::Daily { generator, .. } => generator.next_f64(),
        }
    }

    /// Seed of the daily stream, if this is one
    pub fn daily_seed(&self) -> Option<u32> {
        match self {
            Self::Entropy(_) => None,
            Self::Daily { seed, .. } => Some(*seed),
        }
    }

    pub fn is_daily(&self) -> bool {
        matches!(self, Self::Daily { .. })
    }
}
