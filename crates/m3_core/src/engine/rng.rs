//! Seeded RNG streams for the simulation core.
//!
//! Determinism contract: given identical master seeds and identical command
//! sequences, each domain's draw order is identical. Domains exist so that
//! one subsystem consuming extra draws (e.g. refill after a larger cascade)
//! cannot shift the values observed by another subsystem.

use std::hash::{Hash, Hasher};

use fxhash::FxHasher;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// RNG domains. Each domain owns an independent xorshift stream derived from
/// the master seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RngDomain {
    /// Generic draws (initial board fill)
    Main,
    /// New tile colors spawned by refill
    Refill,
    /// UFO random target selection
    Bomb,
    /// Simulation experiments outside the core (move analyzers)
    Ai,
}

impl RngDomain {
    fn tag(self) -> u8 {
        match self {
            RngDomain::Main => 0,
            RngDomain::Refill => 1,
            RngDomain::Bomb => 2,
            RngDomain::Ai => 3,
        }
    }
}

/// Seedable pseudo-random number generator (xorshift64).
/// Deterministic, fast, and its entire state is a single observable u64,
/// which keeps snapshots trivial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        // Avoid zero state (xorshift fixpoint)
        XorShift64 { state: if seed == 0 { 1 } else { seed } }
    }

    /// Current stream state.
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Overwrite the stream state (snapshot restore).
    pub fn set_state(&mut self, state: u64) {
        self.state = if state == 0 { 1 } else { state };
    }

    fn step(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Random number in [0, max). Returns 0 when max == 0.
    pub fn next_max(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        (self.step() % max as u64) as u32
    }

    /// Random number in [min, max). Returns min when the range is empty.
    pub fn next_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max - min) as u32;
        min + self.next_max(span) as i32
    }

    /// Random float in [0.0, 1.0).
    pub fn next_f32(&mut self) -> f32 {
        // Top 24 bits -> f32 mantissa width
        (self.step() >> 40) as f32 / (1u32 << 24) as f32
    }
}

impl RngCore for XorShift64 {
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand_core::impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for XorShift64 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        XorShift64::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        XorShift64::new(state)
    }
}

/// Derives and owns one PRNG per domain from a master seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedManager {
    master_seed: u64,
    main: XorShift64,
    refill: XorShift64,
    bomb: XorShift64,
    ai: XorShift64,
}

impl SeedManager {
    pub fn new(master_seed: u64) -> Self {
        SeedManager {
            master_seed,
            main: XorShift64::new(derive_stream_seed(master_seed, RngDomain::Main)),
            refill: XorShift64::new(derive_stream_seed(master_seed, RngDomain::Refill)),
            bomb: XorShift64::new(derive_stream_seed(master_seed, RngDomain::Bomb)),
            ai: XorShift64::new(derive_stream_seed(master_seed, RngDomain::Ai)),
        }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn stream(&mut self, domain: RngDomain) -> &mut XorShift64 {
        match domain {
            RngDomain::Main => &mut self.main,
            RngDomain::Refill => &mut self.refill,
            RngDomain::Bomb => &mut self.bomb,
            RngDomain::Ai => &mut self.ai,
        }
    }
}

/// Per-domain seed derivation. FxHasher is stable across Rust versions,
/// unlike DefaultHasher, so replays do not desync on toolchain upgrades.
fn derive_stream_seed(master_seed: u64, domain: RngDomain) -> u64 {
    let mut hasher = FxHasher::default();
    master_seed.hash(&mut hasher);
    domain.tag().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut a = XorShift64::new(42);
        let mut b = XorShift64::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_max(100), b.next_max(100));
        }
    }

    #[test]
    fn test_rng_range() {
        let mut rng = XorShift64::new(12345);
        for _ in 0..1000 {
            let v = rng.next_max(15);
            assert!(v < 15);
            let r = rng.next_range(-3, 9);
            assert!((-3..9).contains(&r));
        }
    }

    #[test]
    fn test_rng_float_range() {
        let mut rng = XorShift64::new(7);
        for _ in 0..1000 {
            let f = rng.next_f32();
            assert!((0.0..1.0).contains(&f), "got {}", f);
        }
    }

    #[test]
    fn test_rng_zero_seed_guard() {
        let mut rng = XorShift64::new(0);
        assert_ne!(rng.state(), 0);
        // A zero state would be a fixpoint; the stream must still advance.
        let a = rng.next_u64();
        let b = rng.next_u64();
        assert_ne!(a, b);
    }

    #[test]
    fn test_state_roundtrip() {
        let mut rng = XorShift64::new(99);
        for _ in 0..17 {
            rng.next_u64();
        }
        let saved = rng.state();
        let upcoming: Vec<u32> = (0..8).map(|_| rng.next_max(1000)).collect();

        let mut restored = XorShift64::new(1);
        restored.set_state(saved);
        let replayed: Vec<u32> = (0..8).map(|_| restored.next_max(1000)).collect();
        assert_eq!(upcoming, replayed);
    }

    #[test]
    fn test_domains_are_independent() {
        let mut mgr = SeedManager::new(2024);
        let main_first = mgr.stream(RngDomain::Main).next_u64();

        // Consuming heavily from Refill must not disturb Main.
        let mut mgr2 = SeedManager::new(2024);
        for _ in 0..500 {
            mgr2.stream(RngDomain::Refill).next_u64();
        }
        assert_eq!(mgr2.stream(RngDomain::Main).next_u64(), main_first);
    }

    #[test]
    fn test_domain_streams_differ() {
        let mut mgr = SeedManager::new(5);
        let a = mgr.stream(RngDomain::Main).next_u64();
        let b = mgr.stream(RngDomain::Refill).next_u64();
        let c = mgr.stream(RngDomain::Bomb).next_u64();
        assert!(a != b || b != c, "streams should not be identical");
    }

    #[test]
    fn test_seedable_rng_traits() {
        use rand::Rng;
        let mut rng = XorShift64::seed_from_u64(77);
        let v: u32 = rng.gen_range(0..10);
        assert!(v < 10);
    }
}
