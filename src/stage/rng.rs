//! Session random source.
//!
//! One seedable linear congruential generator owned by the stage state; every
//! probability roll and range draw in the toy goes through it, so behavior is
//! reproducible under a fixed seed.

/// 32-bit LCG (Numerical Recipes constants). Not crypto secure; fine for
/// cosmetic randomness.
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Seed from a millisecond clock reading (sub-ms bits included so two
    /// near-simultaneous sessions diverge).
    pub fn from_clock(now_ms: f64) -> Self {
        Self::new((now_ms * 1000.0) as u64 as u32)
    }

    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.state
    }

    /// Uniform in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.step()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Uniform in [min, max).
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform index in [0, len); 0 for an empty slice.
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_f64() * len as f64) as usize
    }

    /// Bernoulli roll with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Lcg::new(12345);
        let mut b = Lcg::new(12345);
        for _ in 0..64 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn next_f64_stays_in_unit_interval() {
        let mut rng = Lcg::new(7);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn range_respects_bounds() {
        let mut rng = Lcg::new(99);
        for _ in 0..1000 {
            let v = rng.range(120.0, 520.0);
            assert!((120.0..520.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn index_never_reaches_len() {
        let mut rng = Lcg::new(3);
        for _ in 0..1000 {
            assert!(rng.index(4) < 4);
        }
        assert_eq!(rng.index(0), 0);
    }

    #[test]
    fn chance_extremes() {
        let mut rng = Lcg::new(42);
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }
}
