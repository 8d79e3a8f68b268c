// Minimal PRNG (no external crates).
//
// Not cryptographically secure. Only used for sense jitter, so a run is
// reproducible from its seed.

#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        // Avoid a zero state.
        let seed = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: seed }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform in [0, 1).
    #[inline]
    pub fn next_f64_01(&mut self) -> f64 {
        // Top 53 bits fill the mantissa exactly.
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    #[inline]
    pub fn gen_range_f64(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64_01()
    }

    /// Symmetric noise in [-amp, amp). Zero amplitude draws nothing.
    #[inline]
    pub fn jitter(&mut self, amp: f64) -> f64 {
        if amp <= 0.0 {
            return 0.0;
        }
        self.gen_range_f64(-amp, amp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Prng::new(42);
        let mut b = Prng::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn zero_seed_is_usable() {
        let mut p = Prng::new(0);
        assert_ne!(p.next_u64(), 0);
    }

    #[test]
    fn ranges_hold() {
        let mut p = Prng::new(9);
        for _ in 0..1000 {
            let x = p.next_f64_01();
            assert!((0.0..1.0).contains(&x));
            let j = p.jitter(0.25);
            assert!((-0.25..0.25).contains(&j));
        }
        assert_eq!(p.jitter(0.0), 0.0);
    }
}
