//! Seeded additive lagged Fibonacci generator.
//!
//! Reproduces, draw for draw, the seeded source that placed every existing
//! object's jitter. Only the operations the jitter derivation needs are
//! exposed.

use super::cooked::COOKED;

const LEN: usize = 607;
const TAP: usize = 273;
const INT32_MAX: i64 = (1 << 31) - 1;
const MASK_63: u64 = (1 << 63) - 1;

/// Seed used in place of zero, which would degenerate the seeding LCG.
const ZERO_SEED: i64 = 89_482_311;

pub(crate) struct AdditiveSource {
    vec: [i64; LEN],
    tap: usize,
    feed: usize,
}

// x[n+1] = 48271 * x[n] mod (2^31 - 1), via Schrage's method.
fn seed_step(x: i32) -> i32 {
    const A: i32 = 48_271;
    const Q: i32 = 44_488;
    const R: i32 = 3_399;

    let hi = x / Q;
    let lo = x % Q;
    let x = A * lo - R * hi;
    if x < 0 {
        x + INT32_MAX as i32
    } else {
        x
    }
}

impl AdditiveSource {
    pub(crate) fn new(seed: i64) -> Self {
        let mut seed = seed % INT32_MAX;
        if seed < 0 {
            seed += INT32_MAX;
        }
        if seed == 0 {
            seed = ZERO_SEED;
        }

        let mut vec = [0i64; LEN];
        // In range after the reduction above.
        let mut x = seed as i32;
        for i in -20..LEN as i32 {
            x = seed_step(x);
            if i >= 0 {
                let mut u = i64::from(x) << 40;
                x = seed_step(x);
                u ^= i64::from(x) << 20;
                x = seed_step(x);
                u ^= i64::from(x);
                u ^= COOKED[i as usize];
                vec[i as usize] = u;
            }
        }

        Self {
            vec,
            tap: 0,
            feed: LEN - TAP,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.tap = self.tap.checked_sub(1).unwrap_or(LEN - 1);
        self.feed = self.feed.checked_sub(1).unwrap_or(LEN - 1);

        let x = self.vec[self.feed].wrapping_add(self.vec[self.tap]);
        self.vec[self.feed] = x;
        x as u64
    }

    fn int63(&mut self) -> i64 {
        (self.next_u64() & MASK_63) as i64
    }

    fn int31(&mut self) -> i32 {
        (self.int63() >> 32) as i32
    }

    /// Uniform value in `0..n`. Rejection keeps the result unbiased, so one
    /// call may consume more than one step.
    fn int31n(&mut self, n: i32) -> i32 {
        debug_assert!(n > 0);
        if n & (n - 1) == 0 {
            return self.int31() & (n - 1);
        }
        let max = ((1u32 << 31) - 1 - (1u32 << 31) % n as u32) as i32;
        let mut v = self.int31();
        while v > max {
            v = self.int31();
        }
        v % n
    }

    pub(crate) fn below(&mut self, n: u8) -> u8 {
        // Result is below n, so it fits.
        self.int31n(i32::from(n)) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_one_sequence() {
        let mut source = AdditiveSource::new(1);
        let draws: Vec<u8> = (0..10).map(|_| source.below(100)).collect();
        assert_eq!(draws, vec![81, 87, 47, 59, 81, 18, 25, 40, 56, 0]);
    }

    #[test]
    fn test_zero_seed_is_remapped() {
        let mut zero = AdditiveSource::new(0);
        let mut remapped = AdditiveSource::new(ZERO_SEED);
        for _ in 0..20 {
            assert_eq!(zero.next_u64(), remapped.next_u64());
        }
    }

    #[test]
    fn test_negative_seed_folds_into_range() {
        let mut negative = AdditiveSource::new(-1);
        let mut folded = AdditiveSource::new(INT32_MAX - 1);
        for _ in 0..20 {
            assert_eq!(negative.next_u64(), folded.next_u64());
        }
    }

    #[test]
    fn test_power_of_two_bound_masks() {
        let mut source = AdditiveSource::new(42);
        for _ in 0..1_000 {
            assert!(source.below(32) < 32);
        }
    }

    #[test]
    fn test_seed_step_stays_positive() {
        let mut x = 1;
        for _ in 0..10_000 {
            x = seed_step(x);
            assert!(x > 0 && i64::from(x) < INT32_MAX);
        }
    }
}
