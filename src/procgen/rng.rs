//! Seeded random source shared by every block generator.
//!
//! The engine is [`ChaCha8Rng`] seeded through `seed_from_u64`. Unlike
//! `StdRng`, its output is pinned by `rand_chacha` across releases and
//! platforms, and a snapshot stores nothing but the seed.
//!
//! Each draw consumes exactly one 32-bit word, so a generator's output
//! depends only on the seed and the order of its calls. The mapping from
//! words to ranges is fixed here and does not go through `Rng::gen_range`,
//! whose rejection sampling may pull a variable number of words.

use bevy::log::warn;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::CityError;

/// 2^24 - 1: the largest 24-bit mantissa, exactly representable in `f32`.
const UNIT_SCALE: f32 = 16_777_215.0;

/// Deterministic uniform source of floats and integers.
pub struct RandomSource {
    rng: ChaCha8Rng,
    draws: u64,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            draws: 0,
        }
    }

    /// Number of words consumed since the last (re)seed.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Restart the sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    fn next_word(&mut self) -> u32 {
        self.draws += 1;
        self.rng.next_u32()
    }

    /// Uniform float in `[lo, hi]`.
    ///
    /// `lo > hi` is a caller bug: it panics in debug builds and is swapped
    /// and logged in release builds.
    pub fn range_float(&mut self, lo: f32, hi: f32) -> f32 {
        debug_assert!(lo <= hi, "range_float called with lo {lo} > hi {hi}");
        let (lo, hi) = if lo > hi {
            warn!("range_float: reversed range {lo}..{hi}, swapping");
            (hi, lo)
        } else {
            (lo, hi)
        };
        self.sample_float(lo, hi)
    }

    /// Like [`range_float`](Self::range_float) but rejects a reversed range
    /// without consuming any state.
    pub fn checked_range_float(&mut self, lo: f32, hi: f32) -> Result<f32, CityError> {
        if lo > hi {
            return Err(CityError::InvalidRange { lo, hi });
        }
        Ok(self.sample_float(lo, hi))
    }

    /// Uniform integer in `[lo, hi]`, both ends inclusive.
    pub fn range_int(&mut self, lo: i32, hi: i32) -> i32 {
        debug_assert!(lo <= hi, "range_int called with lo {lo} > hi {hi}");
        let (lo, hi) = if lo > hi {
            warn!("range_int: reversed range {lo}..={hi}, swapping");
            (hi, lo)
        } else {
            (lo, hi)
        };
        let span = (hi as i64 - lo as i64 + 1) as u64;
        let offset = (self.next_word() as u64 * span) >> 32;
        (lo as i64 + offset as i64) as i32
    }

    fn sample_float(&mut self, lo: f32, hi: f32) -> f32 {
        let unit = (self.next_word() >> 8) as f32 / UNIT_SCALE;
        (lo + (hi - lo) * unit).clamp(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RandomSource::new(7);
        let mut b = RandomSource::new(7);
        for _ in 0..256 {
            assert_eq!(
                a.range_float(-3.0, 11.0).to_bits(),
                b.range_float(-3.0, 11.0).to_bits()
            );
            assert_eq!(a.range_int(1, 3), b.range_int(1, 3));
        }
    }

    #[test]
    fn seed_zero_stream_is_pinned() {
        let mut rng = RandomSource::new(0);
        let words: Vec<u32> = (0..4).map(|_| rng.next_word()).collect();
        assert_eq!(words, [0xa79a_3b6c, 0xb585_f767, 0xbad8_c037, 0x7746_a55f]);

        // Word 0xa79a3b6c >> 8 over 2^24 - 1.
        let mut rng = RandomSource::new(0);
        assert_eq!(rng.range_float(0.0, 1.0).to_bits(), 0x3f27_9a3c);
        assert_eq!(rng.range_float(0.0, 1.0).to_bits(), 0x3f35_85f8);
        let ints: Vec<i32> = (0..6).map(|_| rng.range_int(1, 3)).collect();
        assert_eq!(ints, [3, 2, 2, 3, 2, 1]);
    }

    #[test]
    fn reseed_restarts_sequence() {
        let mut rng = RandomSource::new(0);
        let first: Vec<i32> = (0..16).map(|_| rng.range_int(0, 1000)).collect();
        rng.reseed(0);
        let second: Vec<i32> = (0..16).map(|_| rng.range_int(0, 1000)).collect();
        assert_eq!(first, second);
        assert_eq!(rng.draws(), 16);
    }

    #[test]
    fn every_draw_consumes_one_word() {
        let mut rng = RandomSource::new(3);
        rng.range_float(0.0, 1.0);
        rng.range_int(1, 3);
        rng.range_float(5.0, 5.0);
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn floats_stay_in_range() {
        let mut rng = RandomSource::new(11);
        for _ in 0..10_000 {
            let v = rng.range_float(-0.1, 0.1);
            assert!((-0.1..=0.1).contains(&v), "{v} out of range");
        }
    }

    #[test]
    fn ints_cover_inclusive_range() {
        let mut rng = RandomSource::new(5);
        let mut seen = [0usize; 3];
        for _ in 0..3_000 {
            let v = rng.range_int(1, 3);
            assert!((1..=3).contains(&v));
            seen[(v - 1) as usize] += 1;
        }
        // Roughly uniform: each bucket near 1000.
        for count in seen {
            assert!(count > 800 && count < 1200, "skewed bucket: {count}");
        }
    }

    #[test]
    fn degenerate_range_returns_bound() {
        let mut rng = RandomSource::new(9);
        assert_eq!(rng.range_float(4.0, 4.0), 4.0);
        assert_eq!(rng.range_int(-2, -2), -2);
    }

    #[test]
    fn checked_range_rejects_reversed_without_drawing() {
        let mut rng = RandomSource::new(1);
        let err = rng.checked_range_float(2.0, 1.0).unwrap_err();
        assert!(matches!(err, CityError::InvalidRange { .. }));
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "lo")]
    fn reversed_range_panics_in_debug() {
        let mut rng = RandomSource::new(1);
        rng.range_float(1.0, 0.0);
    }
}
