//! Seeded bounded-integer generator.
//!
//! Every generator maps its raw 32-bit state to a double through a fixed
//! bit reinterpretation, so the sequence of values drawn for a given seed is
//! identical on every platform. Both the reference LUT and the grain buffers
//! are built from this stream; changing any constant here changes every
//! output frame.

use crate::params::RandomAlgorithm;

/// Draw a value in `[-range, range]` and advance `seed`.
///
/// `param` is the standard deviation for [`RandomAlgorithm::Gaussian`] and is
/// ignored by the other algorithms. The Gaussian draw loops until it lands
/// inside (-1, 1), so `param` must be finite and no larger than
/// [`GAUSSIAN_SIGMA_MAX`](crate::params::GAUSSIAN_SIGMA_MAX); `Core::new`
/// enforces this. A `range` of 0 always yields 0 (the seed
/// still advances).
pub fn random(algo: RandomAlgorithm, seed: &mut u32, range: i32, param: f64) -> i32 {
    let num = match algo {
        RandomAlgorithm::Legacy => rand_legacy(seed),
        RandomAlgorithm::Uniform => rand_uniform(seed),
        RandomAlgorithm::Gaussian => rand_gaussian(seed, param),
    };
    debug_assert!(num.is_nan() || (-1.0..=1.0).contains(&num));
    // f64::round rounds half away from zero
    (num * f64::from(range)).round() as i32
}

/// Spread 32 random bits over the 52-bit mantissa of a double in [1, 2),
/// then rescale to [-1, 1).
#[inline]
fn rand_to_double(raw: u32) -> f64 {
    let bits = u64::from(raw);
    let mantissa = (bits << 20) | (bits >> 12);
    let unit = f64::from_bits(mantissa | 0x3ff0_0000_0000_0000);
    (unit - 1.0) * 2.0 - 1.0
}

#[inline]
fn rand_legacy(seed: &mut u32) -> f64 {
    let s = *seed;
    let tmp = (((s << 13) ^ s) >> 17) ^ (s << 13) ^ s;
    *seed = tmp.wrapping_mul(32) ^ tmp;
    rand_to_double(*seed)
}

#[inline]
fn rand_uniform(seed: &mut u32) -> f64 {
    *seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    rand_to_double(*seed)
}

/// Polar Box-Muller, re-drawn until the result lies strictly inside (-1, 1).
fn rand_gaussian(seed: &mut u32, sigma: f64) -> f64 {
    loop {
        let (y, r2) = loop {
            let x = rand_uniform(seed);
            let y = rand_uniform(seed);
            let r2 = x * x + y * y;
            if r2 <= 1.0 && r2 != 0.0 {
                break (y, r2);
            }
        };
        let value = sigma * y * (-2.0 * r2.ln() / r2).sqrt();
        if !(value <= -1.0 || value >= 1.0) {
            return value;
        }
    }
}
