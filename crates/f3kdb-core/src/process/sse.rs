//! SSE arithmetic for one block of eight 16-bit lanes.
//!
//! Bit-exact with the scalar helpers in [`crate::codec`]:
//! - `_mm_avg_epu16` rounds up like `avg2`.
//! - The `avg4` bias is a saturating subtract of one from the first pair.
//! - Grain is added in the sign-flipped domain so `_mm_adds_epi16`
//!   clamps to `[0, 65535]`.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::lanes::{LaneBlock, LANES};

/// Average, gate and grain for one gathered block.
pub(super) trait LaneMath {
    /// # Safety
    ///
    /// The running CPU must support the instructions of the implementation.
    unsafe fn deband<const SAMPLE_MODE: u8, const BLUR_FIRST: bool>(
        block: &LaneBlock,
        threshold: u16,
    ) -> [u16; LANES];
}

/// Plain SSE2, selecting with and/andnot/or.
pub(super) struct Sse2;

/// SSE4.1, selecting with `pblendvb`.
pub(super) struct Sse41;

impl LaneMath for Sse2 {
    #[inline(always)]
    unsafe fn deband<const SAMPLE_MODE: u8, const BLUR_FIRST: bool>(
        block: &LaneBlock,
        threshold: u16,
    ) -> [u16; LANES] {
        deband_sse2::<SAMPLE_MODE, BLUR_FIRST>(block, threshold)
    }
}

impl LaneMath for Sse41 {
    #[inline(always)]
    unsafe fn deband<const SAMPLE_MODE: u8, const BLUR_FIRST: bool>(
        block: &LaneBlock,
        threshold: u16,
    ) -> [u16; LANES] {
        deband_sse41::<SAMPLE_MODE, BLUR_FIRST>(block, threshold)
    }
}

#[target_feature(enable = "sse2")]
unsafe fn deband_sse2<const SAMPLE_MODE: u8, const BLUR_FIRST: bool>(
    block: &LaneBlock,
    threshold: u16,
) -> [u16; LANES] {
    deband_lanes::<SAMPLE_MODE, BLUR_FIRST, false>(block, threshold)
}

#[target_feature(enable = "sse4.1")]
unsafe fn deband_sse41<const SAMPLE_MODE: u8, const BLUR_FIRST: bool>(
    block: &LaneBlock,
    threshold: u16,
) -> [u16; LANES] {
    deband_lanes::<SAMPLE_MODE, BLUR_FIRST, true>(block, threshold)
}

#[inline(always)]
unsafe fn normalise(samples: &[u16; LANES], shift: __m128i) -> __m128i {
    _mm_sll_epi16(_mm_loadu_si128(samples.as_ptr().cast()), shift)
}

/// `|a - b| >= threshold` per lane, as an all-ones mask.
#[inline(always)]
unsafe fn exceeds(a: __m128i, b: __m128i, threshold: __m128i) -> __m128i {
    let diff = _mm_or_si128(_mm_subs_epu16(a, b), _mm_subs_epu16(b, a));
    _mm_cmpeq_epi16(_mm_subs_epu16(threshold, diff), _mm_setzero_si128())
}

#[inline(always)]
unsafe fn deband_lanes<const SAMPLE_MODE: u8, const BLUR_FIRST: bool, const BLEND: bool>(
    block: &LaneBlock,
    threshold: u16,
) -> [u16; LANES] {
    let shift = _mm_cvtsi32_si128(block.shift as i32);
    let threshold = _mm_set1_epi16(threshold as i16);

    let original = normalise(&block.original, shift);
    let ref1 = normalise(&block.refs[0], shift);
    let ref2 = normalise(&block.refs[1], shift);

    let (avg, use_original) = if SAMPLE_MODE == 1 {
        let avg = _mm_avg_epu16(ref1, ref2);
        let use_original = if BLUR_FIRST {
            exceeds(avg, original, threshold)
        } else {
            _mm_or_si128(
                exceeds(ref1, original, threshold),
                exceeds(ref2, original, threshold),
            )
        };
        (avg, use_original)
    } else {
        let ref3 = normalise(&block.refs[2], shift);
        let ref4 = normalise(&block.refs[3], shift);
        let first = _mm_subs_epu16(_mm_avg_epu16(ref1, ref2), _mm_set1_epi16(1));
        let avg = _mm_avg_epu16(first, _mm_avg_epu16(ref3, ref4));
        let use_original = if BLUR_FIRST {
            exceeds(avg, original, threshold)
        } else {
            _mm_or_si128(
                _mm_or_si128(
                    exceeds(ref1, original, threshold),
                    exceeds(ref2, original, threshold),
                ),
                _mm_or_si128(
                    exceeds(ref3, original, threshold),
                    exceeds(ref4, original, threshold),
                ),
            )
        };
        (avg, use_original)
    };

    let base = if BLEND {
        _mm_blendv_epi8(avg, original, use_original)
    } else {
        _mm_or_si128(
            _mm_and_si128(use_original, original),
            _mm_andnot_si128(use_original, avg),
        )
    };

    let bias = _mm_set1_epi16(i16::MIN);
    let grain = _mm_loadu_si128(block.grain.as_ptr().cast());
    let grained = _mm_xor_si128(_mm_adds_epi16(_mm_xor_si128(base, bias), grain), bias);

    let mut out = [0u16; LANES];
    _mm_storeu_si128(out.as_mut_ptr().cast(), grained);
    out
}
