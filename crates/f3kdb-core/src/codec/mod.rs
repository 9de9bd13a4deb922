//! Conversion between external sample layouts and the internal 16-bit
//! domain, plus the averaging primitives every backend shares.
//!
//! All backends call these same functions so their outputs agree bit for
//! bit; do not specialise the arithmetic in one backend only.

mod plane;

pub(crate) use plane::{required_len, DestPlane, SourcePlane};

use crate::params::Plane;

/// Bit depth of every intermediate pixel value.
pub(crate) const INTERNAL_BIT_DEPTH: u32 = 16;

const PIXEL_MAX: i32 = (1 << INTERNAL_BIT_DEPTH) - 1;

/// Inclusive clamp bounds in the internal domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PixelRange {
    pub min: i32,
    pub max: i32,
}

impl PixelRange {
    pub const FULL: PixelRange = PixelRange {
        min: 0,
        max: PIXEL_MAX,
    };
    pub const TV_LUMA: PixelRange = PixelRange {
        min: 16 << 8,
        max: 235 << 8,
    };
    pub const TV_CHROMA: PixelRange = PixelRange {
        min: 16 << 8,
        max: 240 << 8,
    };

    pub fn for_plane(plane: Plane, keep_tv_range: bool) -> Self {
        match (keep_tv_range, plane) {
            (false, _) => PixelRange::FULL,
            (true, Plane::Y) => PixelRange::TV_LUMA,
            (true, _) => PixelRange::TV_CHROMA,
        }
    }

    #[inline]
    pub fn clamp(self, pixel: i32) -> i32 {
        pixel.clamp(self.min, self.max)
    }
}

#[inline]
pub(crate) fn avg2(a: i32, b: i32) -> i32 {
    (a + b + 1) >> 1
}

/// Four-way average with the first pair biased down by one.
///
/// Matches the rounding of a saturating-subtract + two unsigned-average
/// instruction sequence; keep the bias.
#[inline]
pub(crate) fn avg4(a: i32, b: i32, c: i32, d: i32) -> i32 {
    let mut first = avg2(a, b);
    let second = avg2(c, d);
    if first > 0 {
        first -= 1;
    }
    avg2(first, second)
}

/// Add a grain delta, saturating to the internal range.
#[inline]
pub(crate) fn add_grain(base: i32, change: i16) -> i32 {
    (base + i32::from(change)).clamp(0, PIXEL_MAX)
}

/// Clamp and scale an internal value down to `output_depth` bits.
#[inline]
pub(crate) fn downsample(pixel: i32, range: PixelRange, output_depth: u8) -> u16 {
    (range.clamp(pixel) >> (INTERNAL_BIT_DEPTH - u32::from(output_depth))) as u16
}
