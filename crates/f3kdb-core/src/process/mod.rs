//! Per-plane pixel pipeline.
//!
//! Every backend walks the plane row by row: read the source sample and its
//! mirrored references, average them, keep the original when the threshold
//! test fails, add grain, dither, scale down and write. The backends differ
//! only in how they schedule that work; the arithmetic lives here and in
//! [`crate::codec`].

mod lanes;
mod ref_stream;
mod scalar;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod sse;

pub(crate) use lanes::{process_plane_sse2, process_plane_sse41, process_plane_ssse3};
pub(crate) use ref_stream::{RefOffsetStream, RefStreamSlot};
pub(crate) use scalar::process_plane_scalar;

use crate::codec::{add_grain, avg2, avg4, DestPlane, PixelRange, SourcePlane};
use crate::dither::DitherContext;
use crate::lut::{FrameLut, PixelDitherInfo};

/// Everything one routine needs to process one plane. Built per call.
pub(crate) struct ProcessPlaneParams<'a> {
    pub src: SourcePlane<'a>,
    pub dst: DestPlane<'a>,
    pub width: usize,
    pub height: usize,
    pub width_subsampling: u8,
    pub height_subsampling: u8,
    pub lut: &'a FrameLut,
    /// Grain for this frame; row `r` starts at `r * lut.stride()`.
    pub grain: &'a [i16],
    pub threshold: i32,
    pub range: PixelRange,
    pub output_depth: u8,
    pub context: &'a mut DitherContext,
    pub ref_stream: &'a RefStreamSlot,
}

/// A concrete processing routine selected by the dispatcher.
pub(crate) type ProcessPlaneFn = fn(ProcessPlaneParams<'_>);

/// Signed byte offsets of the two reference pairs for one pixel.
///
/// Sample mode 1 reads `pos ± offsets[0]`; sample mode 2 additionally reads
/// `pos ± offsets[1]`.
#[inline]
pub(crate) fn reference_offsets(
    info: PixelDitherInfo,
    sample_mode: u8,
    pitch: isize,
    step: isize,
    width_subsampling: u8,
    height_subsampling: u8,
) -> [isize; 2] {
    let ref1 = isize::from(info.ref1);
    let ref2 = isize::from(info.ref2);
    if sample_mode == 1 {
        [(ref1 >> height_subsampling) * pitch, 0]
    } else {
        [
            pitch * (ref2 >> height_subsampling) + (ref1 >> width_subsampling) * step,
            (ref2 >> width_subsampling) * step - pitch * (ref1 >> height_subsampling),
        ]
    }
}

#[inline]
fn exceeds(diff: i32, threshold: i32) -> bool {
    diff.abs() >= threshold
}

/// Threshold-gated average of one pixel plus grain, before dithering.
#[inline(always)]
pub(crate) fn deband_pixel<const SAMPLE_MODE: u8, const BLUR_FIRST: bool>(
    src: &SourcePlane<'_>,
    pos: usize,
    offsets: [isize; 2],
    threshold: i32,
    change: i16,
) -> i32 {
    let original = src.read(pos);
    let (avg, use_original) = if SAMPLE_MODE == 1 {
        let ref1 = src.read_at(pos, offsets[0]);
        let ref2 = src.read_at(pos, -offsets[0]);
        let avg = avg2(ref1, ref2);
        let use_original = if BLUR_FIRST {
            exceeds(avg - original, threshold)
        } else {
            exceeds(original - ref1, threshold) || exceeds(original - ref2, threshold)
        };
        (avg, use_original)
    } else {
        let ref1 = src.read_at(pos, offsets[0]);
        let ref2 = src.read_at(pos, offsets[1]);
        let ref3 = src.read_at(pos, -offsets[0]);
        let ref4 = src.read_at(pos, -offsets[1]);
        let avg = avg4(ref1, ref2, ref3, ref4);
        let use_original = if BLUR_FIRST {
            exceeds(avg - original, threshold)
        } else {
            [ref1, ref2, ref3, ref4]
                .iter()
                .any(|&r| exceeds(r - original, threshold))
        };
        (avg, use_original)
    };
    add_grain(if use_original { original } else { avg }, change)
}

/// Byte-exact copy for planes that need no processing.
///
/// `line_size` is the byte width of one row, `rows` the number of stored
/// rows (twice the plane height for the stacked layout).
pub(crate) fn copy_plane(
    dst: &mut [u8],
    dst_pitch: usize,
    src: &[u8],
    src_pitch: usize,
    line_size: usize,
    rows: usize,
) {
    if line_size == src_pitch && src_pitch == dst_pitch {
        let len = line_size * rows;
        dst[..len].copy_from_slice(&src[..len]);
        return;
    }
    for row in 0..rows {
        let src_start = row * src_pitch;
        let dst_start = row * dst_pitch;
        dst[dst_start..dst_start + line_size]
            .copy_from_slice(&src[src_start..src_start + line_size]);
    }
}
