//! Block backend for the vector tiers.
//!
//! Pixels are processed in blocks of [`LANES`]. The stored samples of the
//! whole block and its references are gathered first, with the layout
//! decided once per gather. Normalising, averaging, gating and grain then
//! run on 128-bit registers (see [`super::sse`]); the SSE4.1 tier blends
//! with `pblendvb`, the others with masks. Reference positions come from
//! the plane's cached [`RefOffsetStream`].
//!
//! Dithering stays sequential: Floyd-Steinberg carries error from one pixel
//! to the next, so lanes are handed to the kernel in column order.

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use super::sse::{LaneMath, Sse2, Sse41};
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use super::{ProcessPlaneParams, RefOffsetStream};
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::codec::{downsample, SourcePlane};
use crate::dither::DitherKernel;

pub(super) const LANES: usize = 8;

/// Stored samples of one block, before normalisation.
///
/// Sample mode 1 fills only the first two reference rows.
#[cfg_attr(not(any(target_arch = "x86", target_arch = "x86_64")), allow(dead_code))]
pub(super) struct LaneBlock {
    pub original: [u16; LANES],
    pub refs: [[u16; LANES]; 4],
    pub grain: [i16; LANES],
    pub shift: u32,
}

/// # Safety
///
/// The running CPU must support what `M` uses.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[inline(always)]
unsafe fn process_plane_lanes<
    M: LaneMath,
    const SAMPLE_MODE: u8,
    const BLUR_FIRST: bool,
    D: DitherKernel,
>(
    params: ProcessPlaneParams<'_>,
) {
    let ProcessPlaneParams {
        src,
        mut dst,
        width,
        height,
        width_subsampling,
        height_subsampling,
        lut,
        grain,
        threshold,
        range,
        output_depth,
        context,
        ref_stream,
    } = params;

    let stream = RefOffsetStream::acquire(ref_stream, src.pitch(), || {
        RefOffsetStream::build(
            lut,
            SAMPLE_MODE,
            src.pitch(),
            src.step(),
            width_subsampling,
            height_subsampling,
        )
    });

    let mut kernel = D::begin(context, width, output_depth);
    let src_step = src.step();
    let dst_step = dst.step();
    let grain_stride = lut.stride();
    let threshold = threshold.clamp(0, i32::from(u16::MAX)) as u16;

    for row in 0..height {
        let src_row = row * src.pitch();
        let dst_row = row * dst.pitch();
        let offsets_row = &stream.row(row)[..width];
        let grain_row = &grain[row * grain_stride..row * grain_stride + width];

        for (block_index, (offsets, changes)) in offsets_row
            .chunks(LANES)
            .zip(grain_row.chunks(LANES))
            .enumerate()
        {
            let column = block_index * LANES;
            let block = gather_block::<SAMPLE_MODE>(
                &src,
                src_row + column * src_step,
                src_step,
                offsets,
                changes,
            );
            let pixels = M::deband::<SAMPLE_MODE, BLUR_FIRST>(&block, threshold);
            for (lane, &pixel) in pixels.iter().take(offsets.len()).enumerate() {
                let pixel = kernel.dither(i32::from(pixel), row, column + lane);
                dst.write(
                    dst_row + (column + lane) * dst_step,
                    downsample(pixel, range, output_depth),
                );
            }
        }
        kernel.next_row();
    }

    kernel.finish(context);
}

/// Stored samples for up to [`LANES`] consecutive pixels starting at byte
/// `start`. Lanes past `offsets.len()` are zero.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[inline(always)]
fn gather_block<const SAMPLE_MODE: u8>(
    src: &SourcePlane<'_>,
    start: usize,
    step: usize,
    offsets: &[[isize; 2]],
    changes: &[i16],
) -> LaneBlock {
    let count = offsets.len();
    let ref_count = if SAMPLE_MODE == 1 { 2 } else { 4 };

    let mut origin = [0usize; LANES];
    let mut positions = [[0usize; LANES]; 4];
    for (lane, offset) in offsets.iter().enumerate() {
        let pos = start + lane * step;
        origin[lane] = pos;
        if SAMPLE_MODE == 1 {
            positions[0][lane] = pos.wrapping_add_signed(offset[0]);
            positions[1][lane] = pos.wrapping_add_signed(-offset[0]);
        } else {
            positions[0][lane] = pos.wrapping_add_signed(offset[0]);
            positions[1][lane] = pos.wrapping_add_signed(offset[1]);
            positions[2][lane] = pos.wrapping_add_signed(-offset[0]);
            positions[3][lane] = pos.wrapping_add_signed(-offset[1]);
        }
    }

    let mut refs = [[0u16; LANES]; 4];
    for (samples, lane_positions) in refs.iter_mut().zip(&positions).take(ref_count) {
        *samples = src.gather_raw(lane_positions, count);
    }
    let mut grain = [0i16; LANES];
    grain[..count].copy_from_slice(changes);

    LaneBlock {
        original: src.gather_raw(&origin, count),
        refs,
        grain,
        shift: src.shift(),
    }
}

macro_rules! lane_backend {
    ($(#[$doc:meta])* $name:ident, $inner:ident, $math:ident, $feature:literal) => {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        #[target_feature(enable = $feature)]
        unsafe fn $inner<const SAMPLE_MODE: u8, const BLUR_FIRST: bool, D: DitherKernel>(
            params: ProcessPlaneParams<'_>,
        ) {
            process_plane_lanes::<$math, SAMPLE_MODE, BLUR_FIRST, D>(params)
        }

        $(#[$doc])*
        ///
        /// Only sound to call when [`detect`](crate::dispatch::detect)
        /// reports this tier or above; the dispatcher guarantees that.
        pub(crate) fn $name<const SAMPLE_MODE: u8, const BLUR_FIRST: bool, D: DitherKernel>(
            params: super::ProcessPlaneParams<'_>,
        ) {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            {
                // SAFETY: tiers are downgraded to detected hardware support
                // before a routine is selected.
                unsafe { $inner::<SAMPLE_MODE, BLUR_FIRST, D>(params) };
            }
            #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
            {
                super::process_plane_scalar::<SAMPLE_MODE, BLUR_FIRST, D>(params);
            }
        }
    };
}

lane_backend!(
    /// Block kernel on SSE2 registers.
    process_plane_sse2,
    process_plane_lanes_sse2,
    Sse2,
    "sse2"
);
lane_backend!(
    /// Block kernel compiled for SSSE3, with the SSE2 arithmetic.
    process_plane_ssse3,
    process_plane_lanes_ssse3,
    Sse2,
    "ssse3"
);
lane_backend!(
    /// Block kernel on SSE4.1 registers, blending with `pblendvb`.
    process_plane_sse41,
    process_plane_lanes_sse41,
    Sse41,
    "sse4.1"
);
