//! Per-pixel reference offsets and grain deltas.

use crate::params::{Plane, ResolvedParams, VideoInfo};
use crate::random::random;

/// Row alignment of every LUT and grain row, in entries.
pub(crate) const LUT_ALIGNMENT: usize = 16;

/// Sampling information for one pixel.
///
/// `ref1`/`ref2` are non-negative distances in luma pixels; the direction
/// and the chroma subsampling shift are applied while processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PixelDitherInfo {
    pub ref1: i8,
    pub ref2: i8,
    pub change: i16,
}

/// Row stride for a plane `width` entries wide.
#[inline]
pub(crate) fn lut_stride(width: usize) -> usize {
    ((width.max(1) - 1) | (LUT_ALIGNMENT - 1)) + 1
}

/// Row-major table of [`PixelDitherInfo`], padded to [`lut_stride`].
#[derive(Debug, Clone)]
pub(crate) struct FrameLut {
    entries: Vec<PixelDitherInfo>,
    stride: usize,
    width: usize,
    height: usize,
}

impl FrameLut {
    fn zeroed(width: usize, height: usize) -> Self {
        let stride = lut_stride(width);
        Self {
            entries: vec![PixelDitherInfo::default(); stride * height],
            stride,
            width,
            height,
        }
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The `width` meaningful entries of row `y`.
    #[inline]
    pub fn row(&self, y: usize) -> &[PixelDitherInfo] {
        let start = y * self.stride;
        &self.entries[start..start + self.width]
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> PixelDitherInfo {
        self.entries[y * self.stride + x]
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, info: PixelDitherInfo) {
        self.entries[y * self.stride + x] = info;
    }
}

/// Build the Y, Cb and Cr tables in one raster pass over the luma plane.
///
/// Draw order (luma grain, luma refs, then Cb and Cr grain at chroma lattice
/// points) is part of the output contract: `seed` continues into the grain
/// buffers afterwards.
pub(crate) fn build_frame_luts(
    video_info: &VideoInfo,
    params: &ResolvedParams,
    seed: &mut u32,
) -> [FrameLut; 3] {
    let width = video_info.width;
    let height = video_info.height;
    let chroma_width = video_info.plane_width(Plane::Cb);
    let chroma_height = video_info.plane_height(Plane::Cb);
    let (ws, hs) = video_info.plane_subsampling(Plane::Cb);
    let width_mask = (1usize << ws) - 1;
    let height_mask = (1usize << hs) - 1;

    let mut y_lut = FrameLut::zeroed(width, height);
    let mut cb_lut = FrameLut::zeroed(chroma_width, chroma_height);
    let mut cr_lut = FrameLut::zeroed(chroma_width, chroma_height);

    let range = i32::from(params.range);
    let grain_y = i32::from(params.grain_y);
    let grain_c = i32::from(params.grain_c);
    let two_refs = params.sample_mode == 2;

    for y in 0..height {
        for x in 0..width {
            let mut info = PixelDitherInfo {
                change: random(
                    params.random_algo_grain,
                    seed,
                    grain_y,
                    params.random_param_grain,
                ) as i16,
                ..PixelDitherInfo::default()
            };

            let mut cur_range = range.min(y as i32).min((height - y - 1) as i32);
            if two_refs {
                cur_range = cur_range.min(x as i32).min((width - x - 1) as i32);
            }

            if cur_range > 0 {
                let ref1 = random(
                    params.random_algo_ref,
                    seed,
                    cur_range,
                    params.random_param_ref,
                );
                info.ref1 = ref1.unsigned_abs() as i8;
                if two_refs {
                    let ref2 = random(
                        params.random_algo_ref,
                        seed,
                        cur_range,
                        params.random_param_ref,
                    );
                    info.ref2 = ref2.unsigned_abs() as i8;
                }
            }

            y_lut.set(x, y, info);

            if x & width_mask != 0 || y & height_mask != 0 {
                continue;
            }

            let cb_change = random(
                params.random_algo_grain,
                seed,
                grain_c,
                params.random_param_grain,
            ) as i16;
            let cr_change = random(
                params.random_algo_grain,
                seed,
                grain_c,
                params.random_param_grain,
            ) as i16;

            let (cx, cy) = (x >> ws, y >> hs);
            // Lattice points past a partial last chroma row/column have no sample.
            if cx >= chroma_width || cy >= chroma_height {
                continue;
            }
            let chroma = clamp_chroma_refs(
                info,
                two_refs,
                (cx, cy),
                (chroma_width, chroma_height),
                (ws, hs),
            );
            cb_lut.set(
                cx,
                cy,
                PixelDitherInfo {
                    change: cb_change,
                    ..chroma
                },
            );
            cr_lut.set(
                cx,
                cy,
                PixelDitherInfo {
                    change: cr_change,
                    ..chroma
                },
            );
        }
    }

    [y_lut, cb_lut, cr_lut]
}

/// Shrink copied luma refs so their subsampled offsets stay on the chroma
/// plane. Only has an effect when a luma dimension is not a multiple of the
/// subsampling factor.
fn clamp_chroma_refs(
    mut info: PixelDitherInfo,
    two_refs: bool,
    (cx, cy): (usize, usize),
    (chroma_width, chroma_height): (usize, usize),
    (ws, hs): (u8, u8),
) -> PixelDitherInfo {
    let max_ref = |limit: usize, shift: u8| -> i32 { (((limit + 1) << shift) - 1).min(127) as i32 };
    let vertical = max_ref(cy.min(chroma_height - 1 - cy), hs);
    if two_refs {
        let horizontal = max_ref(cx.min(chroma_width - 1 - cx), ws);
        let limit = vertical.min(horizontal);
        info.ref1 = i32::from(info.ref1).min(limit) as i8;
        info.ref2 = i32::from(info.ref2).min(limit) as i8;
    } else {
        info.ref1 = i32::from(info.ref1).min(vertical) as i8;
    }
    info
}
